//! 流水线配置.
//!
//! 配置分两层: 可选的 TOML 文件, 以及前缀为 `CARDIO` 的环境变量 (优先级更高),
//! 例如 `CARDIO_SEED=7`, `CARDIO_RULES=synthetic_tuned`.

use crate::classify::RuleSet;
use crate::consts::{DEFAULT_SLICE_SIZE, REPORT_SYSTEM_VERSION};
use crate::error::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// 环境变量前缀.
pub const ENV_PREFIX: &str = "CARDIO";

/// 使用哪一套分类规则.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSetChoice {
    /// 默认规则集 `v1`.
    #[default]
    Canonical,
    /// `v2-synthetic`.
    SyntheticTuned,
    /// 调用方给出的完整规则集.
    Custom(RuleSet),
}

/// 流水线配置.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 合成切片边长.
    pub slice_size: usize,
    /// 基础随机种子.
    pub seed: u64,
    /// 是否对切片做增强.
    pub enhance: bool,
    /// 分类规则.
    pub rules: RuleSetChoice,
    /// 文本生成服务单次调用超时 (秒).
    pub narrative_timeout_secs: u64,
    /// 报告中的系统标识.
    pub report_system_version: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            slice_size: DEFAULT_SLICE_SIZE,
            seed: 42,
            enhance: true,
            rules: RuleSetChoice::Canonical,
            narrative_timeout_secs: 30,
            report_system_version: REPORT_SYSTEM_VERSION.to_string(),
        }
    }
}

impl PipelineConfig {
    /// 从可选的 TOML 文件与 `CARDIO_*` 环境变量加载, 并校验.
    ///
    /// `path` 为 `None` 或文件不存在时只使用默认值与环境变量.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let cfg: PipelineConfig = builder
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        info!(
            seed = cfg.seed,
            slice_size = cfg.slice_size,
            rules = %cfg.rule_set().version,
            "pipeline config loaded"
        );
        Ok(cfg)
    }

    /// 检查取值范围.
    pub fn validate(&self) -> Result<()> {
        if self.slice_size == 0 {
            return Err(config::ConfigError::Message("slice_size must be positive".into()).into());
        }
        if self.narrative_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "narrative_timeout_secs must be positive".into(),
            )
            .into());
        }
        if let RuleSetChoice::Custom(rules) = &self.rules {
            rules.validate()?;
        }
        Ok(())
    }

    /// 实际使用的规则集.
    pub fn rule_set(&self) -> Cow<'_, RuleSet> {
        match &self.rules {
            RuleSetChoice::Canonical => Cow::Borrowed(RuleSet::canonical()),
            RuleSetChoice::SyntheticTuned => Cow::Borrowed(RuleSet::synthetic_tuned()),
            RuleSetChoice::Custom(rules) => Cow::Borrowed(rules),
        }
    }

    /// 文本生成服务单次调用超时.
    #[inline]
    pub fn narrative_timeout(&self) -> Duration {
        Duration::from_secs(self.narrative_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.slice_size, 256);
        assert_eq!(cfg.seed, 42);
        assert!(cfg.enhance);
        assert_eq!(cfg.rule_set().version, "v1");
        assert_eq!(cfg.narrative_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.report_system_version, REPORT_SYSTEM_VERSION);
    }

    #[test]
    fn test_load_without_file() {
        let cfg = PipelineConfig::load_with_prefix(None, "CARDIO_TEST_NOFILE").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        let missing = Path::new("/definitely/not/here.toml");
        let cfg = PipelineConfig::load_with_prefix(Some(missing), "CARDIO_TEST_NOFILE").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "seed = 7\nslice_size = 64\nrules = \"synthetic_tuned\"").unwrap();
        file.flush().unwrap();

        let cfg = PipelineConfig::load_with_prefix(Some(file.path()), "CARDIO_TEST_FILE").unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.slice_size, 64);
        assert!(cfg.enhance);
        assert_eq!(cfg.rule_set().version, "v2-synthetic");

        std::env::set_var("CARDIO_TEST_ENV_SEED", "99");
        let cfg = PipelineConfig::load_with_prefix(Some(file.path()), "CARDIO_TEST_ENV").unwrap();
        std::env::remove_var("CARDIO_TEST_ENV_SEED");
        assert_eq!(cfg.seed, 99);
        assert_eq!(cfg.slice_size, 64);
    }

    #[test]
    fn test_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "slice_size = 0").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            PipelineConfig::load_with_prefix(Some(file.path()), "CARDIO_TEST_INVALID"),
            Err(PipelineError::Config(_))
        ));

        let mut rules = RuleSet::canonical().clone();
        rules.bands.reverse();
        let cfg = PipelineConfig {
            rules: RuleSetChoice::Custom(rules),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(PipelineError::RuleSet(_))));
    }

    #[test]
    fn test_custom_rules_round_trip() {
        let mut rules = RuleSet::synthetic_tuned().clone();
        rules.version = "site-a".to_string();
        let cfg = PipelineConfig {
            rules: RuleSetChoice::Custom(rules),
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rule_set().version, "site-a");
        back.validate().unwrap();
    }
}
