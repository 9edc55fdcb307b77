//! 以数据形式给出的打分规则集.

use super::Condition;
use crate::error::{PipelineError, Result};
use crate::features::{AggregateFeatures, Feature, FeatureVector};
use crate::{Gender, Modality};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// 对单个特征值的判定.
///
/// 比较均为严格不等; 特征值为 NaN 时任何判定都不成立.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Test {
    /// `v > x`.
    Above(f64),
    /// `v < x`.
    Below(f64),
    /// `v < low || v > high`.
    Outside {
        /// 区间下界.
        low: f64,
        /// 区间上界.
        high: f64,
    },
}

impl Test {
    /// 判定 `v` 是否满足条件.
    #[inline]
    pub fn matches(&self, v: f64) -> bool {
        match *self {
            Test::Above(x) => v > x,
            Test::Below(x) => v < x,
            Test::Outside { low, high } => v < low || v > high,
        }
    }
}

/// 一档判定及其权重.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// 判定条件.
    pub test: Test,
    /// 满足时累加的分值.
    pub weight: f64,
}

/// 针对一个特征的规则. 各档按顺序判定, 只有第一个成立的档位计分.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRule {
    /// 特征名.
    pub feature: Feature,
    /// 档位, 按优先级排列.
    pub tiers: Vec<Tier>,
}

/// 年龄档位: `age > above` 时累加 `weight`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeTier {
    /// 年龄下界 (不含).
    pub above: u32,
    /// 分值.
    pub weight: f64,
}

/// 性别规则: 性别一致且 (如给出) 年龄大于 `min_age_exclusive` 时累加 `weight`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderRule {
    /// 性别.
    pub gender: Gender,
    /// 年龄下界 (不含).
    #[serde(default)]
    pub min_age_exclusive: Option<u32>,
    /// 分值.
    pub weight: f64,
}

/// 模态权重.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalityWeight {
    /// 模态.
    pub modality: Modality,
    /// 分值.
    pub weight: f64,
}

/// 分数带: 分数小于 `below` (且不小于上一带的 `below`) 时映射到 `condition`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// 上界 (不含).
    pub below: f64,
    /// 对应的诊断.
    pub condition: Condition,
}

/// 诊断到 ICD-10 编码的映射项.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icd10 {
    /// 诊断.
    pub condition: Condition,
    /// 编码.
    pub code: String,
}

/// 查不到编码时的占位.
pub const MISSING_ICD10: &str = "N/A";

/// 完整的规则集.
///
/// 计分顺序固定: 特征规则 (按列表顺序), 年龄, 性别, 模态.
/// 年龄和性别规则都只取第一条成立的.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// 版本标识.
    pub version: String,
    /// 特征规则.
    pub feature_rules: Vec<FeatureRule>,
    /// 年龄档位.
    #[serde(default)]
    pub age_tiers: Vec<AgeTier>,
    /// 性别规则.
    #[serde(default)]
    pub gender_rules: Vec<GenderRule>,
    /// 模态权重.
    #[serde(default)]
    pub modality_weights: Vec<ModalityWeight>,
    /// 分数带, 按 `below` 升序.
    pub bands: Vec<Band>,
    /// 分数不小于最后一个 `below` 时的诊断.
    pub fallback: Condition,
    /// ICD-10 编码表.
    pub icd10: Vec<Icd10>,
}

static CANONICAL: Lazy<RuleSet> = Lazy::new(|| {
    use Condition::*;
    RuleSet {
        version: "v1".to_string(),
        feature_rules: vec![
            rule(Feature::Contrast, &[(Test::Above(0.7), 0.2)]),
            rule(Feature::Entropy, &[(Test::Above(5.0), 0.2)]),
            rule(
                Feature::CardiacArea,
                &[(Test::Outside { low: 0.1, high: 0.4 }, 0.2)],
            ),
            rule(Feature::SymmetryScore, &[(Test::Below(0.6), 0.2)]),
        ],
        age_tiers: vec![
            AgeTier {
                above: 60,
                weight: 0.2,
            },
            AgeTier {
                above: 40,
                weight: 0.1,
            },
        ],
        gender_rules: vec![GenderRule {
            gender: Gender::Male,
            min_age_exclusive: None,
            weight: 0.1,
        }],
        modality_weights: vec![
            ModalityWeight {
                modality: Modality::Ct,
                weight: 0.05,
            },
            ModalityWeight {
                modality: Modality::Mri,
                weight: 0.1,
            },
        ],
        bands: bands(&[
            (0.3, Normal),
            (0.5, CoronaryArteryDisease),
            (0.7, Arrhythmia),
            (0.8, Cardiomyopathy),
        ]),
        fallback: MyocardialInfarction,
        icd10: codes(&[
            (Normal, "Z00"),
            (CoronaryArteryDisease, "I25"),
            (Arrhythmia, "I49"),
            (Cardiomyopathy, "I42"),
            (MyocardialInfarction, "I21"),
            (HeartFailure, "I50"),
        ]),
    }
});

static SYNTHETIC_TUNED: Lazy<RuleSet> = Lazy::new(|| {
    use Condition::*;
    RuleSet {
        version: "v2-synthetic".to_string(),
        feature_rules: vec![
            rule(
                Feature::Contrast,
                &[(Test::Above(0.25), 0.3), (Test::Below(0.1), 0.1)],
            ),
            rule(
                Feature::Entropy,
                &[(Test::Above(5.5), 0.3), (Test::Below(3.0), 0.1)],
            ),
            rule(Feature::Homogeneity, &[(Test::Below(0.3), 0.2)]),
        ],
        age_tiers: vec![
            AgeTier {
                above: 65,
                weight: 0.3,
            },
            AgeTier {
                above: 45,
                weight: 0.2,
            },
        ],
        gender_rules: vec![
            GenderRule {
                gender: Gender::Male,
                min_age_exclusive: Some(45),
                weight: 0.1,
            },
            GenderRule {
                gender: Gender::Female,
                min_age_exclusive: Some(55),
                weight: 0.1,
            },
        ],
        modality_weights: Vec::new(),
        bands: bands(&[
            (0.3, Normal),
            (0.5, MildCardiomyopathy),
            (0.7, CoronaryArteryDisease),
        ]),
        fallback: HeartFailure,
        icd10: codes(&[
            (Normal, "Z00.00"),
            (MildCardiomyopathy, "I43"),
            (CoronaryArteryDisease, "I25"),
            (HeartFailure, "I50"),
        ]),
    }
});

fn rule(feature: Feature, tiers: &[(Test, f64)]) -> FeatureRule {
    FeatureRule {
        feature,
        tiers: tiers
            .iter()
            .map(|&(test, weight)| Tier { test, weight })
            .collect(),
    }
}

fn bands(list: &[(f64, Condition)]) -> Vec<Band> {
    list.iter()
        .map(|&(below, condition)| Band { below, condition })
        .collect()
}

fn codes(list: &[(Condition, &str)]) -> Vec<Icd10> {
    list.iter()
        .map(|&(condition, code)| Icd10 {
            condition,
            code: code.to_string(),
        })
        .collect()
}

impl RuleSet {
    /// 默认规则集 `v1`.
    pub fn canonical() -> &'static RuleSet {
        &CANONICAL
    }

    /// 针对合成数据调过阈值的规则集 `v2-synthetic`. 与 `v1` 互相独立, 不混用.
    pub fn synthetic_tuned() -> &'static RuleSet {
        &SYNTHETIC_TUNED
    }

    /// 对聚合特征和人口学信息计分.
    pub fn score(
        &self,
        features: &AggregateFeatures,
        age: u32,
        gender: Gender,
        modality: Modality,
    ) -> f64 {
        self.score_means(features.means(), age, gender, modality)
    }

    pub(super) fn score_means(
        &self,
        means: &FeatureVector,
        age: u32,
        gender: Gender,
        modality: Modality,
    ) -> f64 {
        let mut risk = 0.0;
        for r in &self.feature_rules {
            let v = means.get(r.feature);
            if let Some(t) = r.tiers.iter().find(|t| t.test.matches(v)) {
                risk += t.weight;
            }
        }
        if let Some(t) = self.age_tiers.iter().find(|t| age > t.above) {
            risk += t.weight;
        }
        if let Some(g) = self
            .gender_rules
            .iter()
            .find(|g| g.gender == gender && g.min_age_exclusive.map_or(true, |min| age > min))
        {
            risk += g.weight;
        }
        if let Some(m) = self.modality_weights.iter().find(|m| m.modality == modality) {
            risk += m.weight;
        }
        risk
    }

    /// 分数所在的带. 带连续且覆盖整个实数轴.
    pub fn condition_for(&self, score: f64) -> Condition {
        self.bands
            .iter()
            .find(|b| score < b.below)
            .map_or(self.fallback, |b| b.condition)
    }

    /// 诊断对应的 ICD-10 编码.
    pub fn icd10_for(&self, condition: Condition) -> Option<&str> {
        self.icd10
            .iter()
            .find(|c| c.condition == condition)
            .map(|c| c.code.as_str())
    }

    /// 检查规则集是否自洽: 分数带严格升序, 权重有限且非负, 每个可达诊断都有编码.
    pub fn validate(&self) -> Result<()> {
        let err = |msg: String| Err(PipelineError::RuleSet(format!("{}: {msg}", self.version)));

        if self.version.trim().is_empty() {
            return Err(PipelineError::RuleSet("empty version".to_string()));
        }
        if self.bands.is_empty() {
            return err("no score bands".to_string());
        }
        for b in &self.bands {
            if !b.below.is_finite() {
                return err(format!("band bound {} is not finite", b.below));
            }
        }
        for (lo, hi) in self.bands.iter().zip(self.bands.iter().skip(1)) {
            if lo.below >= hi.below {
                return err(format!(
                    "bands must be strictly ascending, got {} then {}",
                    lo.below, hi.below
                ));
            }
        }

        let weights = self
            .feature_rules
            .iter()
            .flat_map(|r| r.tiers.iter().map(|t| t.weight))
            .chain(self.age_tiers.iter().map(|t| t.weight))
            .chain(self.gender_rules.iter().map(|g| g.weight))
            .chain(self.modality_weights.iter().map(|m| m.weight));
        for w in weights {
            if !w.is_finite() || w < 0.0 {
                return err(format!("weight {w} must be finite and non-negative"));
            }
        }

        let reachable = self
            .bands
            .iter()
            .map(|b| b.condition)
            .chain(std::iter::once(self.fallback));
        for c in reachable {
            if self.icd10_for(c).is_none() {
                return err(format!("no ICD-10 code for `{c}`"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_sets_are_valid() {
        RuleSet::canonical().validate().unwrap();
        RuleSet::synthetic_tuned().validate().unwrap();
        assert_eq!(RuleSet::canonical().version, "v1");
        assert_eq!(RuleSet::synthetic_tuned().version, "v2-synthetic");
    }

    #[test]
    fn test_tests() {
        assert!(Test::Above(0.7).matches(0.75));
        assert!(!Test::Above(0.7).matches(0.7));
        assert!(Test::Below(0.6).matches(0.5));
        let out = Test::Outside { low: 0.1, high: 0.4 };
        assert!(out.matches(0.05) && out.matches(0.45));
        assert!(!out.matches(0.1) && !out.matches(0.25) && !out.matches(0.4));
        assert!(!out.matches(f64::NAN));
    }

    #[test]
    fn test_bands_are_exhaustive() {
        let rs = RuleSet::canonical();
        assert_eq!(rs.condition_for(-1.0), Condition::Normal);
        assert_eq!(rs.condition_for(0.0), Condition::Normal);
        assert_eq!(rs.condition_for(0.3), Condition::CoronaryArteryDisease);
        assert_eq!(rs.condition_for(0.69), Condition::Arrhythmia);
        assert_eq!(rs.condition_for(0.7), Condition::Cardiomyopathy);
        assert_eq!(rs.condition_for(0.8), Condition::MyocardialInfarction);
        assert_eq!(rs.condition_for(1e9), Condition::MyocardialInfarction);

        let mut score = 0.0;
        while score < 2.0 {
            let c = rs.condition_for(score);
            assert!(rs.icd10_for(c).is_some());
            score += 0.01;
        }
    }

    #[test]
    fn test_validate_rejects_bad_sets() {
        let mut rs = RuleSet::canonical().clone();
        rs.bands.swap(0, 1);
        assert!(matches!(rs.validate(), Err(PipelineError::RuleSet(_))));

        let mut rs = RuleSet::canonical().clone();
        rs.age_tiers[0].weight = -0.1;
        assert!(rs.validate().is_err());

        let mut rs = RuleSet::synthetic_tuned().clone();
        rs.icd10.retain(|c| c.condition != Condition::HeartFailure);
        assert!(rs.validate().is_err());

        let mut rs = RuleSet::canonical().clone();
        rs.bands.clear();
        assert!(rs.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let json = serde_json::to_string(RuleSet::synthetic_tuned()).unwrap();
        assert!(json.contains(r#""test":{"above":0.25}"#));
        let back: RuleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, RuleSet::synthetic_tuned());
    }
}
