//! 对 `cardio-berry::metadata` 与 `cardio-berry::config` 的一层封装.
//! 提供从环境变量或家目录定位数据的加载器.

use cardio_berry::config::PipelineConfig;
use cardio_berry::metadata::MetadataCache;
use std::env;
use std::path::{Path, PathBuf};

/// 元数据文件路径的环境变量.
pub const METADATA_ENV: &str = "CARDIO_METADATA";

/// 配置文件路径的环境变量.
pub const CONFIG_ENV: &str = "CARDIO_CONFIG";

/// 输出目录的环境变量.
pub const OUTPUT_ENV: &str = "CARDIO_OUTPUT_DIR";

/// 置为任意非空值时导出切片 PNG.
pub const DUMP_SLICES_ENV: &str = "CARDIO_DUMP_SLICES";

/// 获得 `$HOME/dataset/<it...>`. 找不到家目录时返回 `None`.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 获取 `master_metadata.csv` 的路径.
///
/// 1. 若环境变量 `$CARDIO_METADATA` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/cardiac/master_metadata.csv`.
pub fn metadata_path_from_env_or_home() -> Option<PathBuf> {
    match env::var(METADATA_ENV) {
        Ok(d) if !d.is_empty() => Some(PathBuf::from(d)),
        _ => home_dataset_dir_with(["cardiac", "master_metadata.csv"]),
    }
}

/// 从 `$CARDIO_METADATA` 或者 `$HOME/dataset/cardiac/master_metadata.csv` 创建元数据缓存.
#[inline]
pub fn metadata_cache_from_env_or_home() -> Option<MetadataCache> {
    metadata_path_from_env_or_home().map(MetadataCache::new)
}

/// 读取 `$CARDIO_CONFIG` 指向的配置文件 (可以不存在), 再叠加 `CARDIO_*` 环境变量.
pub fn config_from_env() -> cardio_berry::Result<PipelineConfig> {
    let path = env::var_os(CONFIG_ENV).map(PathBuf::from);
    PipelineConfig::load(path.as_deref())
}

/// 输出目录: `$CARDIO_OUTPUT_DIR`, 缺省为当前目录下的 `cardio-out`.
pub fn output_dir_from_env() -> PathBuf {
    match env::var(OUTPUT_ENV) {
        Ok(d) if !d.is_empty() => PathBuf::from(d),
        _ => PathBuf::from("cardio-out"),
    }
}

/// 是否需要导出切片 PNG.
pub fn dump_slices_from_env() -> bool {
    env::var_os(DUMP_SLICES_ENV).is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_dataset_dir_with() {
        if let Some(p) = home_dataset_dir_with(["cardiac", "master_metadata.csv"]) {
            assert!(p.ends_with("dataset/cardiac/master_metadata.csv"));
        }
    }
}
