//! `master_metadata.csv` 的读取与缓存.
//!
//! 缓存是调用方显式持有的对象, 不是进程级全局状态.
//! 每次访问前比较文件的修改时间与长度, 变化时重新读取.

use crate::error::Result;
use crate::StudyRecord;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

/// 读取整个元数据文件. 未知列被忽略.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<StudyRecord>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<StudyRecord>, _>>()?;
    Ok(records)
}

/// 判断文件是否变化的依据.
type Stamp = (SystemTime, u64);

fn stamp(path: &Path) -> Result<Stamp> {
    let meta = fs::metadata(path)?;
    Ok((meta.modified()?, meta.len()))
}

/// 带修改时间失效策略的元数据缓存.
#[derive(Debug)]
pub struct MetadataCache {
    path: PathBuf,
    cached: Option<(Stamp, Vec<StudyRecord>)>,
    loads: usize,
}

impl MetadataCache {
    /// 为 `path` 创建缓存. 此时不读取文件.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: None,
            loads: 0,
        }
    }

    /// 文件路径.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 实际读取文件的次数.
    #[inline]
    pub fn load_count(&self) -> usize {
        self.loads
    }

    /// 丢弃缓存, 下次访问时强制重新读取.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// 所有记录. 文件变化时重新读取.
    pub fn records(&mut self) -> Result<&[StudyRecord]> {
        let current = stamp(&self.path)?;
        let fresh = matches!(&self.cached, Some((s, _)) if *s == current);
        if !fresh {
            let records = load_records(&self.path)?;
            self.loads += 1;
            info!(path = %self.path.display(), rows = records.len(), "metadata loaded");
            self.cached = Some((current, records));
        } else {
            debug!(path = %self.path.display(), "metadata cache hit");
        }
        Ok(self
            .cached
            .as_ref()
            .map(|(_, r)| r.as_slice())
            .unwrap_or_default())
    }

    /// 某个患者的全部记录, 保持文件中的顺序.
    pub fn studies_for(&mut self, patient_id: &str) -> Result<Vec<StudyRecord>> {
        Ok(self
            .records()?
            .iter()
            .filter(|r| r.patient_id.trim() == patient_id)
            .cloned()
            .collect())
    }

    /// 去重后的患者 ID, 按首次出现的顺序.
    pub fn patient_ids(&mut self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        for r in self.records()? {
            let id = r.patient_id.trim();
            if !id.is_empty() && !ids.iter().any(|x| x == id) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }
}
