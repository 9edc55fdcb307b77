//! 跨切片的特征描述统计量.

use crate::features::numeric::{mean, population_std};
use crate::features::{Feature, FeatureVector};
use itertools::{Itertools, MinMaxResult};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// 单个特征在所有切片上的统计量.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// 均值.
    pub mean: f64,
    /// 总体标准差.
    pub std: f64,
    /// 最小值.
    pub min: f64,
    /// 最大值.
    pub max: f64,
}

impl Summary {
    /// 对一列数值求统计量. 空列返回 `None`.
    pub fn of(column: &[f64]) -> Option<Summary> {
        let (min, max) = match column.iter().copied().map(OrderedFloat).minmax() {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(v) => (v.0, v.0),
            MinMaxResult::MinMax(lo, hi) => (lo.0, hi.0),
        };
        Some(Summary {
            mean: mean(column),
            std: population_std(column),
            min,
            max,
        })
    }
}

/// 一次检查所有切片的逐特征统计量.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStatistics {
    slice_count: usize,
    #[serde(flatten)]
    per_feature: BTreeMap<&'static str, Summary>,
}

impl FeatureStatistics {
    /// 统计 `vectors`. 输入为空时结果也为空.
    pub fn from_vectors(vectors: &[FeatureVector]) -> Self {
        let per_feature = Feature::ALL
            .iter()
            .filter_map(|&f| {
                let column: Vec<f64> = vectors.iter().map(|v| v.get(f)).collect();
                Summary::of(&column).map(|s| (f.as_str(), s))
            })
            .collect();
        Self {
            slice_count: vectors.len(),
            per_feature,
        }
    }

    /// 参与统计的切片数.
    #[inline]
    pub fn slice_count(&self) -> usize {
        self.slice_count
    }

    /// 某个特征的统计量.
    pub fn get(&self, feature: Feature) -> Option<&Summary> {
        self.per_feature.get(feature.as_str())
    }

    /// 没有任何切片.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slice_count == 0
    }

    /// 以表格形式写入 `dst`.
    pub fn describe_into(&self, dst: &mut impl Write) -> fmt::Result {
        writeln!(dst, "slices: {}", self.slice_count)?;
        for f in Feature::ALL {
            if let Some(s) = self.get(f) {
                writeln!(
                    dst,
                    "{:<16} mean {:>8.4}  std {:>8.4}  min {:>8.4}  max {:>8.4}",
                    f.as_str(),
                    s.mean,
                    s.std,
                    s.min,
                    s.max
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_all;
    use crate::synth;

    #[test]
    fn test_summary() {
        let s = Summary::of(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!((s.min, s.max, s.mean), (1.0, 3.0, 2.0));
        assert!((s.std - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);

        let one = Summary::of(&[0.25]).unwrap();
        assert_eq!((one.min, one.max, one.std), (0.25, 0.25, 0.0));
        assert!(Summary::of(&[]).is_none());
    }

    #[test]
    fn test_statistics_cover_all_features() {
        let vectors = extract_all(&synth::generate(4, 32, 2));
        let stats = FeatureStatistics::from_vectors(&vectors);
        assert_eq!(stats.slice_count(), 4);
        for f in Feature::ALL {
            let s = stats.get(f).unwrap();
            assert!(s.min - 1e-12 <= s.mean && s.mean <= s.max + 1e-12, "{f}");
        }

        let mut table = String::new();
        stats.describe_into(&mut table).unwrap();
        assert_eq!(table.lines().count(), 1 + Feature::ALL.len());
    }

    #[test]
    fn test_empty() {
        let stats = FeatureStatistics::from_vectors(&[]);
        assert!(stats.is_empty());
        assert!(stats.get(Feature::Entropy).is_none());
    }
}
