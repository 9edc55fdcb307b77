//! 单切片特征提取.
//!
//! 每张切片得到一个固定的 [`FeatureVector`]; 一次检查的全部切片再按字段求平均,
//! 得到 [`AggregateFeatures`], 供分类器使用.
//!
//! 所有函数都是纯函数, 不修改输入.

mod area;
pub(crate) mod numeric;
mod symmetry;
mod texture;

pub use area::cardiac_area;
pub use symmetry::symmetry_score;
pub use texture::{entropy, homogeneity, local_std_map};

use crate::error::{PipelineError, Result};
use crate::{OwnedSlice, SliceView};
use numeric::{mean, population_std};
use serde::{Deserialize, Serialize};
use std::fmt;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 特征名. 规则集按名字引用特征.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// 平均强度.
    MeanIntensity,
    /// 强度总体标准差.
    StdIntensity,
    /// 最大强度.
    MaxIntensity,
    /// 最小强度.
    MinIntensity,
    /// 对比度 `max - min`.
    Contrast,
    /// 直方图熵.
    Entropy,
    /// 局部均匀度.
    Homogeneity,
    /// 心脏区域面积占比.
    CardiacArea,
    /// 左右对称度.
    SymmetryScore,
}

impl Feature {
    /// 所有特征, 按 [`FeatureVector`] 字段顺序.
    pub const ALL: [Feature; 9] = [
        Feature::MeanIntensity,
        Feature::StdIntensity,
        Feature::MaxIntensity,
        Feature::MinIntensity,
        Feature::Contrast,
        Feature::Entropy,
        Feature::Homogeneity,
        Feature::CardiacArea,
        Feature::SymmetryScore,
    ];

    /// 字段名.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::MeanIntensity => "mean_intensity",
            Feature::StdIntensity => "std_intensity",
            Feature::MaxIntensity => "max_intensity",
            Feature::MinIntensity => "min_intensity",
            Feature::Contrast => "contrast",
            Feature::Entropy => "entropy",
            Feature::Homogeneity => "homogeneity",
            Feature::CardiacArea => "cardiac_area",
            Feature::SymmetryScore => "symmetry_score",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 单张切片的特征.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// 平均强度.
    pub mean_intensity: f64,
    /// 强度总体标准差 (`ddof = 0`).
    pub std_intensity: f64,
    /// 最大强度.
    pub max_intensity: f64,
    /// 最小强度.
    pub min_intensity: f64,
    /// `max_intensity - min_intensity`.
    pub contrast: f64,
    /// 256-bin 直方图熵, 单位 bit.
    pub entropy: f64,
    /// 局部均匀度, (0, 1\].
    pub homogeneity: f64,
    /// 心脏区域面积占比, \[0, 1\].
    pub cardiac_area: f64,
    /// 左右对称度, (0, 1\].
    pub symmetry_score: f64,
}

impl FeatureVector {
    /// 按名字取特征值.
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::MeanIntensity => self.mean_intensity,
            Feature::StdIntensity => self.std_intensity,
            Feature::MaxIntensity => self.max_intensity,
            Feature::MinIntensity => self.min_intensity,
            Feature::Contrast => self.contrast,
            Feature::Entropy => self.entropy,
            Feature::Homogeneity => self.homogeneity,
            Feature::CardiacArea => self.cardiac_area,
            Feature::SymmetryScore => self.symmetry_score,
        }
    }

    /// 逐字段求平均. `vectors` 为空时所有字段为 NaN.
    pub fn field_mean(vectors: &[FeatureVector]) -> FeatureVector {
        let column = |f: Feature| {
            if vectors.is_empty() {
                return f64::NAN;
            }
            mean(&vectors.iter().map(|v| v.get(f)).collect::<Vec<_>>())
        };
        FeatureVector {
            mean_intensity: column(Feature::MeanIntensity),
            std_intensity: column(Feature::StdIntensity),
            max_intensity: column(Feature::MaxIntensity),
            min_intensity: column(Feature::MinIntensity),
            contrast: column(Feature::Contrast),
            entropy: column(Feature::Entropy),
            homogeneity: column(Feature::Homogeneity),
            cardiac_area: column(Feature::CardiacArea),
            symmetry_score: column(Feature::SymmetryScore),
        }
    }
}

/// 一次检查中所有切片特征的逐字段平均.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateFeatures {
    means: FeatureVector,
    slice_count: usize,
}

impl AggregateFeatures {
    /// 聚合 `vectors`. 输入为空时返回 [`PipelineError::EmptyStudy`].
    pub fn from_vectors(vectors: &[FeatureVector]) -> Result<Self> {
        if vectors.is_empty() {
            return Err(PipelineError::EmptyStudy);
        }
        Ok(Self {
            means: FeatureVector::field_mean(vectors),
            slice_count: vectors.len(),
        })
    }

    /// 各字段均值.
    #[inline]
    pub fn means(&self) -> &FeatureVector {
        &self.means
    }

    /// 参与聚合的切片数.
    #[inline]
    pub fn slice_count(&self) -> usize {
        self.slice_count
    }

    /// 按名字取特征均值.
    #[inline]
    pub fn get(&self, feature: Feature) -> f64 {
        self.means.get(feature)
    }
}

/// 计算单张切片的全部特征.
pub fn extract(slice: &SliceView) -> FeatureVector {
    let pixels: Vec<f64> = slice.iter().copied().collect();
    let (min, max) = if pixels.is_empty() {
        (f64::NAN, f64::NAN)
    } else {
        pixels
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    };
    FeatureVector {
        mean_intensity: mean(&pixels),
        std_intensity: population_std(&pixels),
        max_intensity: max,
        min_intensity: min,
        contrast: max - min,
        entropy: entropy(slice),
        homogeneity: homogeneity(slice),
        cardiac_area: cardiac_area(slice),
        symmetry_score: symmetry_score(slice),
    }
}

/// 计算所有切片的特征, 输出顺序与输入一致. 切片间并行.
#[cfg(feature = "rayon")]
pub fn extract_all(slices: &[OwnedSlice]) -> Vec<FeatureVector> {
    slices.par_iter().map(|s| extract(&s.as_view())).collect()
}

/// 计算所有切片的特征, 输出顺序与输入一致.
#[cfg(not(feature = "rayon"))]
pub fn extract_all(slices: &[OwnedSlice]) -> Vec<FeatureVector> {
    slices.iter().map(|s| extract(&s.as_view())).collect()
}

/// 切片合法性检查的统计结果.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SliceValidation {
    /// 切片总数.
    pub total: usize,
    /// 合法切片数.
    pub valid: usize,
}

impl SliceValidation {
    /// 是否至少有一张合法切片.
    #[inline]
    pub fn has_valid(&self) -> bool {
        self.valid > 0
    }
}

/// 切片是否合法: 形状为 `expected_size × expected_size`, 非空,
/// 且每个像素都是 \[0, 1\] 内的有限值.
pub fn is_valid_slice(slice: &SliceView, expected_size: usize) -> bool {
    !slice.is_empty()
        && slice.shape() == (expected_size, expected_size)
        && slice.is_normalized()
}

/// 统计 `slices` 中的合法切片数.
pub fn validate(slices: &[OwnedSlice], expected_size: usize) -> SliceValidation {
    SliceValidation {
        total: slices.len(),
        valid: slices
            .iter()
            .filter(|s| is_valid_slice(&s.as_view(), expected_size))
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth;

    #[test]
    fn test_contrast_is_max_minus_min() {
        for s in synth::generate(3, 64, 21) {
            let f = extract(&s.as_view());
            assert_eq!(f.contrast, f.max_intensity - f.min_intensity);
            assert!(f.min_intensity >= 0.0 && f.max_intensity <= 1.0);
        }
    }

    #[test]
    fn test_ranges_on_synthetic_slices() {
        for s in synth::generate(4, 64, 8) {
            let f = extract(&s.as_view());
            assert!(f.entropy >= 0.0 && f.entropy <= 8.0);
            assert!(f.homogeneity > 0.0 && f.homogeneity <= 1.0);
            assert!(f.cardiac_area >= 0.0 && f.cardiac_area <= 1.0);
            assert!(f.symmetry_score > 0.0 && f.symmetry_score <= 1.0);
            assert!(f.std_intensity >= 0.0);
        }
    }

    #[test]
    fn test_mirror_image_has_unit_symmetry() {
        let s = OwnedSlice::from_shape_fn((16, 16), |(h, w)| {
            let m = w.min(15 - w);
            (h as f64 * 0.03 + m as f64 * 0.05).min(1.0)
        });
        assert_eq!(extract(&s.as_view()).symmetry_score, 1.0);
    }

    #[test]
    fn test_constant_slice() {
        let s = OwnedSlice::from_shape_fn((10, 10), |_| 0.5);
        let f = extract(&s.as_view());
        assert_eq!(f.mean_intensity, 0.5);
        assert_eq!(f.std_intensity, 0.0);
        assert_eq!(f.contrast, 0.0);
        assert_eq!(f.entropy, 0.0);
        assert_eq!(f.homogeneity, 1.0);
        // Otsu 阈值为 0, 整幅图像都是前景.
        assert_eq!(f.cardiac_area, 81.0 / 100.0);
        assert_eq!(f.symmetry_score, 1.0);
    }

    #[test]
    fn test_extract_all_preserves_order() {
        let slices = synth::generate(5, 32, 3);
        let all = extract_all(&slices);
        assert_eq!(all.len(), 5);
        for (s, f) in slices.iter().zip(&all) {
            assert_eq!(extract(&s.as_view()), *f);
        }
    }

    #[test]
    fn test_aggregate() {
        let slices = synth::generate(3, 32, 9);
        let all = extract_all(&slices);
        let agg = AggregateFeatures::from_vectors(&all).unwrap();
        assert_eq!(agg.slice_count(), 3);
        let expected = (all[0].entropy + all[1].entropy + all[2].entropy) / 3.0;
        assert!((agg.get(Feature::Entropy) - expected).abs() < 1e-12);

        assert!(matches!(
            AggregateFeatures::from_vectors(&[]),
            Err(PipelineError::EmptyStudy)
        ));
        assert!(FeatureVector::field_mean(&[]).contrast.is_nan());
    }

    #[test]
    fn test_validate() {
        let mut slices = synth::generate(3, 16, 1);
        slices.push(OwnedSlice::from_shape_fn((16, 8), |_| 0.5));
        slices.push(OwnedSlice::from_shape_fn((16, 16), |_| f64::NAN));
        slices.push(OwnedSlice::from_shape_fn((16, 16), |_| 1.5));
        let v = validate(&slices, 16);
        assert_eq!(v, SliceValidation { total: 6, valid: 3 });
        assert!(v.has_valid());
        assert!(!validate(&[], 16).has_valid());
    }

    #[test]
    fn test_feature_names() {
        let f = extract(&OwnedSlice::from_shape_fn((4, 4), |(h, _)| h as f64 / 3.0).as_view());
        let json = serde_json::to_value(f).unwrap();
        for feature in Feature::ALL {
            assert_eq!(json[feature.as_str()].as_f64(), Some(f.get(feature)));
        }
    }
}
