//! 左右对称度.

use super::numeric::mean;
use crate::consts::NEUTRAL_SYMMETRY;
use crate::SliceView;

/// 沿竖直中线把图像分为左半 `[0, w/2)` 和右半 `[w/2, w)` 两列区间,
/// 右半水平翻转后与左半求均方误差, 返回 `1 / (1 + mse)`.
///
/// 宽度为奇数时右半比左半多一列, 两半形状不一致, 返回中性值 [`NEUTRAL_SYMMETRY`].
/// 空图同样返回中性值.
pub fn symmetry_score(slice: &SliceView) -> f64 {
    let (height, width) = slice.shape();
    let half = width / 2;
    if width - half != half || slice.is_empty() {
        return NEUTRAL_SYMMETRY;
    }
    let mut sq = Vec::with_capacity(height * half);
    for h in 0..height {
        for w in 0..half {
            let d = slice[(h, w)] - slice[(h, width - 1 - w)];
            sq.push(d * d);
        }
    }
    1.0 / (1.0 + mean(&sq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OwnedSlice;

    #[test]
    fn test_mirror_symmetric_is_one() {
        let s = OwnedSlice::from_shape_fn((7, 10), |(h, w)| {
            let m = w.min(9 - w);
            ((h * 5 + m * 3) % 11) as f64 / 10.0
        });
        assert_eq!(symmetry_score(&s.as_view()), 1.0);
    }

    #[test]
    fn test_odd_width_is_neutral() {
        let s = OwnedSlice::from_shape_fn((4, 5), |_| 0.3);
        assert_eq!(symmetry_score(&s.as_view()), NEUTRAL_SYMMETRY);
        let s = OwnedSlice::from_shape_fn((0, 0), |_| 0.3);
        assert_eq!(symmetry_score(&s.as_view()), NEUTRAL_SYMMETRY);
    }

    #[test]
    fn test_half_black_half_white() {
        // mse = 1, 对称度 0.5.
        let s = OwnedSlice::from_shape_fn((3, 4), |(_, w)| if w < 2 { 0.0 } else { 1.0 });
        assert_eq!(symmetry_score(&s.as_view()), 0.5);
    }

    #[test]
    fn test_range() {
        let s = OwnedSlice::from_shape_fn((6, 6), |(h, w)| ((h * 7 + w * 13) % 10) as f64 / 9.0);
        let v = symmetry_score(&s.as_view());
        assert!(v > 0.0 && v <= 1.0);
    }
}
