//! 纹理类特征: 直方图熵与局部均匀度.

use super::numeric::{mean, pairwise_sum, population_std};
use crate::consts::{ENTROPY_BINS, ENTROPY_EPSILON, HOMOGENEITY_WINDOW};
use crate::SliceView;

/// 在固定区间 \[0, 1\] 上做 [`ENTROPY_BINS`] 分箱直方图, 归一化后求 Shannon 熵
/// `-Σ p·log2(p + ε)`.
///
/// 分箱规则与 `numpy.histogram(bins=256, range=(0, 1))` 一致: 区间左闭右开,
/// 最后一个箱右端闭合; 区间外 (含 NaN) 的像素不计数. 没有任何像素落入区间时返回 0.
///
/// 单箱直方图按公式会得到 `-log2(1 + ε) ≈ -1.4e-10`, 这里截断为 0, 保证结果非负.
pub fn entropy(slice: &SliceView) -> f64 {
    let mut hist = [0u64; ENTROPY_BINS];
    let mut total = 0u64;
    for &v in slice.iter().filter(|v| (0.0..=1.0).contains(*v)) {
        // bin 边缘是 2 的幂的倍数, 乘法和截断都是精确的.
        let bin = ((v * ENTROPY_BINS as f64) as usize).min(ENTROPY_BINS - 1);
        hist[bin] += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let terms: Vec<f64> = hist
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * (p + ENTROPY_EPSILON).log2()
        })
        .collect();
    (-pairwise_sum(&terms)).max(0.0)
}

/// scipy `ndimage` 的 `reflect` 边界规则 (`d c b a | a b c d | d c b a`).
#[inline]
fn reflect(i: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let m = i.rem_euclid(period);
    (if m < len { m } else { period - 1 - m }) as usize
}

/// 局部标准差图: 以每个像素为中心取 `HOMOGENEITY_WINDOW × HOMOGENEITY_WINDOW`
/// 滑窗 (越界部分按 `reflect` 规则取值), 求滑窗内总体标准差.
///
/// 返回值按行优先排列.
pub fn local_std_map(slice: &SliceView) -> Vec<f64> {
    let (height, width) = slice.shape();
    let half = (HOMOGENEITY_WINDOW / 2) as isize;
    let mut window = Vec::with_capacity(HOMOGENEITY_WINDOW * HOMOGENEITY_WINDOW);
    let mut out = Vec::with_capacity(slice.size());

    for h in 0..height as isize {
        for w in 0..width as isize {
            window.clear();
            for dh in -half..=half {
                let rh = reflect(h + dh, height);
                for dw in -half..=half {
                    window.push(slice[(rh, reflect(w + dw, width))]);
                }
            }
            out.push(population_std(&window));
        }
    }
    out
}

/// 均匀度 `1 / (1 + mean(local_std))`. 取值于 (0, 1\], 空图返回 1.
pub fn homogeneity(slice: &SliceView) -> f64 {
    if slice.is_empty() {
        return 1.0;
    }
    1.0 / (1.0 + mean(&local_std_map(slice)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OwnedSlice;

    fn constant(v: f64, n: usize) -> OwnedSlice {
        OwnedSlice::from_shape_fn((n, n), |_| v)
    }

    #[test]
    fn test_entropy_constant_is_zero() {
        for v in [0.0, 0.3, 1.0] {
            assert_eq!(entropy(&constant(v, 16).as_view()), 0.0, "v = {v}");
        }
    }

    #[test]
    fn test_entropy_two_levels_is_one_bit() {
        let s = OwnedSlice::from_shape_fn((8, 8), |(_, w)| if w < 4 { 0.1 } else { 0.9 });
        let e = entropy(&s.as_view());
        assert!((e - 1.0).abs() < 1e-8);
    }

    #[test]
    fn test_entropy_uniform_bins() {
        // 每个箱恰好一个像素: 熵为 log2(256) = 8.
        let s = OwnedSlice::from_shape_fn((16, 16), |(h, w)| (h * 16 + w) as f64 / 256.0);
        let e = entropy(&s.as_view());
        assert!((e - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_entropy_ignores_out_of_range() {
        let s = OwnedSlice::from_shape_fn((2, 2), |(h, _)| if h == 0 { 0.5 } else { 1.5 });
        assert_eq!(entropy(&s.as_view()), 0.0);
        let s = OwnedSlice::from_shape_fn((2, 2), |_| -1.0);
        assert_eq!(entropy(&s.as_view()), 0.0);
    }

    #[test]
    fn test_reflect() {
        let idx: Vec<usize> = (-3..7).map(|i| reflect(i, 4)).collect();
        assert_eq!(idx, vec![2, 1, 0, 0, 1, 2, 3, 3, 2, 1]);
        assert_eq!(reflect(-2, 1), 0);
        assert_eq!(reflect(2, 1), 0);
    }

    #[test]
    fn test_homogeneity_constant_is_one() {
        assert_eq!(homogeneity(&constant(0.5, 9).as_view()), 1.0);
    }

    #[test]
    fn test_homogeneity_range() {
        let s = OwnedSlice::from_shape_fn((12, 12), |(h, w)| ((h + w) % 2) as f64);
        let v = homogeneity(&s.as_view());
        assert!(v > 0.0 && v < 1.0);
        // 棋盘格任意 5x5 窗口中有 12 或 13 个 1, 标准差约 0.5.
        assert!((v - 1.0 / 1.5).abs() < 0.01);
    }

    #[test]
    fn test_local_std_map_tiny_image() {
        // 1x1 图像: 所有反射都回到自身.
        let s = constant(0.5, 1);
        assert_eq!(local_std_map(&s.as_view()), vec![0.0]);

        // 25 个 0.7 的和有舍入误差, 标准差只是接近 0.
        let s = constant(0.7, 1);
        assert!(local_std_map(&s.as_view())[0] < 1e-12);
    }
}
