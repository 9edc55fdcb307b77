//! 与 numpy 归约顺序一致的浮点求和与矩统计.
//!
//! numpy 对连续 `float64` 数组使用 8 路展开的成对求和 (块大小 128).
//! 这里按同样的分块方式累加, 使均值 / 标准差在大数组上的舍入行为与其保持一致.

/// numpy 成对求和的块大小.
const PW_BLOCKSIZE: usize = 128;

/// 成对求和.
pub(crate) fn pairwise_sum(a: &[f64]) -> f64 {
    let n = a.len();
    if n < 8 {
        a.iter().fold(0.0, |acc, v| acc + v)
    } else if n <= PW_BLOCKSIZE {
        let mut r = [0.0f64; 8];
        r.copy_from_slice(&a[..8]);
        let tail = n - n % 8;
        for chunk in a[8..tail].chunks_exact(8) {
            for (acc, v) in r.iter_mut().zip(chunk) {
                *acc += v;
            }
        }
        let mut res = ((r[0] + r[1]) + (r[2] + r[3])) + ((r[4] + r[5]) + (r[6] + r[7]));
        for v in &a[tail..] {
            res += v;
        }
        res
    } else {
        let mut n2 = n / 2;
        n2 -= n2 % 8;
        pairwise_sum(&a[..n2]) + pairwise_sum(&a[n2..])
    }
}

/// 算术平均. 空序列返回 `NaN`.
#[inline]
pub(crate) fn mean(a: &[f64]) -> f64 {
    pairwise_sum(a) / a.len() as f64
}

/// 总体标准差 (`ddof = 0`). 空序列返回 `NaN`.
pub(crate) fn population_std(a: &[f64]) -> f64 {
    let m = mean(a);
    let sq: Vec<f64> = a.iter().map(|v| (v - m) * (v - m)).collect();
    mean(&sq).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairwise_matches_exact_sums() {
        for n in [0usize, 1, 7, 8, 9, 127, 128, 129, 1000, 4099] {
            let a: Vec<f64> = (0..n).map(|i| (i % 17) as f64).collect();
            let exact: f64 = (0..n).map(|i| (i % 17) as f64).sum();
            assert_eq!(pairwise_sum(&a), exact, "n = {n}");
        }
    }

    #[test]
    fn test_mean_and_std() {
        let a = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&a), 5.0);
        assert_eq!(population_std(&a), 2.0);
        assert!(mean(&[]).is_nan());
        assert_eq!(population_std(&[3.0; 25]), 0.0);
    }
}
