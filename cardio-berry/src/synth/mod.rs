//! 合成切片生成.
//!
//! 真实影像数据缺失时, 用程序化生成的单通道图像代替:
//!
//! 1. 背景为 \[0, 0.5) 均匀噪声;
//! 2. 中心半径为 `⌊size / 3⌋` 的圆形 "心脏" 区域叠加 0.4;
//! 3. 截断到 \[0, 1\];
//! 4. 下标为 3 的倍数的切片额外绘制两条强度 0.8、线宽 2 的结构伪影线段.
//!
//! 生成过程完全由种子决定.

use crate::consts::{
    ARTIFACT_INTENSITY, ARTIFACT_PERIOD, ARTIFACT_THICKNESS, NOISE_CEILING, ORGAN_BOOST,
};
use crate::{Modality, OwnedSlice};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 伪影线段端点相对图像中心的偏移, 以 `((dx0, dy0), (dx1, dy1))` 给出,
/// `x` 为列方向, `y` 为行方向.
const ARTIFACT_SEGMENTS: [((isize, isize), (isize, isize)); 2] =
    [((-30, -20), (30, -30)), ((-20, 30), (25, 25))];

/// 带种子的合成切片生成器.
///
/// 同一个生成器连续调用 [`SliceGenerator::generate`] 会继续消耗同一个随机流;
/// 如需复现, 请用同一个种子重新构建.
#[derive(Debug, Clone)]
pub struct SliceGenerator {
    rng: StdRng,
}

impl SliceGenerator {
    /// 以 `seed` 初始化.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 生成恰好 `num_slices` 张 `size × size` 的切片. `num_slices == 0` 时返回空序列.
    pub fn generate(&mut self, num_slices: usize, size: usize) -> Vec<OwnedSlice> {
        (0..num_slices).map(|i| self.one(i, size)).collect()
    }

    /// 生成下标为 `index` 的单张切片.
    fn one(&mut self, index: usize, size: usize) -> OwnedSlice {
        let rng = &mut self.rng;
        let mut img = Array2::from_shape_fn((size, size), |_| rng.gen::<f64>() * NOISE_CEILING);

        let center = (size / 2) as isize;
        let radius = (size / 3) as isize;
        for ((h, w), v) in img.indexed_iter_mut() {
            let (dy, dx) = (h as isize - center, w as isize - center);
            if dx * dx + dy * dy <= radius * radius {
                *v += ORGAN_BOOST;
            }
        }
        img.mapv_inplace(|v| v.clamp(0.0, 1.0));

        if index % ARTIFACT_PERIOD == 0 {
            for ((dx0, dy0), (dx1, dy1)) in ARTIFACT_SEGMENTS {
                draw_segment(
                    &mut img,
                    (center + dx0, center + dy0),
                    (center + dx1, center + dy1),
                    ARTIFACT_INTENSITY,
                    ARTIFACT_THICKNESS,
                );
            }
        }
        OwnedSlice::new(img)
    }
}

/// 便捷函数: 以 `seed` 生成 `num_slices` 张 `size × size` 的切片.
#[inline]
pub fn generate(num_slices: usize, size: usize, seed: u64) -> Vec<OwnedSlice> {
    SliceGenerator::new(seed).generate(num_slices, size)
}

/// 由流水线基础种子、患者 ID 和模态派生出单个检查的种子 (FNV-1a).
///
/// 派生结果与检查的处理顺序无关, 因此并行处理时依然可复现.
pub fn study_seed(base: u64, patient_id: &str, modality: Modality) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    base.to_le_bytes()
        .iter()
        .chain(patient_id.as_bytes())
        .chain(modality.as_str().as_bytes())
        .fold(OFFSET, |acc, &b| (acc ^ b as u64).wrapping_mul(PRIME))
}

/// 在 `img` 上绘制从 `from` 到 `to` 的线段, 坐标以 `(x, y)` 给出.
///
/// 像素中心到线段的距离不超过 `thickness / 2` 时被涂为 `value`.
/// 图像外的部分被裁剪.
fn draw_segment(
    img: &mut Array2<f64>,
    from: (isize, isize),
    to: (isize, isize),
    value: f64,
    thickness: f64,
) {
    let (height, width) = img.dim();
    if height == 0 || width == 0 {
        return;
    }
    let half = thickness / 2.0;
    let pad = half.ceil() as isize;
    let clip = |v: isize, len: usize| v.clamp(0, len as isize - 1) as usize;

    let x_lo = clip(from.0.min(to.0) - pad, width);
    let x_hi = clip(from.0.max(to.0) + pad, width);
    let y_lo = clip(from.1.min(to.1) - pad, height);
    let y_hi = clip(from.1.max(to.1) + pad, height);

    let a = (from.0 as f64, from.1 as f64);
    let b = (to.0 as f64, to.1 as f64);
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            if distance_to_segment((x as f64, y as f64), a, b) <= half {
                img[(y, x)] = value;
            }
        }
    }
}

/// 点 `p` 到线段 `ab` 的欧氏距离.
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let len2 = abx * abx + aby * aby;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * abx, a.1 + t * aby);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
