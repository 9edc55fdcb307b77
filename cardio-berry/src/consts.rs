//! 通用常量.

/// 合成切片的默认边长.
pub const DEFAULT_SLICE_SIZE: usize = 256;

/// 合成切片背景噪声的上界 (不含).
pub const NOISE_CEILING: f64 = 0.5;

/// 合成 "心脏" 区域叠加的强度.
pub const ORGAN_BOOST: f64 = 0.4;

/// 结构伪影线段的强度.
pub const ARTIFACT_INTENSITY: f64 = 0.8;

/// 结构伪影线段的线宽 (像素).
pub const ARTIFACT_THICKNESS: f64 = 2.0;

/// 每隔多少张切片附加一次结构伪影.
pub const ARTIFACT_PERIOD: usize = 3;

/// 熵直方图的分箱数.
pub const ENTROPY_BINS: usize = 256;

/// 熵计算中避免 `log2(0)` 的偏移量.
pub const ENTROPY_EPSILON: f64 = 1e-10;

/// 局部标准差滑窗边长.
pub const HOMOGENEITY_WINDOW: usize = 5;

/// 左右两半形状不一致时的中性对称度.
pub const NEUTRAL_SYMMETRY: f64 = 0.5;

/// 报告中数值的默认小数位数.
pub const REPORT_PRECISION: usize = 3;

/// 默认报告生成系统版本标识.
pub const REPORT_SYSTEM_VERSION: &str = "AI Cardiac Analysis System v2.0";
