#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 对 (合成的) 心脏 CT/MRI 切片计算一组固定的图像描述量,
//! 聚合后经过规则打分映射到临床诊断标签, 并生成结构化报告.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 真实影像数据目前不可得, 所有切片均由 [`synth`] 以固定种子程序化生成.
//! 2. 数值语义需要与下游报告文本逐位兼容, 因此各特征的计算细节
//!   (直方图分箱, 边界反射规则, Otsu 阈值, 轮廓面积) 均有明确约定, 修改前请三思.
//!
//! # 开发计划
//!
//! ### 合成切片生成 ✅
//!
//! 均匀噪声背景 + 中心圆形 "心脏" 区域 + 每三张切片附加两条结构伪影线段.
//!
//! 实现位于 `cardio-berry/src/synth`.
//!
//! ### 单切片特征提取 ✅
//!
//! 矩统计量, 256-bin Shannon 熵, 5x5 局部标准差均匀度,
//! Otsu + Suzuki 外轮廓面积, 左右翻转对称度.
//!
//! 实现位于 `cardio-berry/src/features`.
//!
//! ### 规则分类器 ✅
//!
//! 权重与阈值带以 [`classify::RuleSet`] 数据形式给出, 并显式版本化.
//! 目前保留 `v1` (默认) 和 `v2-synthetic` 两套规则, 二者不合并.
//!
//! 实现位于 `cardio-berry/src/classify`.
//!
//! ### 报告生成 ✅
//!
//! 1. 结构化报告 (findings / recommendations, JSON 字段名与下游保持一致). ✅
//! 2. 可打印的纯文本临床报告. ✅
//! 3. 外部文本生成服务接缝 (可注入, 有超时, 不重试). ✅
//!
//! 实现位于 `cardio-berry/src/report`.
//!
//! ### 流水线编排 ✅
//!
//! 按检查 (study) 隔离失败, 按模态收集结果. 开启 `rayon` feature 时检查间并行.
//!
//! 实现位于 `cardio-berry/src/pipeline`.
//!
//! ### 小功能 ✅
//!
//! 1. 带 mtime 失效策略的元数据缓存. ✅
//! 2. 跨切片的特征统计量. ✅
//! 3. 切片 PNG 导出, 方便肉眼检查. ✅

/// 二维索引 (高, 宽), 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

pub mod consts;

mod data;

pub use data::{
    Gender, ImgWriteVis, IntensityWindow, Modality, OwnedSlice, SliceView, Study, StudyRecord,
};

pub mod classify;
pub mod config;
pub mod error;
pub mod features;
pub mod metadata;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod stats;
pub mod synth;

pub use error::{InputError, PipelineError, Result};
