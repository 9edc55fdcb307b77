//! 错误定义模块.

use std::time::Duration;
use thiserror::Error;

/// 检查记录 (study) 的输入错误. 出现该错误的检查会被跳过, 不影响同批次其它检查.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// 患者 ID 为空.
    #[error("patient id is empty")]
    EmptyPatientId,

    /// 切片数为负.
    #[error("negative slice count: {0}")]
    NegativeSliceCount(i64),

    /// 年龄必须为正.
    #[error("age must be positive, got {0}")]
    NonPositiveAge(i64),

    /// 未知性别.
    #[error("unknown gender `{0}`, expected `M` or `F`")]
    UnknownGender(String),

    /// 未知模态.
    #[error("unknown modality `{0}`, expected `CT` or `MRI`")]
    UnknownModality(String),
}

/// 流水线统一错误类型.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 检查记录不合法.
    #[error("invalid study: {0}")]
    InvalidStudy(#[from] InputError),

    /// 检查没有任何有效切片, 无法求平均特征.
    #[error("study has no valid slices")]
    EmptyStudy,

    /// 元数据 CSV 读取错误.
    #[error("metadata error: {0}")]
    Metadata(#[from] csv::Error),

    /// 底层 I/O 错误.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 配置加载错误.
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    /// 规则集不合法.
    #[error("invalid rule set: {0}")]
    RuleSet(String),

    /// 序列化错误.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 流水线统一结果类型.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// 外部文本生成服务的错误.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextGenError {
    /// 调用超时.
    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),

    /// 服务端返回错误.
    #[error("text generation service error: {0}")]
    Service(String),
}
