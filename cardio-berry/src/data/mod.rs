//! 检查 (study) 元信息与切片数据结构.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod slice;
pub mod window;

pub use slice::{ImgWriteVis, OwnedSlice, SliceView};
pub use window::IntensityWindow;

/// 成像模态.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modality {
    /// 计算机断层扫描.
    #[serde(rename = "CT")]
    Ct,

    /// 磁共振成像.
    #[serde(rename = "MRI")]
    Mri,
}

impl Modality {
    /// 所有模态, 按报告中的固定顺序排列.
    pub const ALL: [Modality; 2] = [Modality::Ct, Modality::Mri];

    /// 模态的标准缩写.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ct => "CT",
            Self::Mri => "MRI",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Modality {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CT" => Ok(Self::Ct),
            "MRI" => Ok(Self::Mri),
            other => Err(InputError::UnknownModality(other.to_string())),
        }
    }
}

/// 患者性别.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// 男性.
    #[serde(rename = "M")]
    Male,

    /// 女性.
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// 单字母缩写.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            other => Err(InputError::UnknownGender(other.to_string())),
        }
    }
}

/// 未经校验的检查记录, 即 `master_metadata.csv` 中的一行.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRecord {
    /// 患者 ID.
    pub patient_id: String,

    /// 模态字符串, 期望 `CT` 或 `MRI`.
    pub modality: String,

    /// 影像所在目录. 目前切片为合成数据, 该字段仅作记录.
    #[serde(default)]
    pub folder_path: String,

    /// 切片数.
    pub num_slices: i64,

    /// 年龄.
    pub age: i64,

    /// 性别字符串, 期望 `M` 或 `F`.
    pub gender: String,
}

/// 经过校验的检查.
///
/// 该结构是只读的; 流水线只消费它, 从不修改.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    patient_id: String,
    modality: Modality,
    folder_path: String,
    num_slices: usize,
    age: u32,
    gender: Gender,
}

impl Study {
    /// 直接构建. 调用方负责保证 `age > 0`.
    pub fn new(
        patient_id: impl Into<String>,
        modality: Modality,
        num_slices: usize,
        age: u32,
        gender: Gender,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            modality,
            folder_path: String::new(),
            num_slices,
            age,
            gender,
        }
    }

    /// 患者 ID.
    #[inline]
    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// 模态.
    #[inline]
    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// 影像目录.
    #[inline]
    pub fn folder_path(&self) -> &str {
        &self.folder_path
    }

    /// 切片数.
    #[inline]
    pub fn num_slices(&self) -> usize {
        self.num_slices
    }

    /// 年龄.
    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// 性别.
    #[inline]
    pub fn gender(&self) -> Gender {
        self.gender
    }
}

impl TryFrom<&StudyRecord> for Study {
    type Error = InputError;

    fn try_from(r: &StudyRecord) -> Result<Self, Self::Error> {
        let patient_id = r.patient_id.trim();
        if patient_id.is_empty() {
            return Err(InputError::EmptyPatientId);
        }
        let num_slices =
            usize::try_from(r.num_slices).map_err(|_| InputError::NegativeSliceCount(r.num_slices))?;
        let age = match u32::try_from(r.age) {
            Ok(age) if age > 0 => age,
            _ => return Err(InputError::NonPositiveAge(r.age)),
        };
        Ok(Self {
            patient_id: patient_id.to_string(),
            modality: r.modality.parse()?,
            folder_path: r.folder_path.clone(),
            num_slices,
            age,
            gender: r.gender.parse()?,
        })
    }
}
