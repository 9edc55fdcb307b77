//! 结构化报告.
//!
//! [`Report`] 的字段名与嵌套结构即下游消费者读取的 JSON 格式, 修改需谨慎.
//! 纯文本临床报告见 [`clinical`], 外部文本生成服务见 [`narrative`].

pub mod clinical;
pub mod narrative;
mod templates;

use crate::classify::{Condition, Diagnosis};
use crate::consts::REPORT_SYSTEM_VERSION;
use crate::features::AggregateFeatures;
use crate::{Gender, Modality, Study};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 报告中 `analysis_date` 的格式.
pub const ANALYSIS_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 报告中附带的聚合图像特征.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCharacteristics {
    /// 平均强度.
    pub mean_intensity: f64,
    /// 强度标准差.
    pub std_intensity: f64,
    /// 对比度.
    pub contrast: f64,
    /// 熵.
    pub entropy: f64,
    /// 心脏面积占比.
    pub cardiac_area: f64,
    /// 对称度.
    pub symmetry: f64,
}

impl From<&AggregateFeatures> for ImageCharacteristics {
    fn from(agg: &AggregateFeatures) -> Self {
        let m = agg.means();
        Self {
            mean_intensity: m.mean_intensity,
            std_intensity: m.std_intensity,
            contrast: m.contrast,
            entropy: m.entropy,
            cardiac_area: m.cardiac_area,
            symmetry: m.symmetry_score,
        }
    }
}

/// 单个检查的诊断报告.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// 患者 ID.
    pub patient_id: String,
    /// 模态.
    pub modality: Modality,
    /// 年龄.
    pub age: u32,
    /// 性别.
    pub gender: Gender,
    /// 分析时间, 格式见 [`ANALYSIS_DATE_FORMAT`].
    pub analysis_date: String,
    /// 诊断标签.
    pub condition_diagnosed: Condition,
    /// ICD-10 编码.
    pub icd10_code: String,
    /// 聚合图像特征.
    pub image_characteristics: ImageCharacteristics,
    /// 检查所见, 有序.
    pub findings: Vec<String>,
    /// 建议, 有序.
    pub recommendations: Vec<String>,
    /// 生成系统标识.
    pub report_generated_by: String,
}

/// 报告组装器.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAssembler {
    system_version: String,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(REPORT_SYSTEM_VERSION)
    }
}

impl ReportAssembler {
    /// 以给定的系统标识构建.
    pub fn new(system_version: impl Into<String>) -> Self {
        Self {
            system_version: system_version.into(),
        }
    }

    /// 系统标识.
    #[inline]
    pub fn system_version(&self) -> &str {
        &self.system_version
    }

    /// 以当前本地时间组装报告.
    pub fn assemble(
        &self,
        study: &Study,
        diagnosis: &Diagnosis,
        features: &AggregateFeatures,
    ) -> Report {
        self.assemble_at(study, diagnosis, features, Local::now().naive_local())
    }

    /// 以给定时间组装报告. 相同输入总是得到相同输出.
    ///
    /// findings 顺序: 诊断相关段落, 年龄附注, 性别附注, 模态附注.
    pub fn assemble_at(
        &self,
        study: &Study,
        diagnosis: &Diagnosis,
        features: &AggregateFeatures,
        at: NaiveDateTime,
    ) -> Report {
        let image_characteristics = ImageCharacteristics::from(features);
        let (mut findings, recommendations) =
            templates::condition_block(diagnosis.condition, &image_characteristics);
        findings.extend(templates::addenda(
            study.age(),
            study.gender(),
            study.modality(),
        ));

        Report {
            patient_id: study.patient_id().to_string(),
            modality: study.modality(),
            age: study.age(),
            gender: study.gender(),
            analysis_date: at.format(ANALYSIS_DATE_FORMAT).to_string(),
            condition_diagnosed: diagnosis.condition,
            icd10_code: diagnosis.icd10_code.clone(),
            image_characteristics,
            findings,
            recommendations,
            report_generated_by: self.system_version.clone(),
        }
    }
}
