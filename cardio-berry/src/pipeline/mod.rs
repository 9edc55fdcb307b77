//! 流水线编排.
//!
//! 对一个患者的每条检查记录依次执行: 校验 → 生成切片 → 切片校验 → 增强 →
//! 特征提取 → 分类 → 组装报告. 单个检查失败只会被记录并跳过, 不影响其它检查.
//! 开启 `rayon` feature 时检查之间并行执行, 结果仍按记录顺序合并.

mod enhance;

pub use enhance::{Enhancer, Identity};

use crate::classify::{classify_aggregate, Diagnosis, RuleSet};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::features::{self, AggregateFeatures, FeatureVector};
use crate::report::{Report, ReportAssembler};
use crate::stats::FeatureStatistics;
use crate::synth::{study_seed, SliceGenerator};
use crate::{Modality, OwnedSlice, Study, StudyRecord};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 单个检查的完整处理结果.
#[derive(Debug, Clone)]
pub struct StudyResult {
    /// 检查.
    pub study: Study,
    /// 通过校验的原始切片.
    pub slices: Vec<OwnedSlice>,
    /// 增强后的切片. 未开启增强时为 `None`.
    pub enhanced_slices: Option<Vec<OwnedSlice>>,
    /// 每张切片的特征.
    pub features: Vec<FeatureVector>,
    /// 聚合特征.
    pub aggregate: AggregateFeatures,
    /// 跨切片统计量.
    pub statistics: FeatureStatistics,
    /// 诊断.
    pub diagnosis: Diagnosis,
    /// 报告.
    pub report: Report,
}

/// 被跳过的检查.
#[derive(Debug)]
pub struct SkippedStudy {
    /// 记录在输入中的下标.
    pub record_index: usize,
    /// 记录中的模态字符串 (可能不合法).
    pub modality: String,
    /// 原因.
    pub reason: PipelineError,
}

/// 一个患者的处理结果.
#[derive(Debug)]
pub struct PatientRun {
    /// 患者 ID.
    pub patient_id: String,
    /// 按模态收集的结果.
    pub results: BTreeMap<Modality, StudyResult>,
    /// 被跳过的检查.
    pub skipped: Vec<SkippedStudy>,
}

impl PatientRun {
    /// 各模态报告的副本.
    pub fn reports(&self) -> BTreeMap<Modality, Report> {
        self.results
            .iter()
            .map(|(m, r)| (*m, r.report.clone()))
            .collect()
    }

    /// 没有任何成功的检查.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// 流水线.
pub struct Pipeline {
    config: PipelineConfig,
    rules: RuleSet,
    enhancer: Box<dyn Enhancer>,
    assembler: ReportAssembler,
}

impl Pipeline {
    /// 以 `config` 构建. 配置不合法时返回错误.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let rules = config.rule_set().into_owned();
        let assembler = ReportAssembler::new(config.report_system_version.clone());
        Ok(Self {
            config,
            rules,
            enhancer: Box::new(Identity),
            assembler,
        })
    }

    /// 替换增强器.
    pub fn with_enhancer(mut self, enhancer: impl Enhancer + 'static) -> Self {
        self.enhancer = Box::new(enhancer);
        self
    }

    /// 配置.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 所用规则集.
    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// 处理单个已校验的检查.
    ///
    /// 没有任何合法切片时返回 [`PipelineError::EmptyStudy`].
    pub fn run_study(&self, study: &Study) -> Result<StudyResult> {
        let size = self.config.slice_size;
        let seed = study_seed(self.config.seed, study.patient_id(), study.modality());
        let generated = SliceGenerator::new(seed).generate(study.num_slices(), size);

        let total = generated.len();
        let slices: Vec<OwnedSlice> = generated
            .into_iter()
            .filter(|s| features::is_valid_slice(&s.as_view(), size))
            .collect();
        if slices.len() < total {
            warn!(
                patient_id = study.patient_id(),
                modality = %study.modality(),
                dropped = total - slices.len(),
                "invalid slices dropped"
            );
        }
        if slices.is_empty() {
            return Err(PipelineError::EmptyStudy);
        }

        let enhanced_slices = if self.config.enhance {
            debug!(enhancer = self.enhancer.name(), n = slices.len(), "enhancing slices");
            let enhanced: Vec<OwnedSlice> = slices
                .iter()
                .map(|s| self.enhancer.enhance(&s.as_view()))
                .filter(|s| features::is_valid_slice(&s.as_view(), size))
                .collect();
            if enhanced.len() < slices.len() {
                warn!(
                    patient_id = study.patient_id(),
                    modality = %study.modality(),
                    enhancer = self.enhancer.name(),
                    dropped = slices.len() - enhanced.len(),
                    "invalid enhanced slices dropped"
                );
            }
            if enhanced.is_empty() {
                return Err(PipelineError::EmptyStudy);
            }
            Some(enhanced)
        } else {
            None
        };

        let features = features::extract_all(enhanced_slices.as_deref().unwrap_or(&slices));
        let aggregate = AggregateFeatures::from_vectors(&features)?;
        let statistics = FeatureStatistics::from_vectors(&features);
        let diagnosis = classify_aggregate(
            &aggregate,
            study.age(),
            study.gender(),
            study.modality(),
            &self.rules,
        );
        let report = self.assembler.assemble(study, &diagnosis, &aggregate);

        info!(
            patient_id = study.patient_id(),
            modality = %study.modality(),
            slices = slices.len(),
            risk_score = diagnosis.risk_score,
            condition = %diagnosis.condition,
            "study analysed"
        );

        Ok(StudyResult {
            study: study.clone(),
            slices,
            enhanced_slices,
            features,
            aggregate,
            statistics,
            diagnosis,
            report,
        })
    }

    /// 校验并处理单条记录.
    fn run_record(&self, record: &StudyRecord) -> Result<StudyResult> {
        let study = Study::try_from(record)?;
        self.run_study(&study)
    }

    /// 处理 `records` 中属于 `patient_id` 的全部检查.
    ///
    /// 同一模态出现多次时, 后出现的结果覆盖先出现的.
    pub fn run(&self, patient_id: &str, records: &[StudyRecord]) -> PatientRun {
        let patient_id = patient_id.trim();
        let mine: Vec<(usize, &StudyRecord)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.patient_id.trim() == patient_id)
            .collect();

        #[cfg(feature = "rayon")]
        let outcomes: Vec<_> = mine
            .par_iter()
            .map(|&(i, r)| (i, r, self.run_record(r)))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let outcomes: Vec<_> = mine
            .iter()
            .map(|&(i, r)| (i, r, self.run_record(r)))
            .collect();

        let mut run = PatientRun {
            patient_id: patient_id.to_string(),
            results: BTreeMap::new(),
            skipped: Vec::new(),
        };
        for (record_index, record, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    let modality = result.study.modality();
                    if run.results.insert(modality, result).is_some() {
                        warn!(patient_id, %modality, record_index, "duplicate modality, earlier study replaced");
                    }
                }
                Err(reason) => {
                    warn!(patient_id, modality = %record.modality, record_index, %reason, "study skipped");
                    run.skipped.push(SkippedStudy {
                        record_index,
                        modality: record.modality.clone(),
                        reason,
                    });
                }
            }
        }
        run
    }

    /// 按患者首次出现的顺序处理 `records` 中的全部患者.
    pub fn run_all(&self, records: &[StudyRecord]) -> Vec<PatientRun> {
        let mut ids: Vec<&str> = Vec::new();
        for r in records {
            let id = r.patient_id.trim();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids.into_iter().map(|id| self.run(id, records)).collect()
    }
}
