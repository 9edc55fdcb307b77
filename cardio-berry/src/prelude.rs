//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx2d;

pub use crate::data::{
    Gender, ImgWriteVis, IntensityWindow, Modality, OwnedSlice, SliceView, Study, StudyRecord,
};

pub use crate::consts::{DEFAULT_SLICE_SIZE, REPORT_SYSTEM_VERSION};

pub use crate::classify::{classify, classify_aggregate, Condition, Diagnosis, RuleSet};
pub use crate::config::{PipelineConfig, RuleSetChoice};
pub use crate::error::{InputError, PipelineError, TextGenError};
pub use crate::features::{extract, extract_all, AggregateFeatures, Feature, FeatureVector};
pub use crate::metadata::MetadataCache;
pub use crate::pipeline::{Enhancer, PatientRun, Pipeline, SkippedStudy, StudyResult};
pub use crate::report::narrative::{Narrator, TextGenerator};
pub use crate::report::{Report, ReportAssembler};
pub use crate::stats::FeatureStatistics;
pub use crate::synth::SliceGenerator;
