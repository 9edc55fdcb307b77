//! 外部文本生成服务接缝.
//!
//! 核心流水线不依赖任何具体服务: 调用方注入实现了 [`TextGenerator`] 的对象,
//! [`Narrator`] 负责为每个模态构造提示词, 限时调用, 清洗输出.
//! 调用失败或超时不会重试, 只会在对应模态的位置写入占位文本.

use super::Report;
use crate::error::TextGenError;
use crate::Modality;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// 服务失败时写入的占位文本.
pub const GENERATION_FAILED: &str = "Error generating report with text generation service";

/// 文本生成服务.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 根据提示词生成文本.
    async fn generate(&self, prompt: &str) -> Result<String, TextGenError>;
}

/// 为单个模态的报告构造提示词.
pub fn build_prompt(patient_id: &str, report: &Report) -> String {
    let bullets = |items: &[String]| {
        items
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "Generate a detailed, well-formatted clinical report for a cardiac patient.\n\
         Patient ID: {patient_id}\n\
         Modality: {}\n\
         Age: {}\n\
         Gender: {}\n\
         Condition Diagnosed: {}\n\
         ICD-10 Code: {}\n\
         \nKey Findings:\n{}\n\
         \nRecommendations:\n{}\n\
         Please present the report in a professional and structured format that is suitable for clinicians. \
         Use clear section headings (e.g., 'FINDINGS:', 'RECOMMENDATIONS:') and ensure that each section is separated by a blank line. \
         Use line breaks within sections to avoid long paragraphs. The report should not appear as a single block of text. \
         Additionally, remove any asterisks or decorative symbols from the output. \
         The Doctor name should be John Doe with an undersigned esign at the end of the report.",
        report.modality,
        report.age,
        report.gender,
        report.condition_diagnosed,
        report.icd10_code,
        bullets(&report.findings),
        bullets(&report.recommendations),
    )
}

/// 生成文本中的装饰符号.
static DECORATIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*★]").expect("valid regex"));

/// 换行, 任意空白, 换行.
static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

/// 清洗生成的文本: 去掉 `*` 与 `★`, 多个空行合并为一个,
/// 空白行置空, 其余行内连续空白合并为单个空格.
pub fn clean_text(text: &str) -> String {
    let stripped = DECORATIONS.replace_all(text, "");
    BLANK_RUN
        .replace_all(&stripped, "\n\n")
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 为患者的各模态报告生成叙述文本.
#[derive(Clone)]
pub struct Narrator {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Narrator {
    /// 以给定服务和单次调用超时构建.
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// 单次调用超时.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 限时调用一次服务.
    async fn call(&self, prompt: &str) -> Result<String, TextGenError> {
        match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(res) => res,
            Err(_) => Err(TextGenError::Timeout(self.timeout)),
        }
    }

    /// 依次为 CT, MRI 生成一段文本, 段落之间以空行分隔.
    ///
    /// 某个模态失败不影响其它模态.
    pub async fn narrate(&self, patient_id: &str, reports: &BTreeMap<Modality, Report>) -> String {
        let mut sections = Vec::with_capacity(Modality::ALL.len());
        for modality in Modality::ALL {
            let Some(report) = reports.get(&modality) else {
                sections.push(format!(
                    "No data found for Patient_ID: {patient_id} and Modality: {modality}"
                ));
                continue;
            };
            let body = match self.call(&build_prompt(patient_id, report)).await {
                Ok(text) => {
                    debug!(patient_id, %modality, len = text.len(), "narrative generated");
                    clean_text(&text)
                }
                Err(e) => {
                    warn!(patient_id, %modality, error = %e, "narrative generation failed");
                    GENERATION_FAILED.to_string()
                }
            };
            sections.push(format!("--- {modality} Report ---\n{body}"));
        }
        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str) -> Result<String, TextGenError> {
            let modality = prompt
                .lines()
                .find_map(|l| l.strip_prefix("Modality: "))
                .unwrap_or("?");
            Ok(format!("**FINDINGS:**   {modality}\n\n\n  ok ★"))
        }
    }

    /// MRI 失败, 其它成功.
    struct FailOnMri(AtomicUsize);

    #[async_trait]
    impl TextGenerator for FailOnMri {
        async fn generate(&self, prompt: &str) -> Result<String, TextGenError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            if prompt.contains("Modality: MRI") {
                Err(TextGenError::Service("quota exceeded".to_string()))
            } else {
                Ok("fine".to_string())
            }
        }
    }

    struct Stalled;

    #[async_trait]
    impl TextGenerator for Stalled {
        async fn generate(&self, _prompt: &str) -> Result<String, TextGenError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".to_string())
        }
    }

    fn both() -> BTreeMap<Modality, Report> {
        Modality::ALL
            .into_iter()
            .map(|m| (m, sample_report(m)))
            .collect()
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("**Title**\n\n\n\nBody   text  "), "Title\n\nBody text");
        assert_eq!(clean_text("a\n \t\n  b"), "a\n\nb");
        assert_eq!(clean_text("a\nb"), "a\nb");
        assert_eq!(clean_text("a\n\n \n\t\n\nb\n\n\nc"), "a\n\nb\n\nc");
        assert_eq!(clean_text("x\n  y"), "x\ny");
        assert_eq!(clean_text("★ x ★"), "x");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_prompt_fields() {
        let report = sample_report(Modality::Ct);
        let p = build_prompt("P001", &report);
        assert!(p.contains("Patient ID: P001\nModality: CT\nAge: 66\nGender: M\n"));
        assert!(p.contains("Condition Diagnosed: cardiomyopathy\nICD-10 Code: I42\n"));
        assert!(p.contains("\nKey Findings:\n- Findings suggestive of cardiomyopathy.\n"));
        assert!(p.contains("\nRecommendations:\n- Comprehensive cardiac evaluation recommended.\n"));
    }

    #[tokio::test]
    async fn test_narrate_success() {
        let narrator = Narrator::new(Arc::new(Echo), Duration::from_secs(5));
        let text = narrator.narrate("P001", &both()).await;
        assert_eq!(
            text,
            "--- CT Report ---\nFINDINGS: CT\n\nok\n\n--- MRI Report ---\nFINDINGS: MRI\n\nok"
        );
    }

    #[tokio::test]
    async fn test_service_error_keeps_other_modality() {
        let generator = Arc::new(FailOnMri(AtomicUsize::new(0)));
        let narrator = Narrator::new(generator.clone(), Duration::from_secs(5));
        let text = narrator.narrate("P001", &both()).await;
        assert_eq!(
            text,
            format!("--- CT Report ---\nfine\n\n--- MRI Report ---\n{GENERATION_FAILED}")
        );
        // 不重试.
        assert_eq!(generator.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_and_missing_modality() {
        let narrator = Narrator::new(Arc::new(Stalled), Duration::from_millis(20));
        let mut reports = BTreeMap::new();
        reports.insert(Modality::Mri, sample_report(Modality::Mri));
        let text = narrator.narrate("P001", &reports).await;
        assert_eq!(
            text,
            format!(
                "No data found for Patient_ID: P001 and Modality: CT\n\n\
                 --- MRI Report ---\n{GENERATION_FAILED}"
            )
        );
    }
}
