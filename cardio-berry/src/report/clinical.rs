//! 可打印的纯文本临床报告.

use super::Report;
use crate::consts::{REPORT_PRECISION, REPORT_SYSTEM_VERSION};
use crate::Modality;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write;

const P: usize = REPORT_PRECISION;

/// 报告日期格式, 如 `March 09, 2024`.
pub const REPORT_DATE_FORMAT: &str = "%B %d, %Y";

/// 将同一患者各模态的报告渲染为一份纯文本临床报告.
///
/// 患者年龄, 性别与落款中的系统标识取自第一份报告;
/// 没有任何报告时前两者记为 `N/A`, 系统标识用默认值.
/// 模态按 CT, MRI 的顺序排列.
pub fn render(patient_id: &str, reports: &BTreeMap<Modality, Report>, date: NaiveDate) -> String {
    let date = date.format(REPORT_DATE_FORMAT).to_string();
    let (age, gender) = reports
        .values()
        .next()
        .map(|r| (r.age.to_string(), r.gender.to_string()))
        .unwrap_or_else(|| ("N/A".to_string(), "N/A".to_string()));

    let generated_by = reports
        .values()
        .next()
        .map_or(REPORT_SYSTEM_VERSION, |r| r.report_generated_by.as_str());

    let mut out = String::new();
    // 写入 String 不会失败.
    let _ = write_header(&mut out, patient_id, &age, &gender, &date);
    for (modality, report) in reports {
        let _ = write_study(&mut out, *modality, report);
    }
    let _ = write_footer(&mut out, generated_by, &date);
    out
}

fn write_header(
    out: &mut String,
    patient_id: &str,
    age: &str,
    gender: &str,
    date: &str,
) -> std::fmt::Result {
    writeln!(out, "CARDIAC IMAGING REPORT")?;
    writeln!(out, "{}", "=".repeat(45))?;
    writeln!(out)?;
    writeln!(out, "PATIENT INFORMATION:")?;
    writeln!(out, "-------------------")?;
    writeln!(out, "Patient ID: {patient_id}")?;
    writeln!(out, "Age: {age}")?;
    writeln!(out, "Gender: {gender}")?;
    writeln!(out, "Report Date: {date}")?;
    writeln!(out)?;
    writeln!(out, "CLINICAL HISTORY:")?;
    writeln!(out, "----------------")?;
    writeln!(
        out,
        "Cardiac imaging study performed for evaluation of cardiac function and structure."
    )?;
    writeln!(out)?;
    writeln!(out, "IMAGING STUDIES:")?;
    writeln!(out, "---------------")
}

fn write_study(out: &mut String, modality: Modality, r: &Report) -> std::fmt::Result {
    let img = &r.image_characteristics;
    writeln!(out)?;
    writeln!(out, "{modality} STUDY:")?;
    writeln!(out, "===============")?;
    writeln!(out, "Indication: Cardiac evaluation")?;
    writeln!(out, "Technique: Standard {modality} protocol")?;
    writeln!(out)?;
    writeln!(out, "FINDINGS:")?;
    writeln!(out, "--------")?;
    for f in &r.findings {
        writeln!(out, "- {f}")?;
    }
    writeln!(out)?;
    writeln!(out, "QUANTITATIVE ANALYSIS:")?;
    writeln!(out, "---------------------")?;
    writeln!(out, "Cardiac Area: {:.P$}", img.cardiac_area)?;
    writeln!(out, "Symmetry Score: {:.P$}", img.symmetry)?;
    writeln!(out, "Image Contrast: {:.P$}", img.contrast)?;
    writeln!(out)?;
    writeln!(out, "IMPRESSION:")?;
    writeln!(out, "----------")?;
    writeln!(out, "{}", r.condition_diagnosed.title())?;
    writeln!(out, "ICD-10 Code: {}", r.icd10_code)?;
    writeln!(out)?;
    writeln!(out, "RECOMMENDATIONS:")?;
    writeln!(out, "---------------")?;
    for rec in &r.recommendations {
        writeln!(out, "- {rec}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(50))?;
    writeln!(out)
}

fn write_footer(out: &mut String, generated_by: &str, date: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "END OF REPORT")?;
    writeln!(out, "=============")?;
    writeln!(out)?;
    writeln!(out, "This report was generated by the {generated_by}")?;
    writeln!(out, "and has been reviewed and approved by:")?;
    writeln!(out)?;
    writeln!(out, "___________________________________")?;
    writeln!(out, "John Doe, MD")?;
    writeln!(out, "Cardiologist")?;
    writeln!(out, "Cardiac Imaging Department")?;
    writeln!(out)?;
    writeln!(out, "Date: {date}")?;
    writeln!(out)?;
    writeln!(
        out,
        "Note: This report should be correlated with clinical findings and other diagnostic tests."
    )
}
