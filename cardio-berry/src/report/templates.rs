//! 报告文本模板.

use super::ImageCharacteristics;
use crate::classify::Condition;
use crate::consts::REPORT_PRECISION;
use crate::{Gender, Modality};

const P: usize = REPORT_PRECISION;

/// 各诊断对应的 findings 与 recommendations.
pub(super) fn condition_block(
    condition: Condition,
    img: &ImageCharacteristics,
) -> (Vec<String>, Vec<String>) {
    let area = img.cardiac_area;
    let symmetry = img.symmetry;
    let (findings, recommendations): (Vec<String>, &[&str]) = match condition {
        Condition::Normal => (
            vec![
                "Cardiac structures appear within normal limits.".into(),
                "No evidence of significant cardiac pathology.".into(),
                format!("Cardiac area: {area:.P$} (normal range: 0.15-0.35)"),
                format!("Cardiac symmetry score: {symmetry:.P$} (good symmetry > 0.7)"),
            ],
            &["Routine follow-up as per standard guidelines."],
        ),
        Condition::CoronaryArteryDisease => (
            vec![
                "Findings suggestive of coronary artery disease.".into(),
                "Possible calcifications or narrowing observed in coronary arteries.".into(),
                format!("Cardiac area: {area:.P$} (slightly enlarged)"),
                format!(
                    "Image contrast: {:.P$} (elevated, may indicate calcifications)",
                    img.contrast
                ),
            ],
            &[
                "Further evaluation with coronary CT angiography recommended.",
                "Cardiology consultation advised.",
                "Lipid profile and cardiac risk factor assessment.",
            ],
        ),
        Condition::Arrhythmia => (
            vec![
                "Features suggestive of potential arrhythmogenic substrate.".into(),
                "Structural changes may predispose to electrical abnormalities.".into(),
                format!("Cardiac symmetry score: {symmetry:.P$} (reduced symmetry)"),
            ],
            &[
                "Electrophysiology study may be considered.",
                "Holter monitoring recommended for rhythm assessment.",
            ],
        ),
        Condition::MyocardialInfarction => (
            vec![
                "Findings consistent with myocardial infarction (current or prior).".into(),
                "Regional wall motion abnormalities or scar tissue identified.".into(),
                format!("Cardiac area: {area:.P$} (may be enlarged)"),
                format!(
                    "Image entropy: {:.P$} (elevated, indicating tissue heterogeneity)",
                    img.entropy
                ),
            ],
            &[
                "Urgent cardiology consultation recommended.",
                "Further assessment with cardiac MRI or echocardiography.",
                "Cardiac enzymes and ECG monitoring.",
            ],
        ),
        Condition::Cardiomyopathy => (
            vec![
                "Findings suggestive of cardiomyopathy.".into(),
                "Global cardiac enlargement or hypertrophy observed.".into(),
                format!("Cardiac area: {area:.P$} (enlarged)"),
                format!("Cardiac symmetry score: {symmetry:.P$} (reduced symmetry)"),
            ],
            &[
                "Comprehensive cardiac evaluation recommended.",
                "Echocardiography for functional assessment.",
                "Consider genetic testing if indicated.",
            ],
        ),
        Condition::MildCardiomyopathy => (
            vec![
                "Mild alterations in cardiac tissue characteristics.".into(),
                "Moderate image contrast variations suggestive of early structural changes."
                    .into(),
                format!("Tissue complexity (entropy): {:.P$}", img.entropy),
            ],
            &[
                "Cardiology evaluation recommended.",
                "Consider echocardiogram for functional assessment.",
            ],
        ),
        Condition::HeartFailure => (
            vec![
                "Significant cardiac structural alterations identified.".into(),
                "Marked tissue heterogeneity and contrast variations.".into(),
                format!("Cardiac area: {area:.P$}"),
                format!("Tissue complexity: {:.P$} (elevated)", img.entropy),
            ],
            &[
                "Urgent cardiology evaluation recommended.",
                "Comprehensive cardiac imaging and laboratory studies.",
                "Medical therapy optimization as per guidelines.",
            ],
        ),
    };
    (
        findings,
        recommendations.iter().map(|s| s.to_string()).collect(),
    )
}

/// 人口学与模态相关的附加 findings, 按固定顺序排列.
pub(super) fn addenda(age: u32, gender: Gender, modality: Modality) -> Vec<String> {
    let mut out = Vec::new();
    if age > 60 {
        out.push("Age-related cardiovascular changes observed.");
    }
    match gender {
        Gender::Male if age > 45 => {
            out.push("Consider additional risk factor assessment for coronary artery disease.")
        }
        Gender::Female if age > 55 => {
            out.push("Post-menopausal cardiovascular risk factors should be evaluated.")
        }
        _ => {}
    }
    out.push(match modality {
        Modality::Ct => "CT imaging provides excellent visualization of coronary calcifications.",
        Modality::Mri => "MRI provides detailed tissue characterization and functional assessment.",
    });
    out.into_iter().map(String::from).collect()
}
