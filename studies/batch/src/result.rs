//! 批量运行结果.

use cardio_berry::prelude::*;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

/// 单个检查的摘要.
pub struct StudySummary {
    modality: Modality,
    condition: Condition,
    icd10_code: String,
    risk_score: f64,
    slices: usize,
}

/// 单个患者的摘要.
pub struct PatientSummary {
    patient_id: String,
    studies: Vec<StudySummary>,
    skipped: Vec<(String, String)>,
}

impl From<&PatientRun> for PatientSummary {
    fn from(run: &PatientRun) -> Self {
        Self {
            patient_id: run.patient_id.clone(),
            studies: run
                .results
                .iter()
                .map(|(m, r)| StudySummary {
                    modality: *m,
                    condition: r.diagnosis.condition,
                    icd10_code: r.diagnosis.icd10_code.clone(),
                    risk_score: r.diagnosis.risk_score,
                    slices: r.slices.len(),
                })
                .collect(),
            skipped: run
                .skipped
                .iter()
                .map(|s| (s.modality.clone(), s.reason.to_string()))
                .collect(),
        }
    }
}

/// 将 `p` 的结果写进 `w` 中.
fn describe_into<W: Write>(p: &PatientSummary, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Patient `{}`:", p.patient_id)?;
    for s in &p.studies {
        writeln!(
            w,
            "{S4}{:<3} {:<24} {:<6} risk {:.2} ({} slices)",
            s.modality,
            s.condition.as_str(),
            s.icd10_code,
            s.risk_score,
            s.slices
        )?;
    }
    for (modality, reason) in &p.skipped {
        writeln!(w, "{S4}{modality:<3} skipped: {reason}")?;
    }
    Ok(())
}

/// 批量运行最终结果.
pub struct BatchResult {
    out_dir: PathBuf,
    patients: Vec<PatientSummary>,
}

impl BatchResult {
    pub fn new(out_dir: PathBuf, patients: Vec<PatientSummary>) -> Self {
        Self { out_dir, patients }
    }

    /// 各诊断出现的次数.
    fn condition_counts(&self) -> BTreeMap<Condition, usize> {
        let mut counts = BTreeMap::new();
        for s in self.patients.iter().flat_map(|p| &p.studies) {
            *counts.entry(s.condition).or_insert(0) += 1;
        }
        counts
    }

    /// 分析运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut w = stdout.lock();

        utils::sep_to(&mut w)?;
        for p in &self.patients {
            describe_into(p, &mut w)?;
            utils::sep_to(&mut w)?;
        }

        let skipped: usize = self.patients.iter().map(|p| p.skipped.len()).sum();
        writeln!(w, "Patients: {}", self.patients.len())?;
        writeln!(w, "Skipped studies: {skipped}")?;
        for (c, n) in self.condition_counts() {
            writeln!(w, "    {:<24} {n}", c.as_str())?;
        }
        writeln!(w, "Output: {}", self.out_dir.display())?;
        Ok(())
    }
}
