//! 程序运行函数.

use crate::result::{BatchResult, PatientSummary};
use anyhow::{bail, Context};
use cardio_berry::prelude::*;
use cardio_berry::report::clinical;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::info;
use utils::loader;

/// 实际运行.
pub fn run() -> anyhow::Result<BatchResult> {
    let config = loader::config_from_env().context("loading pipeline config")?;
    let Some(mut cache) = loader::metadata_cache_from_env_or_home() else {
        bail!(
            "cannot locate master_metadata.csv, set ${}",
            loader::METADATA_ENV
        );
    };
    let records = read_records(&mut cache)?;
    let patients = cache.patient_ids()?;

    let out_dir = loader::output_dir_from_env();
    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let dump_slices = loader::dump_slices_from_env();

    let pipeline = Pipeline::new(config).context("building pipeline")?;
    info!(
        patients = patients.len(),
        records = records.len(),
        rules = %pipeline.rules().version,
        cpus = utils::cpus(),
        "running batch"
    );

    let summaries = patients
        .par_iter()
        .map(|pid| {
            let run = pipeline.run(pid, &records);
            export(&run, &out_dir, dump_slices)
                .with_context(|| format!("exporting results of {pid}"))?;
            Ok(PatientSummary::from(&run))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(BatchResult::new(out_dir, summaries))
}

/// 读取缓存中的全部记录. 出错时附带文件路径.
fn read_records(cache: &mut MetadataCache) -> anyhow::Result<Vec<StudyRecord>> {
    let path = cache.path().to_path_buf();
    cache
        .records()
        .map(<[_]>::to_vec)
        .with_context(|| format!("reading {}", path.display()))
}

/// 将一个患者的结果写入 `out_dir/<patient_id>/`.
fn export(run: &PatientRun, out_dir: &Path, dump_slices: bool) -> anyhow::Result<()> {
    if run.is_empty() {
        return Ok(());
    }
    let dir = out_dir.join(&run.patient_id);
    fs::create_dir_all(&dir)?;

    for (modality, result) in &run.results {
        let json = serde_json::to_string_pretty(&result.report)?;
        fs::write(dir.join(format!("{modality}_report.json")), json)?;

        if dump_slices {
            let slices = result.enhanced_slices.as_ref().unwrap_or(&result.slices);
            for (i, s) in slices.iter().enumerate() {
                s.save(dir.join(format!("{modality}_slice_{i:03}.png")))?;
            }
        }
    }

    let date = chrono::Local::now().date_naive();
    let text = clinical::render(&run.patient_id, &run.reports(), date);
    fs::write(dir.join("clinical_report.txt"), text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_records_reports_path() {
        let mut cache = MetadataCache::new("/no/such/dir/master_metadata.csv");
        let err = read_records(&mut cache).unwrap_err();
        assert_eq!(err.to_string(), "reading /no/such/dir/master_metadata.csv");
        assert_eq!(cache.load_count(), 0);
    }
}
