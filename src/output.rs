use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::config::{ExperimentConfig, Preset};
use crate::disk::Realization;
use crate::sweep::{AccuracyTable, SweepPoint};
use crate::trials::export;
use crate::Result;

pub const OUTPUT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub schema_version: String,
    pub mode: String,
    pub created_at: String,
    pub files: Vec<String>,
    pub experiment: ExperimentConfig,
}

impl Manifest {
    pub fn new(mode: &str, experiment: &ExperimentConfig, files: Vec<String>) -> Self {
        Self {
            schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
            mode: mode.to_string(),
            created_at: Utc::now().to_rfc3339(),
            files,
            experiment: experiment.clone(),
        }
    }
}

/// Creates `<base>/<UTC timestamp>`, adding a counter suffix if that already exists.
pub fn create_timestamped_output_dir(base: &Path) -> Result<PathBuf> {
    fs::create_dir_all(base)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = base.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = base.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

pub fn realization_file_name(threshold: f64, disk_num: usize) -> String {
    format!("{threshold:.3}-{disk_num}.txt")
}

pub fn accuracy_file_name(preset: Preset) -> String {
    format!("accuracy-{}.csv", preset.number())
}

pub fn write_realization(path: &Path, realization: &Realization) -> Result<()> {
    fs::write(path, export(realization))?;
    info!(path = %path.display(), disks = realization.len(), "wrote realization");
    Ok(())
}

pub fn write_sweep_csv(path: &Path, points: &[SweepPoint]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = points.len(), "wrote sweep");
    Ok(())
}

/// Grid layout: repetition counts across the top, sample counts down the side.
pub fn write_accuracy_csv(path: &Path, table: &AccuracyTable) -> Result<()> {
    let mut writer = Writer::from_path(path)?;

    let mut header = vec![String::new()];
    header.extend(table.repetitions.iter().map(|r| r.to_string()));
    writer.write_record(&header)?;

    for (sample_num, row) in table.sample_nums.iter().zip(&table.variances) {
        let mut record = vec![sample_num.to_string()];
        record.extend(row.iter().map(|v| format!("{v:.3}")));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    info!(path = %path.display(), preset = table.preset.label(), "wrote accuracy table");
    Ok(())
}

pub fn write_manifest_json(outdir: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let path = outdir.join("manifest.json");
    fs::write(&path, serde_json::to_string_pretty(manifest)?)?;
    Ok(path)
}
