//! Parameter sweeps over thresholds, disk counts and sampling effort.

use rand::RngCore;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use crate::config::{ExperimentConfig, ExportRun, PackingConfig, Preset};
use crate::disk::Realization;
use crate::source::seeded_stream;
use crate::trials::{parallel_statistics, TrialRunner, TrialStatistics};
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct SweepPoint {
    pub preset: Preset,
    pub disk_num: usize,
    pub threshold: f64,
    pub sample_num: usize,
    pub repetitions: usize,
    pub mean: f64,
    pub variance: f64,
}

/// Variance of the packing fraction for each (sample_num, repetitions) cell.
#[derive(Debug, Clone, Serialize)]
pub struct AccuracyTable {
    pub preset: Preset,
    pub threshold: f64,
    pub disk_num: usize,
    pub sample_nums: Vec<usize>,
    pub repetitions: Vec<usize>,
    /// `variances[i][j]` belongs to `sample_nums[i]` and `repetitions[j]`.
    pub variances: Vec<Vec<f64>>,
}

// Each experiment draws from its own stream of the experiment seed.
const EXPORT_STREAM: u64 = 1;
const SWEEP_STREAM: u64 = 2;
const ACCURACY_STREAM: u64 = 3;

fn experiment_runner(experiment: &ExperimentConfig, stream: u64) -> TrialRunner<ChaCha8Rng> {
    TrialRunner::new(seeded_stream(experiment.seed, stream))
}

/// Sequential batches share one runner; parallel batches take their seed from it.
struct BatchRunner {
    runner: TrialRunner<ChaCha8Rng>,
    parallel: bool,
}

impl BatchRunner {
    fn new(experiment: &ExperimentConfig, stream: u64) -> Self {
        Self {
            runner: experiment_runner(experiment, stream),
            parallel: experiment.parallel,
        }
    }

    fn run(&mut self, config: &PackingConfig, trials: usize) -> Result<TrialStatistics> {
        if self.parallel {
            let seed = self.runner.source_mut().next_u64();
            parallel_statistics(config, trials, seed)
        } else {
            self.runner.statistics(config, trials)
        }
    }
}

/// Mean packing fraction for every preset, disk count and threshold.
pub fn threshold_sweep(experiment: &ExperimentConfig) -> Result<Vec<SweepPoint>> {
    experiment.validate()?;

    let settings = &experiment.sweep;
    let mut batches = BatchRunner::new(experiment, SWEEP_STREAM);
    let mut points = Vec::with_capacity(
        experiment.presets.len() * settings.disk_nums.len() * settings.thresholds.len(),
    );

    for &preset in &experiment.presets {
        let base = experiment.packing(preset).with_sample_num(settings.sample_num);
        for &disk_num in &settings.disk_nums {
            for &threshold in &settings.thresholds {
                let config = base.with_disk_num(disk_num).with_threshold(threshold);
                let stats = batches.run(&config, settings.repetitions)?;
                points.push(SweepPoint {
                    preset,
                    disk_num,
                    threshold,
                    sample_num: settings.sample_num,
                    repetitions: settings.repetitions,
                    mean: stats.mean,
                    variance: stats.variance,
                });
            }
            info!(preset = preset.label(), disk_num, "threshold sweep row done");
        }
    }

    Ok(points)
}

/// One accuracy table per preset.
pub fn accuracy_table(experiment: &ExperimentConfig) -> Result<Vec<AccuracyTable>> {
    experiment.validate()?;

    let settings = &experiment.accuracy;
    let mut batches = BatchRunner::new(experiment, ACCURACY_STREAM);
    let mut tables = Vec::with_capacity(experiment.presets.len());

    for &preset in &experiment.presets {
        let base = experiment
            .packing(preset)
            .with_threshold(settings.threshold)
            .with_disk_num(settings.disk_num);

        let mut variances = Vec::with_capacity(settings.sample_nums.len());
        for &sample_num in &settings.sample_nums {
            let config = base.with_sample_num(sample_num);
            let row = settings
                .repetitions
                .iter()
                .map(|&trials| batches.run(&config, trials).map(|s| s.variance))
                .collect::<Result<Vec<f64>>>()?;
            variances.push(row);
        }

        info!(preset = preset.label(), "accuracy table done");
        tables.push(AccuracyTable {
            preset,
            threshold: settings.threshold,
            disk_num: settings.disk_num,
            sample_nums: settings.sample_nums.clone(),
            repetitions: settings.repetitions.clone(),
            variances,
        });
    }

    Ok(tables)
}

/// One realization per configured export run.
pub fn export_runs(experiment: &ExperimentConfig) -> Result<Vec<(ExportRun, Realization)>> {
    experiment.validate()?;

    let base = experiment.packing(experiment.export.preset);
    let mut runner = experiment_runner(experiment, EXPORT_STREAM);

    experiment
        .export
        .runs
        .iter()
        .map(|run| {
            let config = base.with_threshold(run.threshold).with_disk_num(run.disk_num);
            runner.realize(&config).map(|realization| (*run, realization))
        })
        .collect()
}
