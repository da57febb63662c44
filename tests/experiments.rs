use std::fs;
use std::path::PathBuf;

use diskpack::config::{AccuracySettings, ExportRun, ExportSettings, SweepSettings};
use diskpack::output::{
    accuracy_file_name, realization_file_name, write_accuracy_csv, write_manifest_json,
    write_realization, write_sweep_csv, Manifest,
};
use diskpack::sweep::export_runs;
use diskpack::{
    accuracy_table, threshold_sweep, ExperimentConfig, PackingError, Preset, SamplingDomain,
    TrialRunner,
};

fn bundled_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("configs")
        .join("default.toml")
}

fn quick_experiment() -> ExperimentConfig {
    ExperimentConfig {
        seed: 11,
        square_size: 4.0,
        presets: vec![Preset::Bidisperse],
        export: ExportSettings {
            preset: Preset::SmallDominant,
            runs: vec![ExportRun {
                threshold: 0.5,
                disk_num: 25,
            }],
        },
        sweep: SweepSettings {
            sample_num: 40,
            repetitions: 2,
            disk_nums: vec![10],
            thresholds: vec![0.4, 1.0],
        },
        accuracy: AccuracySettings {
            threshold: 0.8,
            disk_num: 10,
            sample_nums: vec![20, 40],
            repetitions: vec![1, 3],
        },
        ..ExperimentConfig::default()
    }
}

#[test]
fn bundled_config_matches_builtin_defaults() -> Result<(), PackingError> {
    let loaded = ExperimentConfig::from_toml_file(&bundled_config())?;
    let builtin = ExperimentConfig::default();
    assert_eq!(loaded.seed, builtin.seed);
    assert_eq!(loaded.presets, builtin.presets);
    assert_eq!(loaded.sweep.disk_nums, builtin.sweep.disk_nums);
    assert_eq!(loaded.sweep.thresholds, builtin.sweep.thresholds);
    assert_eq!(loaded.accuracy.repetitions, builtin.accuracy.repetitions);
    assert_eq!(loaded.export.runs, builtin.export.runs);
    assert_eq!(loaded.sampling_domain, SamplingDomain::UnitSquare);
    Ok(())
}

#[test]
fn full_run_writes_every_artifact() -> Result<(), PackingError> {
    let experiment = quick_experiment();
    let dir = tempfile::tempdir()?;
    let mut files = Vec::new();

    for (run, realization) in export_runs(&experiment)? {
        let name = realization_file_name(run.threshold, run.disk_num);
        write_realization(&dir.path().join(&name), &realization)?;
        files.push(name);
    }

    let points = threshold_sweep(&experiment)?;
    write_sweep_csv(&dir.path().join("threshold_sweep.csv"), &points)?;
    files.push("threshold_sweep.csv".to_string());

    for table in accuracy_table(&experiment)? {
        let name = accuracy_file_name(table.preset);
        write_accuracy_csv(&dir.path().join(&name), &table)?;
        files.push(name);
    }

    let manifest = Manifest::new("all", &experiment, files);
    let manifest_path = write_manifest_json(dir.path(), &manifest)?;

    let export_text = fs::read_to_string(dir.path().join("0.500-25.txt"))?;
    assert!(export_text.lines().count() <= 25);
    assert!(export_text.lines().count() >= 1);

    let sweep_text = fs::read_to_string(dir.path().join("threshold_sweep.csv"))?;
    let mut lines = sweep_text.lines();
    assert_eq!(
        lines.next(),
        Some("preset,disk_num,threshold,sample_num,repetitions,mean,variance")
    );
    assert_eq!(lines.count(), 2);

    let accuracy_text = fs::read_to_string(dir.path().join("accuracy-2.csv"))?;
    let rows: Vec<&str> = accuracy_text.lines().collect();
    assert_eq!(rows[0], ",1,3");
    assert!(rows[1].starts_with("20,0.000,"));
    assert!(rows[2].starts_with("40,0.000,"));

    let manifest_json: serde_json::Value = serde_json::from_str(&fs::read_to_string(manifest_path)?)?;
    assert_eq!(manifest_json["mode"], "all");
    assert_eq!(manifest_json["files"].as_array().map(Vec::len), Some(3));
    assert_eq!(manifest_json["experiment"]["seed"], 11);
    Ok(())
}

#[test]
fn statistics_agree_with_mean_and_variance_on_the_same_seed() -> Result<(), PackingError> {
    let config = quick_experiment()
        .packing(Preset::Uniform)
        .with_disk_num(12)
        .with_sample_num(100);

    let stats = TrialRunner::seeded(3).statistics(&config, 6)?;
    let mean = TrialRunner::seeded(3).mean(&config, 6)?;
    let variance = TrialRunner::seeded(3).variance(&config, 6)?;
    assert_eq!(stats.mean, mean);
    assert_eq!(stats.variance, variance);
    assert!(stats.std_error() >= 0.0);
    Ok(())
}

#[test]
fn invalid_grids_fail_before_any_trial() {
    let mut experiment = quick_experiment();
    experiment.square_size = 0.5;
    assert!(matches!(
        threshold_sweep(&experiment),
        Err(PackingError::InvalidConfiguration(_))
    ));
}
