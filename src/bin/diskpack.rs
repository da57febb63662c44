use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use diskpack::output::{
    accuracy_file_name, create_timestamped_output_dir, realization_file_name, write_accuracy_csv,
    write_manifest_json, write_realization, write_sweep_csv, Manifest,
};
use diskpack::sweep::export_runs;
use diskpack::{
    accuracy_table, parallel_statistics, threshold_sweep, ExperimentConfig, Preset,
    SamplingDomain, TrialRunner,
};

#[derive(Debug, Parser)]
#[command(name = "diskpack")]
#[command(about = "Random sequential disk packing with Monte Carlo packing-fraction estimates")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "output-diskpack")]
    outdir: PathBuf,

    #[arg(long, global = true)]
    seed: Option<u64>,

    #[arg(long, global = true, default_value_t = false)]
    parallel: bool,

    #[arg(long, global = true, value_enum)]
    sampling_domain: Option<DomainArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write one realization file per configured (threshold, disk_num) pair.
    Export,
    /// Mean and variance for a single configuration.
    Stats {
        #[arg(long, value_enum, default_value = "small-dominant")]
        preset: PresetArg,
        #[arg(long, default_value_t = 0.8)]
        threshold: f64,
        #[arg(long, default_value_t = 400)]
        disk_num: usize,
        #[arg(long, default_value_t = 200)]
        sample_num: usize,
        #[arg(long, default_value_t = 10)]
        trials: usize,
    },
    /// Mean packing fraction over the preset x disk_num x threshold grid.
    Sweep,
    /// Variance over the sample_num x repetitions grid, one table per preset.
    Accuracy,
    /// Export, sweep and accuracy in one run directory.
    All,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DomainArg {
    UnitSquare,
    PlacementSquare,
}

impl From<DomainArg> for SamplingDomain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::UnitSquare => SamplingDomain::UnitSquare,
            DomainArg::PlacementSquare => SamplingDomain::PlacementSquare,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PresetArg {
    Uniform,
    Bidisperse,
    SmallDominant,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Uniform => Preset::Uniform,
            PresetArg::Bidisperse => Preset::Bidisperse,
            PresetArg::SmallDominant => Preset::SmallDominant,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "diskpack=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn resolve_default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from("configs").join("default.toml");
    if local.exists() {
        return Some(local);
    }

    let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("configs")
        .join("default.toml");
    bundled.exists().then_some(bundled)
}

fn load_experiment(cli: &Cli) -> Result<ExperimentConfig> {
    let path = cli.config.clone().or_else(resolve_default_config_path);

    let mut experiment = match path {
        Some(path) => {
            tracing::info!(config = %path.display(), "loading experiment config");
            ExperimentConfig::from_toml_file(&path)
                .with_context(|| format!("failed to load config: {}", path.display()))?
        }
        None => ExperimentConfig::default(),
    };

    if let Some(seed) = cli.seed {
        experiment.seed = seed;
    }
    if let Some(domain) = cli.sampling_domain {
        experiment.sampling_domain = domain.into();
    }
    experiment.parallel |= cli.parallel;
    experiment
        .validate()
        .context("experiment config failed validation")?;

    Ok(experiment)
}

fn run_export(experiment: &ExperimentConfig, outdir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for (run, realization) in export_runs(experiment)? {
        let name = realization_file_name(run.threshold, run.disk_num);
        write_realization(&outdir.join(&name), &realization)
            .with_context(|| format!("failed to write {name}"))?;
        files.push(name);
    }
    Ok(files)
}

fn run_sweep(experiment: &ExperimentConfig, outdir: &Path) -> Result<Vec<String>> {
    let points = threshold_sweep(experiment)?;
    let name = "threshold_sweep.csv".to_string();
    write_sweep_csv(&outdir.join(&name), &points)
        .with_context(|| format!("failed to write {name}"))?;
    Ok(vec![name])
}

fn run_accuracy(experiment: &ExperimentConfig, outdir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for table in accuracy_table(experiment)? {
        let name = accuracy_file_name(table.preset);
        write_accuracy_csv(&outdir.join(&name), &table)
            .with_context(|| format!("failed to write {name}"))?;
        files.push(name);
    }
    Ok(files)
}

fn run_stats(
    experiment: &ExperimentConfig,
    preset: Preset,
    threshold: f64,
    disk_num: usize,
    sample_num: usize,
    trials: usize,
) -> Result<()> {
    let config = experiment
        .packing(preset)
        .with_threshold(threshold)
        .with_disk_num(disk_num)
        .with_sample_num(sample_num);

    let stats = if experiment.parallel {
        parallel_statistics(&config, trials, experiment.seed)?
    } else {
        TrialRunner::seeded(experiment.seed).statistics(&config, trials)?
    };

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let experiment = load_experiment(&cli)?;

    let mode = match cli.command {
        Command::Stats {
            preset,
            threshold,
            disk_num,
            sample_num,
            trials,
        } => {
            return run_stats(
                &experiment,
                preset.into(),
                threshold,
                disk_num,
                sample_num,
                trials,
            );
        }
        Command::Export => "export",
        Command::Sweep => "sweep",
        Command::Accuracy => "accuracy",
        Command::All => "all",
    };

    let outdir = create_timestamped_output_dir(&cli.outdir).with_context(|| {
        format!(
            "failed to create run directory under {}",
            cli.outdir.display()
        )
    })?;

    let mut files = Vec::new();
    if matches!(cli.command, Command::Export | Command::All) {
        files.extend(run_export(&experiment, &outdir)?);
    }
    if matches!(cli.command, Command::Sweep | Command::All) {
        files.extend(run_sweep(&experiment, &outdir)?);
    }
    if matches!(cli.command, Command::Accuracy | Command::All) {
        files.extend(run_accuracy(&experiment, &outdir)?);
    }

    write_manifest_json(&outdir, &Manifest::new(mode, &experiment, files))?;
    println!("wrote outputs to {}", outdir.display());
    Ok(())
}
