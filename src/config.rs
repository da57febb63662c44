use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::disk::DiskClass;
use crate::{PackingError, Result};

/// Region the area estimator draws its sample points from.
///
/// `UnitSquare` is the default: points are drawn in `[0,1] x [0,1]` regardless
/// of `square_size`, so the fraction describes coverage of the unit square in
/// placement coordinates, not of the whole placement square. `PlacementSquare`
/// draws in `[0, square_size]^2` instead; results from the two are not comparable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingDomain {
    #[default]
    UnitSquare,
    PlacementSquare,
}

impl SamplingDomain {
    /// Side length of the sampled square.
    pub fn side(self, square_size: f64) -> f64 {
        match self {
            SamplingDomain::UnitSquare => 1.0,
            SamplingDomain::PlacementSquare => square_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    pub square_size: f64,
    pub disk_small_radius: f64,
    pub disk_large_radius: f64,
    pub disk_small_proportion: f64,
    pub disk_num: usize,
    pub overlap_threshold_proportion: f64,
    pub sample_num: usize,
    pub sampling_domain: SamplingDomain,
}

impl Default for PackingConfig {
    fn default() -> Self {
        Preset::SmallDominant.config(DEFAULT_SQUARE_SIZE)
    }
}

pub const DEFAULT_SQUARE_SIZE: f64 = 20.0;

impl PackingConfig {
    /// Checks every field before any random draw is made.
    pub fn validate(&self) -> Result<()> {
        if !self.square_size.is_finite() || self.square_size <= 0.0 {
            return Err(invalid("square_size must be finite and > 0"));
        }
        if !self.disk_small_radius.is_finite() || self.disk_small_radius <= 0.0 {
            return Err(invalid("disk_small_radius must be finite and > 0"));
        }
        if !self.disk_large_radius.is_finite() || self.disk_large_radius <= 0.0 {
            return Err(invalid("disk_large_radius must be finite and > 0"));
        }
        if !(0.0..=1.0).contains(&self.disk_small_proportion) {
            return Err(invalid("disk_small_proportion must be in [0, 1]"));
        }
        if !self.overlap_threshold_proportion.is_finite() || self.overlap_threshold_proportion < 0.0
        {
            return Err(invalid(
                "overlap_threshold_proportion must be finite and >= 0",
            ));
        }
        if self.sample_num == 0 {
            return Err(invalid("sample_num must be > 0"));
        }

        let max_radius = self.disk_small_radius.max(self.disk_large_radius);
        if self.square_size < 2.0 * max_radius {
            return Err(PackingError::InvalidConfiguration(format!(
                "square_size {} is smaller than the largest disk diameter {}",
                self.square_size,
                2.0 * max_radius
            )));
        }

        Ok(())
    }

    pub fn radius(&self, class: DiskClass) -> f64 {
        match class {
            DiskClass::Small => self.disk_small_radius,
            DiskClass::Large => self.disk_large_radius,
        }
    }

    pub fn large_proportion(&self) -> f64 {
        1.0 - self.disk_small_proportion
    }

    pub fn with_threshold(&self, threshold: f64) -> Self {
        Self {
            overlap_threshold_proportion: threshold,
            ..self.clone()
        }
    }

    pub fn with_disk_num(&self, disk_num: usize) -> Self {
        Self {
            disk_num,
            ..self.clone()
        }
    }

    pub fn with_sample_num(&self, sample_num: usize) -> Self {
        Self {
            sample_num,
            ..self.clone()
        }
    }

    pub fn with_sampling_domain(&self, sampling_domain: SamplingDomain) -> Self {
        Self {
            sampling_domain,
            ..self.clone()
        }
    }
}

fn invalid(message: &str) -> PackingError {
    PackingError::InvalidConfiguration(message.to_string())
}

/// The three disk mixtures studied by the packing experiments.
///
/// Each mixture has an expected disk area of 1, so disk counts are comparable
/// across presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Equal radii `sqrt(1/pi)`, half and half.
    Uniform,
    /// Radii `sqrt(1/(2 pi))` and `sqrt(3/(2 pi))`, half and half.
    Bidisperse,
    /// Radii `sqrt(15/(16 pi))` and `sqrt(5/(4 pi))`, 80% small.
    SmallDominant,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Uniform, Preset::Bidisperse, Preset::SmallDominant];

    pub fn config(self, square_size: f64) -> PackingConfig {
        let (small_radius, large_radius, small_proportion) = match self {
            Preset::Uniform => ((1.0 / PI).sqrt(), (1.0 / PI).sqrt(), 0.5),
            Preset::Bidisperse => ((1.0 / (2.0 * PI)).sqrt(), (3.0 / (2.0 * PI)).sqrt(), 0.5),
            Preset::SmallDominant => ((15.0 / (16.0 * PI)).sqrt(), (5.0 / (4.0 * PI)).sqrt(), 0.8),
        };

        PackingConfig {
            square_size,
            disk_small_radius: small_radius,
            disk_large_radius: large_radius,
            disk_small_proportion: small_proportion,
            disk_num: 400,
            overlap_threshold_proportion: 0.8,
            sample_num: 200,
            sampling_domain: SamplingDomain::UnitSquare,
        }
    }

    /// One-based index used in output file names.
    pub fn number(self) -> usize {
        match self {
            Preset::Uniform => 1,
            Preset::Bidisperse => 2,
            Preset::SmallDominant => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::Uniform => "uniform",
            Preset::Bidisperse => "bidisperse",
            Preset::SmallDominant => "small-dominant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExportRun {
    pub threshold: f64,
    pub disk_num: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub preset: Preset,
    pub runs: Vec<ExportRun>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            preset: Preset::SmallDominant,
            runs: vec![
                ExportRun {
                    threshold: 0.18,
                    disk_num: 100,
                },
                ExportRun {
                    threshold: 0.65,
                    disk_num: 200,
                },
                ExportRun {
                    threshold: 0.81,
                    disk_num: 300,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    pub sample_num: usize,
    pub repetitions: usize,
    pub disk_nums: Vec<usize>,
    pub thresholds: Vec<f64>,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            sample_num: 200,
            repetitions: 10,
            disk_nums: vec![50, 100, 200, 400],
            thresholds: vec![0.4, 0.6, 0.7, 0.8, 0.9, 1.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracySettings {
    pub threshold: f64,
    pub disk_num: usize,
    pub sample_nums: Vec<usize>,
    pub repetitions: Vec<usize>,
}

impl Default for AccuracySettings {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            disk_num: 400,
            sample_nums: vec![100, 200, 400],
            repetitions: vec![10, 20, 40, 80],
        }
    }
}

/// Parameter grids for the experiment binary, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub seed: u64,
    pub square_size: f64,
    pub sampling_domain: SamplingDomain,
    pub parallel: bool,
    pub presets: Vec<Preset>,
    pub export: ExportSettings,
    pub sweep: SweepSettings,
    pub accuracy: AccuracySettings,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            seed: 2026,
            square_size: DEFAULT_SQUARE_SIZE,
            sampling_domain: SamplingDomain::UnitSquare,
            parallel: false,
            presets: Preset::ALL.to_vec(),
            export: ExportSettings::default(),
            sweep: SweepSettings::default(),
            accuracy: AccuracySettings::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let cfg: ExperimentConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.presets.is_empty() {
            return Err(invalid("presets must be non-empty"));
        }
        if self.sweep.repetitions == 0 {
            return Err(invalid("sweep.repetitions must be > 0"));
        }
        if self.accuracy.repetitions.iter().any(|&r| r == 0) {
            return Err(invalid("accuracy.repetitions must contain only values > 0"));
        }

        // Every packing configuration the experiments will build must itself be valid.
        for preset in &self.presets {
            let base = self.packing(*preset);
            base.with_sample_num(self.sweep.sample_num).validate()?;
            for &threshold in &self.sweep.thresholds {
                base.with_threshold(threshold).validate()?;
            }
            let accuracy = base
                .with_threshold(self.accuracy.threshold)
                .with_disk_num(self.accuracy.disk_num);
            accuracy.validate()?;
            for &sample_num in &self.accuracy.sample_nums {
                accuracy.with_sample_num(sample_num).validate()?;
            }
        }
        for run in &self.export.runs {
            self.packing(self.export.preset)
                .with_threshold(run.threshold)
                .validate()?;
        }

        Ok(())
    }

    /// Base packing configuration for `preset` with this experiment's square and domain.
    pub fn packing(&self, preset: Preset) -> PackingConfig {
        preset
            .config(self.square_size)
            .with_sampling_domain(self.sampling_domain)
    }
}
