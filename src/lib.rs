//! diskpack - random sequential packing of bidisperse disks
//!
//! Places Small and Large disks into a square one attempt at a time, rejecting
//! any candidate that comes closer to an accepted disk than a scaled sum of
//! radii, then estimates the covered area fraction by uniform point sampling.
//! Repeated trials give the mean and population variance of that estimate.

pub mod config;
pub mod disk;
pub mod estimator;
pub mod field;
pub mod output;
pub mod source;
pub mod sweep;
pub mod trials;

use thiserror::Error;

pub use config::{ExperimentConfig, PackingConfig, Preset, SamplingDomain};
pub use disk::{Disk, DiskClass, Position, Realization};
pub use estimator::{estimate, estimate_in, estimate_with_error, CoverageEstimate};
pub use field::{generate, place, PlacementSummary};
pub use source::{seeded_stream, UniformSource};
pub use sweep::{accuracy_table, threshold_sweep, AccuracyTable, SweepPoint};
pub use trials::{export, parallel_statistics, TrialRunner, TrialStatistics};

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, PackingError>;

#[derive(Debug, Error)]
pub enum PackingError {
    /// Geometry, radius, proportion or sampling parameters the algorithm cannot run with.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A call argument outside the configuration, such as a zero trial count.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
