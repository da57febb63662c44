//! Monte Carlo estimate of the area fraction covered by a realization.

use serde::Serialize;

use crate::config::SamplingDomain;
use crate::disk::{Position, Realization};
use crate::source::UniformSource;
use crate::{PackingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageEstimate {
    hits: usize,
    samples: usize,
}

impl CoverageEstimate {
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Always > 0; estimates are only built from a validated `sample_num`.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn fraction(&self) -> f64 {
        self.hits as f64 / self.samples as f64
    }

    /// Binomial standard error of [`fraction`](Self::fraction).
    pub fn standard_error(&self) -> f64 {
        let p = self.fraction();
        (p * (1.0 - p) / self.samples as f64).sqrt()
    }
}

/// Fraction of `sample_num` points drawn in the unit square that land inside
/// the union of disks.
pub fn estimate<S: UniformSource>(
    realization: &Realization,
    sample_num: usize,
    source: &mut S,
) -> Result<f64> {
    estimate_in(realization, sample_num, SamplingDomain::UnitSquare, source)
}

pub fn estimate_in<S: UniformSource>(
    realization: &Realization,
    sample_num: usize,
    domain: SamplingDomain,
    source: &mut S,
) -> Result<f64> {
    estimate_with_error(realization, sample_num, domain, source).map(|e| e.fraction())
}

pub fn estimate_with_error<S: UniformSource>(
    realization: &Realization,
    sample_num: usize,
    domain: SamplingDomain,
    source: &mut S,
) -> Result<CoverageEstimate> {
    if sample_num == 0 {
        return Err(PackingError::InvalidConfiguration(
            "sample_num must be > 0".to_string(),
        ));
    }

    let side = domain.side(realization.square_size());
    let mut hits = 0usize;

    for _ in 0..sample_num {
        let x = source.next_unit() * side;
        let y = source.next_unit() * side;
        if realization.covers(&Position::new(x, y)) {
            hits += 1;
        }
    }

    Ok(CoverageEstimate {
        hits,
        samples: sample_num,
    })
}
