//! Repeated independent trials and their statistics.

use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::PackingConfig;
use crate::disk::Realization;
use crate::estimator::estimate_in;
use crate::field::generate;
use crate::source::{seeded_stream, UniformSource};
use crate::{PackingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialStatistics {
    pub trials: usize,
    pub mean: f64,
    /// Population variance around `mean` of the same batch.
    pub variance: f64,
}

impl TrialStatistics {
    /// Two-pass mean and population variance of `fractions`.
    pub fn from_fractions(fractions: &[f64]) -> Result<Self> {
        check_trials(fractions.len())?;

        let n = fractions.len() as f64;
        let mean = fractions.iter().sum::<f64>() / n;
        let variance = fractions.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

        Ok(Self {
            trials: fractions.len(),
            mean,
            variance,
        })
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Standard error of `mean`.
    pub fn std_error(&self) -> f64 {
        (self.variance / self.trials as f64).sqrt()
    }
}

fn check_trials(trials: usize) -> Result<()> {
    if trials == 0 {
        return Err(PackingError::InvalidArgument(
            "trials must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Drives generate-then-estimate trials from a single random source.
///
/// Every trial places a fresh realization; nothing is reused between trials.
#[derive(Debug)]
pub struct TrialRunner<S> {
    source: S,
}

impl TrialRunner<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(seeded_stream(seed, 0))
    }
}

impl<S: UniformSource> TrialRunner<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn realize(&mut self, config: &PackingConfig) -> Result<Realization> {
        generate(config, &mut self.source)
    }

    /// One trial: place disks, then estimate their coverage.
    pub fn trial(&mut self, config: &PackingConfig) -> Result<f64> {
        let realization = generate(config, &mut self.source)?;
        estimate_in(
            &realization,
            config.sample_num,
            config.sampling_domain,
            &mut self.source,
        )
    }

    /// Packing fractions of `trials` independent trials, in run order.
    pub fn fractions(&mut self, config: &PackingConfig, trials: usize) -> Result<Vec<f64>> {
        check_trials(trials)?;
        config.validate()?;

        (0..trials).map(|_| self.trial(config)).collect()
    }

    pub fn mean(&mut self, config: &PackingConfig, trials: usize) -> Result<f64> {
        self.statistics(config, trials).map(|s| s.mean)
    }

    pub fn variance(&mut self, config: &PackingConfig, trials: usize) -> Result<f64> {
        self.statistics(config, trials).map(|s| s.variance)
    }

    /// Mean and variance of one batch of `trials`.
    pub fn statistics(&mut self, config: &PackingConfig, trials: usize) -> Result<TrialStatistics> {
        let fractions = self.fractions(config, trials)?;
        let stats = TrialStatistics::from_fractions(&fractions)?;
        debug!(
            trials,
            disk_num = config.disk_num,
            threshold = config.overlap_threshold_proportion,
            sample_num = config.sample_num,
            mean = stats.mean,
            variance = stats.variance,
            "trial batch"
        );
        Ok(stats)
    }

    pub fn export(&self, realization: &Realization) -> String {
        export(realization)
    }
}

/// Runs `trials` on the rayon pool, trial `i` drawing from stream `i` of `seed`.
///
/// Results do not depend on the number of worker threads.
pub fn parallel_statistics(
    config: &PackingConfig,
    trials: usize,
    seed: u64,
) -> Result<TrialStatistics> {
    check_trials(trials)?;
    config.validate()?;

    let fractions = (0..trials)
        .into_par_iter()
        .map(|idx| TrialRunner::new(seeded_stream(seed, idx as u64)).trial(config))
        .collect::<Result<Vec<f64>>>()?;

    let stats = TrialStatistics::from_fractions(&fractions)?;
    debug!(
        trials,
        seed,
        mean = stats.mean,
        variance = stats.variance,
        "parallel trial batch"
    );
    Ok(stats)
}

/// One `radius\tx\ty` line per disk, three decimals, newline terminated.
pub fn export(realization: &Realization) -> String {
    realization
        .iter()
        .map(|disk| {
            format!(
                "{:.3}\t{:.3}\t{:.3}\n",
                realization.radius_of(disk),
                disk.position.x,
                disk.position.y
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingDomain;
    use crate::disk::{Disk, DiskClass, Position};
    use approx::assert_relative_eq;

    // a square small enough that the unit sampling square sees most disks
    fn small_config() -> PackingConfig {
        PackingConfig {
            square_size: 2.0,
            disk_small_radius: 0.2,
            disk_large_radius: 0.35,
            disk_small_proportion: 0.7,
            disk_num: 40,
            overlap_threshold_proportion: 0.8,
            sample_num: 200,
            sampling_domain: SamplingDomain::UnitSquare,
        }
    }

    #[test]
    fn zero_trials_is_an_invalid_argument() {
        let mut runner = TrialRunner::seeded(1);
        let cfg = small_config();
        assert!(matches!(
            runner.mean(&cfg, 0),
            Err(PackingError::InvalidArgument(_))
        ));
        assert!(matches!(
            runner.variance(&cfg, 0),
            Err(PackingError::InvalidArgument(_))
        ));
        assert!(matches!(
            parallel_statistics(&cfg, 0, 1),
            Err(PackingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn single_trial_variance_is_exactly_zero() -> Result<()> {
        let mut runner = TrialRunner::seeded(2);
        assert_eq!(runner.variance(&small_config(), 1)?, 0.0);
        Ok(())
    }

    #[test]
    fn invalid_config_is_reported_before_trials() {
        let mut runner = TrialRunner::seeded(3);
        let cfg = small_config().with_sample_num(0);
        assert!(matches!(
            runner.mean(&cfg, 4),
            Err(PackingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn no_disks_means_zero_mean_and_variance() -> Result<()> {
        let mut runner = TrialRunner::seeded(4);
        let stats = runner.statistics(&small_config().with_disk_num(0), 5)?;
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.trials, 5);
        Ok(())
    }

    #[test]
    fn trials_use_fresh_realizations() -> Result<()> {
        let mut runner = TrialRunner::seeded(5);
        let fractions = runner.fractions(&small_config(), 12)?;
        assert_eq!(fractions.len(), 12);
        assert!(fractions.iter().all(|p| (0.0..=1.0).contains(p)));
        let first = fractions[0];
        assert!(fractions.iter().any(|&p| p != first));
        Ok(())
    }

    #[test]
    fn population_variance_uses_batch_mean() -> Result<()> {
        let stats = TrialStatistics::from_fractions(&[0.2, 0.4, 0.6])?;
        assert_relative_eq!(stats.mean, 0.4, epsilon = 1e-12);
        assert_relative_eq!(stats.variance, 0.08 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std_error(), (0.08f64 / 9.0).sqrt(), epsilon = 1e-12);
        assert!(TrialStatistics::from_fractions(&[]).is_err());
        Ok(())
    }

    #[test]
    fn seeded_runners_repeat() -> Result<()> {
        let cfg = small_config();
        let a = TrialRunner::seeded(6).statistics(&cfg, 4)?;
        let b = TrialRunner::seeded(6).statistics(&cfg, 4)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn parallel_batch_matches_sequential_streams() -> Result<()> {
        let cfg = small_config();
        let parallel = parallel_statistics(&cfg, 8, 77)?;

        let fractions = (0..8u64)
            .map(|i| TrialRunner::new(seeded_stream(77, i)).trial(&cfg))
            .collect::<Result<Vec<f64>>>()?;
        let sequential = TrialStatistics::from_fractions(&fractions)?;

        assert_eq!(parallel.trials, 8);
        assert_relative_eq!(parallel.mean, sequential.mean, epsilon = 1e-12);
        assert_relative_eq!(parallel.variance, sequential.variance, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn export_formats_three_decimals_tab_separated() {
        let r = Realization::new(
            20.0,
            1.234,
            2.0,
            vec![Disk::new(Position::new(5.6, 7.891), DiskClass::Small)],
        );
        assert_eq!(export(&r), "1.234\t5.600\t7.891\n");
        assert_eq!(TrialRunner::seeded(0).export(&r), "1.234\t5.600\t7.891\n");
    }

    #[test]
    fn export_has_one_line_per_disk() -> Result<()> {
        let mut runner = TrialRunner::seeded(8);
        let r = runner.realize(&small_config())?;
        let text = export(&r);
        assert_eq!(text.lines().count(), r.len());
        assert!(text.ends_with('\n'));
        for line in text.lines() {
            assert_eq!(line.split('\t').count(), 3);
        }
        assert_eq!(export(&Realization::empty(&small_config())), "");
        Ok(())
    }
}
