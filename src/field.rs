//! Sequential random placement with overlap rejection.
//!
//! Each of `disk_num` attempts draws a class, then a center restricted so the
//! disk stays inside the square, and keeps the candidate only if it clears
//! every disk already accepted by `threshold * (r_new + r_existing)`.
//! Rejected candidates are dropped, never retried; the attempt still counts.

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::PackingConfig;
use crate::disk::{Disk, DiskClass, Position, Realization};
use crate::source::UniformSource;
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementSummary {
    pub attempts: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl PlacementSummary {
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }
}

/// Produce one realization for `config`.
pub fn generate<S: UniformSource>(config: &PackingConfig, source: &mut S) -> Result<Realization> {
    place(config, source).map(|(realization, _)| realization)
}

/// Like [`generate`], also reporting how many attempts were rejected.
pub fn place<S: UniformSource>(
    config: &PackingConfig,
    source: &mut S,
) -> Result<(Realization, PlacementSummary)> {
    config.validate()?;

    let threshold = config.overlap_threshold_proportion;
    let mut realization = Realization::empty(config);
    let mut summary = PlacementSummary {
        attempts: config.disk_num,
        ..PlacementSummary::default()
    };

    for attempt in 0..config.disk_num {
        let class = draw_class(config.disk_small_proportion, source);
        let radius = config.radius(class);
        let position = Position::new(
            draw_coordinate(config.square_size, radius, source),
            draw_coordinate(config.square_size, radius, source),
        );

        let blocked = realization.iter().any(|existing| {
            let clearance = threshold * (radius + realization.radius_of(existing));
            position.distance(&existing.position) < clearance
        });

        if blocked {
            trace!(attempt, ?class, x = position.x, y = position.y, "candidate rejected");
            summary.rejected += 1;
            continue;
        }

        realization.push(Disk::new(position, class));
        summary.accepted += 1;
    }

    debug!(
        attempts = summary.attempts,
        accepted = summary.accepted,
        rejected = summary.rejected,
        small = realization.count(DiskClass::Small),
        large = realization.count(DiskClass::Large),
        threshold,
        "placed disks"
    );

    Ok((realization, summary))
}

/// Small when the draw falls strictly below the proportion.
fn draw_class<S: UniformSource>(small_proportion: f64, source: &mut S) -> DiskClass {
    if source.next_unit() < small_proportion {
        DiskClass::Small
    } else {
        DiskClass::Large
    }
}

fn draw_coordinate<S: UniformSource>(square_size: f64, radius: f64, source: &mut S) -> f64 {
    source.next_unit() * (square_size - 2.0 * radius) + radius
}
