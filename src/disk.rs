use serde::{Deserialize, Serialize};

use crate::config::PackingConfig;

/// Size class of a disk; the radius lives in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskClass {
    Small,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub position: Position,
    pub class: DiskClass,
}

impl Disk {
    pub fn new(position: Position, class: DiskClass) -> Self {
        Self { position, class }
    }
}

/// One placed set of disks, in acceptance order.
///
/// Carries the radii and square size it was generated with so that the
/// estimator and the exporter need nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Realization {
    square_size: f64,
    small_radius: f64,
    large_radius: f64,
    disks: Vec<Disk>,
}

impl Realization {
    pub fn new(square_size: f64, small_radius: f64, large_radius: f64, disks: Vec<Disk>) -> Self {
        Self {
            square_size,
            small_radius,
            large_radius,
            disks,
        }
    }

    pub fn empty(config: &PackingConfig) -> Self {
        Self::new(
            config.square_size,
            config.disk_small_radius,
            config.disk_large_radius,
            Vec::new(),
        )
    }

    pub(crate) fn push(&mut self, disk: Disk) {
        self.disks.push(disk);
    }

    pub fn disks(&self) -> &[Disk] {
        &self.disks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Disk> {
        self.disks.iter()
    }

    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    pub fn square_size(&self) -> f64 {
        self.square_size
    }

    pub fn radius(&self, class: DiskClass) -> f64 {
        match class {
            DiskClass::Small => self.small_radius,
            DiskClass::Large => self.large_radius,
        }
    }

    pub fn radius_of(&self, disk: &Disk) -> f64 {
        self.radius(disk.class)
    }

    /// Number of accepted disks of `class`.
    pub fn count(&self, class: DiskClass) -> usize {
        self.disks.iter().filter(|d| d.class == class).count()
    }

    /// Sum of disk areas, counting overlaps twice.
    pub fn total_disk_area(&self) -> f64 {
        self.disks
            .iter()
            .map(|d| std::f64::consts::PI * self.radius_of(d).powi(2))
            .sum()
    }

    /// True if `point` lies strictly inside some disk.
    pub fn covers(&self, point: &Position) -> bool {
        self.disks
            .iter()
            .any(|d| point.distance(&d.position) < self.radius_of(d))
    }
}

impl<'a> IntoIterator for &'a Realization {
    type Item = &'a Disk;
    type IntoIter = std::slice::Iter<'a, Disk>;

    fn into_iter(self) -> Self::IntoIter {
        self.disks.iter()
    }
}
