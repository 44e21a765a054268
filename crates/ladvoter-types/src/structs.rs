//! Records produced by the measurement pipeline.
//!
//! [`MeasurementRecord`] is one row of the main time series;
//! [`DomainRecord`] describes a single cluster in the per-domain catalog.

use serde::{Deserialize, Serialize};

use crate::enums::PercolationClass;

/// One row of the main output stream.
///
/// Sizes and counts are stored raw; the fraction accessors divide by
/// [`population`](Self::population), the number of occupied sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Simulated time (Monte Carlo steps, possibly fractional).
    pub time: f64,
    /// Fraction of agents (or opinions, for non-binary lattices) that
    /// never changed since initialization.
    pub persistence: f64,
    /// Fraction of agents flagged as zealots.
    pub zealot_fraction: f64,
    /// Fraction of occupied right/down links whose endpoints disagree.
    pub active_density: f64,
    /// Number of clusters found by the labeling pass.
    pub cluster_count: usize,
    /// Size of the largest cluster.
    pub largest_size: usize,
    /// Percolation class of the largest cluster.
    pub largest_percolation: PercolationClass,
    /// Size of the second-largest cluster (`0` when there is only one).
    pub second_size: usize,
    /// Percolation class of the second-largest cluster.
    pub second_percolation: PercolationClass,
    /// Number of occupied sites used for normalization.
    pub population: usize,
    /// Size of the active-site list, for event-driven runs.
    pub active_sites: Option<usize>,
}

impl MeasurementRecord {
    /// Number of clusters per agent.
    pub fn cluster_density(&self) -> f64 {
        self.fraction(self.cluster_count)
    }

    /// Largest cluster size per agent.
    pub fn largest_fraction(&self) -> f64 {
        self.fraction(self.largest_size)
    }

    /// Second-largest cluster size per agent.
    pub fn second_fraction(&self) -> f64 {
        self.fraction(self.second_size)
    }

    /// Copy of this record stamped with a different time.
    #[must_use]
    pub fn at_time(&self, time: f64) -> Self {
        Self {
            time,
            ..self.clone()
        }
    }

    fn fraction(&self, count: usize) -> f64 {
        if self.population == 0 {
            0.0
        } else {
            count as f64 / self.population as f64
        }
    }
}

/// Geometry and classification of a single cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Representative site of the cluster.
    pub root: usize,
    /// Number of sites in the cluster.
    pub size: usize,
    /// Percolation class of the cluster.
    pub percolation: PercolationClass,
    /// Number of distinct exterior sites along the outer hull
    /// (`0` for spanning clusters).
    pub hull_perimeter: usize,
    /// Area enclosed by the outer hull, holes included
    /// (`0` for spanning clusters).
    pub hull_area: usize,
    /// Whether the representative site is a zealot.
    pub zealot: bool,
}
