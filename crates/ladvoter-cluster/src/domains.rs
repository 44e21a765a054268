//! Per-domain catalog and histograms.
//!
//! A domain is one cluster of the last labeling pass. The catalog records
//! the size, percolation class, hull geometry, and zealot flag of every
//! domain, in root order, and bins them into histograms kept separately for
//! zealot and non-zealot domains.

use std::collections::BTreeMap;

use ladvoter_lattice::LatticeState;
use ladvoter_types::{DomainRecord, PercolationClass};

use crate::error::ClusterError;
use crate::hoshen_kopelman::ClusterScratch;
use crate::hull::{HullGeometry, HullWalker};
use crate::percolation::percolation_class;

/// One histogram bin.
///
/// A bin keyed `k` counts domains of size `k`, hulls of perimeter `k`, and
/// hull areas equal to `k` independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistogramRow {
    /// Domains of this size.
    pub clusters: usize,
    /// Domains whose hull perimeter equals the key.
    pub hulls: usize,
    /// Domains whose hull area equals the key.
    pub areas: usize,
    /// Domains of this size, by percolation class code.
    pub by_percolation: [usize; 3],
}

impl HistogramRow {
    fn is_empty(&self) -> bool {
        self.clusters == 0
            && self.hulls == 0
            && self.areas == 0
            && self.by_percolation.iter().all(|&c| c == 0)
    }
}

/// Histograms split by zealot flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainHistograms {
    plain: BTreeMap<usize, HistogramRow>,
    zealot: BTreeMap<usize, HistogramRow>,
}

impl DomainHistograms {
    /// Non-empty bins with a positive key, ascending, for zealot or
    /// non-zealot domains.
    pub fn rows(&self, zealot: bool) -> impl Iterator<Item = (usize, &HistogramRow)> {
        let table = if zealot { &self.zealot } else { &self.plain };
        table
            .iter()
            .filter(|&(&key, row)| key > 0 && !row.is_empty())
            .map(|(&key, row)| (key, row))
    }

    fn add(&mut self, record: &DomainRecord) {
        let table = if record.zealot {
            &mut self.zealot
        } else {
            &mut self.plain
        };
        let size = table.entry(record.size).or_default();
        size.clusters = size.clusters.saturating_add(1);
        if let Some(count) = size
            .by_percolation
            .get_mut(usize::from(record.percolation.code()))
        {
            *count = count.saturating_add(1);
        }
        let hulls = &mut table.entry(record.hull_perimeter).or_default().hulls;
        *hulls = hulls.saturating_add(1);
        let areas = &mut table.entry(record.hull_area).or_default().areas;
        *areas = areas.saturating_add(1);
    }
}

/// Every domain of a labeled lattice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainCatalog {
    /// Domains in root order.
    pub domains: Vec<DomainRecord>,
    /// Binned counts.
    pub histograms: DomainHistograms,
}

impl DomainCatalog {
    /// Build the catalog from a scratch already labeled for `state`.
    ///
    /// Spanning and percolating domains get a zero hull.
    pub fn build(
        state: &LatticeState,
        scratch: &ClusterScratch,
        walker: &mut HullWalker,
    ) -> Result<Self, ClusterError> {
        let topology = state.topology();
        let labels = scratch.labels();
        let mut catalog = Self::default();

        for cluster in scratch.clusters() {
            let percolation = percolation_class(topology, labels, cluster.root);
            let hull = if percolation == PercolationClass::None {
                walker.measure(topology, labels, cluster.root, cluster.size)?
            } else {
                HullGeometry::default()
            };
            let record = DomainRecord {
                root: cluster.root,
                size: cluster.size,
                percolation,
                hull_perimeter: hull.perimeter,
                hull_area: hull.area,
                zealot: state.is_zealot(cluster.root),
            };
            catalog.histograms.add(&record);
            catalog.domains.push(record);
        }

        Ok(catalog)
    }
}
