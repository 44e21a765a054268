//! Turns a lattice state into a measurement record.
//!
//! The observer owns the cluster scratch buffers and the hull walker, so
//! repeated measurements over a run reuse the same allocations.

use ladvoter_cluster::{ClusterError, ClusterScratch, Connectivity, DomainCatalog, HullWalker};
use ladvoter_lattice::{LatticeState, observe};
use ladvoter_types::MeasurementRecord;

/// One measurement: the main record plus, when enabled, the domain
/// catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Scalars of the main output stream.
    pub record: MeasurementRecord,
    /// Per-domain catalog and histograms.
    pub domains: Option<DomainCatalog>,
}

/// Measurement pipeline with persistent scratch space.
#[derive(Debug, Clone)]
pub struct Observer {
    scratch: ClusterScratch,
    walker: HullWalker,
    connectivity: Connectivity,
    domain_statistics: bool,
}

impl Observer {
    /// Observer for an `n`-site lattice.
    pub fn new(n: usize, connectivity: Connectivity, domain_statistics: bool) -> Self {
        Self {
            scratch: ClusterScratch::new(n),
            walker: HullWalker::new(),
            connectivity,
            domain_statistics,
        }
    }

    /// Scan `state`, label its clusters, and stamp the result with `time`.
    ///
    /// `active_sites` is the active-list length of event-driven runs.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] if a domain hull cannot be traced.
    pub fn measure(
        &mut self,
        state: &LatticeState,
        time: f64,
        active_sites: Option<usize>,
    ) -> Result<Measurement, ClusterError> {
        let scalars = observe(state);
        let clusters = self.scratch.label(state, self.connectivity);

        let record = MeasurementRecord {
            time,
            persistence: scalars.persistence,
            zealot_fraction: scalars.zealot_fraction,
            active_density: scalars.active_density,
            cluster_count: clusters.count,
            largest_size: clusters.largest_size(),
            largest_percolation: clusters.largest_percolation,
            second_size: clusters.second_size(),
            second_percolation: clusters.second_percolation,
            population: scalars.population,
            active_sites,
        };

        let domains = if self.domain_statistics {
            Some(DomainCatalog::build(state, &self.scratch, &mut self.walker)?)
        } else {
            None
        };

        Ok(Measurement { record, domains })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use ladvoter_lattice::Topology;
    use ladvoter_types::{OpinionMode, PercolationClass, SPIN_DOWN, SPIN_UP};

    #[test]
    fn stripe_measurement() {
        // Two horizontal stripes of two rows on a 4x4 lattice.
        let spins = (0..16)
            .map(|i| if i < 8 { SPIN_UP } else { SPIN_DOWN })
            .collect();
        let state =
            LatticeState::from_spins(Topology::new(4).unwrap(), OpinionMode::Binary, spins)
                .unwrap();
        let mut observer = Observer::new(16, Connectivity::Opinion, true);
        let m = observer.measure(&state, 7.0, None).unwrap();

        assert_eq!(m.record.time, 7.0);
        assert_eq!(m.record.cluster_count, 2);
        assert_eq!(m.record.largest_size, 8);
        assert_eq!(m.record.second_size, 8);
        assert_eq!(m.record.largest_percolation, PercolationClass::Spanning);
        // 8 of the 32 links cross a stripe boundary.
        assert_eq!(m.record.active_density, 0.25);

        let domains = m.domains.unwrap();
        assert_eq!(domains.domains.len(), 2);
        assert!(domains.domains.iter().all(|d| d.hull_area == 0));
    }

    #[test]
    fn catalog_is_optional() {
        let state = LatticeState::from_spins(
            Topology::new(2).unwrap(),
            OpinionMode::Binary,
            vec![SPIN_UP; 4],
        )
        .unwrap();
        let mut observer = Observer::new(4, Connectivity::Opinion, false);
        let m = observer.measure(&state, 0.0, Some(0)).unwrap();
        assert!(m.domains.is_none());
        assert_eq!(m.record.active_sites, Some(0));
    }
}
