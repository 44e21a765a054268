//! Hoshen-Kopelman cluster labeling.
//!
//! Clusters are an array-backed forest: `labels[i]` points towards the
//! root of `i`, and a root points to itself. Unions never compress; they
//! make the root with the larger label point to the one with the smaller,
//! so the root of a cluster is always its smallest site index. A second
//! pass compresses every path and accumulates the sizes.
//!
//! The labels and sizes live in a [`ClusterScratch`] reused across
//! measurements.

// Labels are site indices, so every label is below N.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use ladvoter_lattice::{LatticeState, Topology};
use ladvoter_types::PercolationClass;
use tracing::trace;

use crate::percolation::percolation_class;

/// Which neighboring sites belong to the same cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// Same opinion.
    #[default]
    Opinion,
    /// Same opinion and same zealot flag.
    OpinionAndZealotry,
}

/// A cluster identified by its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterRef {
    /// Root site (the smallest index in the cluster).
    pub root: usize,
    /// Number of sites.
    pub size: usize,
}

/// Aggregates of one labeling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterSummary {
    /// Number of clusters of occupied sites.
    pub count: usize,
    /// Largest cluster. Among equal sizes the one with the larger root wins.
    pub largest: Option<ClusterRef>,
    /// Second-largest cluster, absent with fewer than two clusters.
    pub second: Option<ClusterRef>,
    /// Percolation class of the largest cluster.
    pub largest_percolation: PercolationClass,
    /// Percolation class of the second-largest cluster.
    pub second_percolation: PercolationClass,
}

impl ClusterSummary {
    /// Size of the largest cluster, `0` on an empty lattice.
    pub fn largest_size(&self) -> usize {
        self.largest.map_or(0, |c| c.size)
    }

    /// Size of the second-largest cluster, `0` if there is none.
    pub fn second_size(&self) -> usize {
        self.second.map_or(0, |c| c.size)
    }
}

/// Reusable label and size buffers.
#[derive(Debug, Clone, Default)]
pub struct ClusterScratch {
    labels: Vec<usize>,
    sizes: Vec<usize>,
}

impl ClusterScratch {
    /// Scratch sized for an `n`-site lattice.
    pub fn new(n: usize) -> Self {
        Self {
            labels: Vec::with_capacity(n),
            sizes: Vec::with_capacity(n),
        }
    }

    /// Label every cluster of `state` and summarize the result.
    ///
    /// Vacant sites stay singletons of size zero and never join a
    /// cluster.
    pub fn label(&mut self, state: &LatticeState, connectivity: Connectivity) -> ClusterSummary {
        let topology = state.topology();
        let n = state.site_count();
        self.labels.clear();
        self.labels.extend(0..n);
        self.sizes.clear();
        self.sizes.resize(n, 0);

        let connected = |a: usize, b: usize| {
            state.is_occupied(a)
                && state.spin(a) == state.spin(b)
                && (connectivity == Connectivity::Opinion
                    || state.is_zealot(a) == state.is_zealot(b))
        };

        for site in 0..n {
            let right = topology.right(site);
            if connected(site, right) {
                self.union(site, right);
            }
            let down = topology.down(site);
            if connected(site, down) {
                self.union(site, down);
            }
        }

        for site in 0..n {
            if !state.is_occupied(site) {
                continue;
            }
            let root = self.find(site);
            self.sizes[root] += 1;
            self.labels[site] = root;
        }

        let summary = self.summarize(topology);
        trace!(
            clusters = summary.count,
            largest = summary.largest_size(),
            second = summary.second_size(),
            "clusters labeled"
        );
        summary
    }

    /// Root of `site`'s cluster after [`label`](Self::label).
    pub fn root_of(&self, site: usize) -> usize {
        self.labels[site]
    }

    /// Compressed label array.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Cluster size indexed by root (zero for non-roots).
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Every cluster in root order.
    pub fn clusters(&self) -> impl Iterator<Item = ClusterRef> + '_ {
        self.sizes
            .iter()
            .enumerate()
            .filter(|&(_, &size)| size > 0)
            .map(|(root, &size)| ClusterRef { root, size })
    }

    fn find(&self, mut site: usize) -> usize {
        while self.labels[site] != site {
            site = self.labels[site];
        }
        site
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if self.labels[ra] > self.labels[rb] {
            self.labels[ra] = self.labels[rb];
        } else {
            self.labels[rb] = self.labels[ra];
        }
    }

    fn summarize(&self, topology: &Topology) -> ClusterSummary {
        let mut count = 0;
        let mut largest: Option<ClusterRef> = None;
        let mut second: Option<ClusterRef> = None;

        for cluster in self.clusters() {
            count += 1;
            let top = largest.map_or(0, |c| c.size);
            let runner_up = second.map_or(0, |c| c.size);
            if cluster.size >= top {
                second = largest;
                largest = Some(cluster);
            } else if cluster.size > runner_up {
                second = Some(cluster);
            }
        }

        let classify = |c: Option<ClusterRef>| {
            c.map_or(PercolationClass::None, |c| {
                percolation_class(topology, &self.labels, c.root)
            })
        };

        ClusterSummary {
            count,
            largest,
            second,
            largest_percolation: classify(largest),
            second_percolation: classify(second),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ladvoter_types::{OpinionMode, SPIN_DOWN, SPIN_UP, Spin, VACANT};

    fn state(side: usize, spins: Vec<Spin>) -> LatticeState {
        LatticeState::from_spins(Topology::new(side).unwrap(), OpinionMode::Binary, spins).unwrap()
    }

    #[test]
    fn uniform_lattice_is_one_percolating_cluster() {
        let s = state(4, vec![SPIN_UP; 16]);
        let mut scratch = ClusterScratch::new(16);
        let summary = scratch.label(&s, Connectivity::Opinion);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.largest, Some(ClusterRef { root: 0, size: 16 }));
        assert_eq!(summary.second, None);
        assert_eq!(summary.largest_percolation, PercolationClass::Percolating);
        assert_eq!(summary.second_percolation, PercolationClass::None);
    }

    #[test]
    fn roots_are_smallest_indices() {
        // Column 2 is a vertical stripe of -1 on a 4x4 lattice.
        let spins = (0..16)
            .map(|i| if i % 4 == 2 { SPIN_DOWN } else { SPIN_UP })
            .collect();
        let s = state(4, spins);
        let mut scratch = ClusterScratch::new(16);
        let summary = scratch.label(&s, Connectivity::Opinion);
        assert_eq!(summary.count, 2);
        for site in 0..16 {
            let expected = if site % 4 == 2 { 2 } else { 0 };
            assert_eq!(scratch.root_of(site), expected);
        }
        assert_eq!(summary.largest, Some(ClusterRef { root: 0, size: 12 }));
        assert_eq!(summary.second, Some(ClusterRef { root: 2, size: 4 }));
        // The stripe touches every row but only one column.
        assert_eq!(summary.second_percolation, PercolationClass::Spanning);
    }

    #[test]
    fn later_equal_cluster_takes_the_largest_slot() {
        // Two vertical stripes of two columns each.
        let spins = (0..16)
            .map(|i| if i % 4 < 2 { SPIN_UP } else { SPIN_DOWN })
            .collect();
        let s = state(4, spins);
        let summary = ClusterScratch::new(16).label(&s, Connectivity::Opinion);
        assert_eq!(summary.largest, Some(ClusterRef { root: 2, size: 8 }));
        assert_eq!(summary.second, Some(ClusterRef { root: 0, size: 8 }));
    }

    #[test]
    fn zealotry_splits_clusters_when_requested() {
        let mut s = state(2, vec![SPIN_UP; 4]);
        s.set_zealot(3, true);
        let mut scratch = ClusterScratch::new(4);
        assert_eq!(scratch.label(&s, Connectivity::Opinion).count, 1);
        let summary = scratch.label(&s, Connectivity::OpinionAndZealotry);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.second_size(), 1);
    }

    #[test]
    fn vacancies_are_not_clusters() {
        let s = state(2, vec![SPIN_UP, VACANT, VACANT, SPIN_UP]);
        let mut scratch = ClusterScratch::new(4);
        let summary = scratch.label(&s, Connectivity::Opinion);
        assert_eq!(summary.count, 2);
        assert_eq!(scratch.sizes().iter().sum::<usize>(), 2);
    }

    #[test]
    fn empty_lattice_has_no_cluster() {
        let s = state(2, vec![VACANT; 4]);
        let summary = ClusterScratch::new(4).label(&s, Connectivity::Opinion);
        assert_eq!(summary, ClusterSummary::default());
    }
}
