//! Property tests for cluster labeling and hull tracing.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use ladvoter_cluster::{ClusterScratch, Connectivity, DomainCatalog, HullWalker};
use ladvoter_lattice::{ChaChaSource, LatticeState, Topology};
use ladvoter_types::{OccupancyModel, OpinionMode, PercolationClass};
use proptest::prelude::*;

fn random_state(seed: u64, side: usize, density: f64) -> LatticeState {
    let mut rng = ChaChaSource::new(seed);
    let occupancy = if density >= 1.0 {
        OccupancyModel::Full
    } else {
        OccupancyModel::Diluted { density }
    };
    LatticeState::random(
        Topology::new(side).unwrap(),
        OpinionMode::Binary,
        occupancy,
        &mut rng,
    )
    .unwrap()
}

/// Flood-fill reference: `true` if `a` and `b` are in the same cluster.
fn connected(state: &LatticeState, a: usize, b: usize) -> bool {
    let t = state.topology();
    let mut seen = vec![false; state.site_count()];
    let mut stack = vec![a];
    seen[a] = true;
    while let Some(s) = stack.pop() {
        if s == b {
            return true;
        }
        for nb in t.neighbors(s) {
            if !seen[nb] && state.is_occupied(nb) && state.spin(nb) == state.spin(s) {
                seen[nb] = true;
                stack.push(nb);
            }
        }
    }
    false
}

proptest! {
    #[test]
    fn sizes_sum_to_population(seed in any::<u64>(), side in 2_usize..16, density in 0.2_f64..1.2) {
        let state = random_state(seed, side, density);
        let mut scratch = ClusterScratch::new(state.site_count());
        let summary = scratch.label(&state, Connectivity::Opinion);
        prop_assert_eq!(scratch.sizes().iter().sum::<usize>(), state.population());
        prop_assert_eq!(summary.count, scratch.clusters().count());
        prop_assert!(summary.largest_size() >= summary.second_size());
    }

    #[test]
    fn roots_are_fixed_points_and_minimal(seed in any::<u64>(), side in 2_usize..12) {
        let state = random_state(seed, side, 1.0);
        let mut scratch = ClusterScratch::new(state.site_count());
        scratch.label(&state, Connectivity::Opinion);
        for site in 0..state.site_count() {
            let root = scratch.root_of(site);
            prop_assert_eq!(scratch.root_of(root), root);
            prop_assert!(root <= site);
        }
    }

    #[test]
    fn same_root_iff_connected(seed in any::<u64>(), side in 2_usize..8) {
        let state = random_state(seed, side, 0.8);
        let mut scratch = ClusterScratch::new(state.site_count());
        scratch.label(&state, Connectivity::Opinion);
        let n = state.site_count();
        for a in (0..n).filter(|&s| state.is_occupied(s)) {
            for b in (0..n).filter(|&s| state.is_occupied(s)) {
                prop_assert_eq!(
                    scratch.root_of(a) == scratch.root_of(b),
                    connected(&state, a, b)
                );
            }
        }
    }

    #[test]
    fn labeling_is_idempotent(seed in any::<u64>(), side in 2_usize..16) {
        let state = random_state(seed, side, 1.0);
        let mut scratch = ClusterScratch::new(state.site_count());
        let first = scratch.label(&state, Connectivity::OpinionAndZealotry);
        let first_sizes = scratch.sizes().to_vec();
        let second = scratch.label(&state, Connectivity::OpinionAndZealotry);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first_sizes, scratch.sizes().to_vec());
    }

    #[test]
    fn hull_area_covers_the_cluster(seed in any::<u64>(), side in 4_usize..14) {
        let state = random_state(seed, side, 1.0);
        let mut scratch = ClusterScratch::new(state.site_count());
        scratch.label(&state, Connectivity::Opinion);
        let catalog = DomainCatalog::build(&state, &scratch, &mut HullWalker::new()).unwrap();
        for domain in &catalog.domains {
            if domain.percolation == PercolationClass::None {
                prop_assert!(domain.hull_area >= domain.size);
                prop_assert!(domain.hull_perimeter >= 4);
            } else {
                prop_assert_eq!(domain.hull_area, 0);
            }
        }
    }
}
