//! Full-lattice scan of the scalar order parameters.

// Counts are bounded by the number of links.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use ladvoter_types::OpinionMode;

use crate::state::LatticeState;

/// Scalars produced by one measurement scan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Observables {
    /// Fraction of agents that never changed opinion (binary), or fraction
    /// of initial opinions still held by someone (non-binary).
    pub persistence: f64,
    /// Fraction of agents flagged as zealots.
    pub zealot_fraction: f64,
    /// Fraction of occupied right/down links whose endpoints disagree.
    pub active_density: f64,
    /// Number of disagreeing occupied links.
    pub interfaces: usize,
    /// Number of occupied links (`2N` on a full lattice).
    pub links: usize,
    /// Number of occupied sites.
    pub population: usize,
}

/// Scan `state` once and compute the observables.
///
/// Every link is visited once, from its left or upper endpoint. An empty
/// lattice yields all zeros.
pub fn observe(state: &LatticeState) -> Observables {
    let topology = state.topology();
    let mut unchanged = 0_usize;
    let mut zealots = 0_usize;
    let mut links = 0_usize;
    let mut interfaces = 0_usize;

    for site in 0..state.site_count() {
        if !state.is_occupied(site) {
            continue;
        }
        if !state.has_changed(site) {
            unchanged += 1;
        }
        if state.is_zealot(site) {
            zealots += 1;
        }
        for nb in [topology.right(site), topology.down(site)] {
            if state.is_occupied(nb) {
                links += 1;
                if state.spin(nb) != state.spin(site) {
                    interfaces += 1;
                }
            }
        }
    }

    let population = state.population();
    let persistence = match state.mode() {
        OpinionMode::Binary => ratio(unchanged, population),
        OpinionMode::NonBinary => ratio(state.surviving_opinions(), state.initial_opinions()),
    };

    Observables {
        persistence,
        zealot_fraction: ratio(zealots, population),
        active_density: ratio(interfaces, links),
        interfaces,
        links,
        population,
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::topology::Topology;
    use ladvoter_types::{SPIN_DOWN, SPIN_UP, Spin, VACANT};

    fn checkerboard(side: usize) -> Vec<Spin> {
        (0..side * side)
            .map(|i| if (i / side + i % side) % 2 == 0 { SPIN_UP } else { SPIN_DOWN })
            .collect()
    }

    #[test]
    fn checkerboard_is_all_interface() {
        let state = LatticeState::from_spins(
            Topology::new(4).unwrap(),
            OpinionMode::Binary,
            checkerboard(4),
        )
        .unwrap();
        let obs = observe(&state);
        assert_eq!(obs.active_density, 1.0);
        assert_eq!(obs.links, 32);
        assert_eq!(obs.interfaces, state.interface_count());
        assert_eq!(obs.persistence, 1.0);
        assert_eq!(obs.zealot_fraction, 0.0);
    }

    #[test]
    fn uniform_lattice_has_no_interface() {
        let state = LatticeState::from_spins(
            Topology::new(4).unwrap(),
            OpinionMode::Binary,
            vec![SPIN_DOWN; 16],
        )
        .unwrap();
        let obs = observe(&state);
        assert_eq!(obs.active_density, 0.0);
        assert_eq!(obs.interfaces, 0);
    }

    #[test]
    fn persistence_and_zealots_use_the_population() {
        let mut spins = vec![SPIN_UP; 4];
        spins[3] = VACANT;
        spins[2] = SPIN_DOWN;
        let mut state =
            LatticeState::from_spins(Topology::new(2).unwrap(), OpinionMode::Binary, spins)
                .unwrap();
        state.adopt(2, SPIN_UP);
        state.set_zealot(0, true);
        let obs = observe(&state);
        assert_eq!(obs.population, 3);
        assert!((obs.persistence - 2.0 / 3.0).abs() < 1e-12);
        assert!((obs.zealot_fraction - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn non_binary_persistence_counts_surviving_opinions() {
        let mut state = LatticeState::from_spins(
            Topology::new(2).unwrap(),
            OpinionMode::NonBinary,
            vec![1, 2, 3, 4],
        )
        .unwrap();
        state.adopt(1, 1);
        let obs = observe(&state);
        assert_eq!(obs.persistence, 0.75);
    }

    #[test]
    fn empty_lattice_measures_zero() {
        let state = LatticeState::from_spins(
            Topology::new(2).unwrap(),
            OpinionMode::Binary,
            vec![VACANT; 4],
        )
        .unwrap();
        assert_eq!(observe(&state), Observables::default());
    }
}
