//! Per-site agent state.
//!
//! [`LatticeState`] owns every per-site array the dynamics touch: spin,
//! zealot flag, conviction, and the "has changed" marker used for
//! persistence. It also keeps three running aggregates that would
//! otherwise need a full scan:
//!
//! - the head count of every opinion (consensus becomes an O(1) check),
//! - the number of surviving opinions,
//! - the number of disagreeing occupied links (the interface count).
//!
//! Every mutation goes through [`LatticeState::adopt`] or
//! [`LatticeState::swap_sites`], which update the aggregates
//! incrementally by recounting the interfaces around the touched sites.

// Sites are below N and counters are bounded by N.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use ladvoter_types::{OccupancyModel, OpinionMode, SPIN_DOWN, SPIN_UP, Spin, VACANT, is_occupied};

use crate::error::LatticeError;
use crate::rng::UniformSource;
use crate::topology::Topology;

/// Complete mutable state of the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeState {
    topology: Topology,
    mode: OpinionMode,
    spins: Vec<Spin>,
    zealot: Vec<bool>,
    certainty: Vec<f64>,
    changed: Vec<bool>,
    tally: Vec<usize>,
    surviving: usize,
    initial_opinions: usize,
    population: usize,
    interfaces: usize,
}

impl LatticeState {
    /// Draw a fresh initial configuration.
    ///
    /// Binary lattices draw one uniform per site for the spin
    /// (`k = floor(2u)`, spin `2k - 1`). Diluted lattices first draw the
    /// occupation (`u <= density`) and only then the spin. Non-binary
    /// lattices give site `i` the opinion `i + 1`. Convictions start at
    /// zero and no site is a zealot.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidDensity`] for a diluted occupancy
    /// outside `(0, 1]`.
    pub fn random(
        topology: Topology,
        mode: OpinionMode,
        occupancy: OccupancyModel,
        rng: &mut dyn UniformSource,
    ) -> Result<Self, LatticeError> {
        let density = match occupancy {
            OccupancyModel::Full => None,
            OccupancyModel::Diluted { density } => {
                if !(density > 0.0 && density <= 1.0) {
                    return Err(LatticeError::InvalidDensity(density));
                }
                Some(density)
            }
        };

        let n = topology.site_count();
        let mut spins = Vec::with_capacity(n);
        for site in 0..n {
            let occupied = density.is_none_or(|rho| rng.uniform() <= rho);
            let spin = if !occupied {
                VACANT
            } else {
                match mode {
                    OpinionMode::Binary => {
                        if rng.below(2) == 0 {
                            SPIN_DOWN
                        } else {
                            SPIN_UP
                        }
                    }
                    OpinionMode::NonBinary => opinion_id(site),
                }
            };
            spins.push(spin);
        }

        Ok(Self::assemble(topology, mode, spins))
    }

    /// Build a state from an explicit spin configuration.
    ///
    /// Binary lattices accept `+1`, `-1` and [`VACANT`]; non-binary
    /// lattices accept [`VACANT`] and opinion ids in `1..=N`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::SpinCountMismatch`] if `spins` does not have
    /// one entry per site, or [`LatticeError::InvalidSpin`] for a value
    /// outside the opinion space.
    pub fn from_spins(
        topology: Topology,
        mode: OpinionMode,
        spins: Vec<Spin>,
    ) -> Result<Self, LatticeError> {
        let n = topology.site_count();
        if spins.len() != n {
            return Err(LatticeError::SpinCountMismatch {
                expected: n,
                actual: spins.len(),
            });
        }
        for (site, &spin) in spins.iter().enumerate() {
            let valid = match mode {
                OpinionMode::Binary => matches!(spin, SPIN_UP | SPIN_DOWN | VACANT),
                OpinionMode::NonBinary => {
                    spin == VACANT || usize::try_from(spin).is_ok_and(|id| id >= 1 && id <= n)
                }
            };
            if !valid {
                return Err(LatticeError::InvalidSpin { site, spin });
            }
        }
        Ok(Self::assemble(topology, mode, spins))
    }

    fn assemble(topology: Topology, mode: OpinionMode, spins: Vec<Spin>) -> Self {
        let n = topology.site_count();
        let tally_len = match mode {
            OpinionMode::Binary => 2,
            OpinionMode::NonBinary => n,
        };
        let mut state = Self {
            topology,
            mode,
            spins,
            zealot: vec![false; n],
            certainty: vec![0.0; n],
            changed: vec![false; n],
            tally: vec![0; tally_len],
            surviving: 0,
            initial_opinions: 0,
            population: 0,
            interfaces: 0,
        };
        for site in 0..n {
            let spin = state.spins[site];
            if is_occupied(spin) {
                state.population += 1;
                let slot = state.tally_slot(spin);
                state.tally[slot] += 1;
            }
        }
        state.surviving = state.tally.iter().filter(|&&count| count > 0).count();
        state.initial_opinions = state.surviving;
        state.interfaces = state.count_interfaces();
        state
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// The lattice topology.
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The opinion space.
    pub const fn mode(&self) -> OpinionMode {
        self.mode
    }

    /// Number of sites.
    pub const fn site_count(&self) -> usize {
        self.topology.site_count()
    }

    /// Spin at `site`.
    pub fn spin(&self, site: usize) -> Spin {
        self.spins[site]
    }

    /// All spins, row-major.
    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    /// Whether `site` holds an agent.
    pub fn is_occupied(&self, site: usize) -> bool {
        is_occupied(self.spins[site])
    }

    /// Zealot flag at `site`.
    pub fn is_zealot(&self, site: usize) -> bool {
        self.zealot[site]
    }

    /// All zealot flags, row-major.
    pub fn zealots(&self) -> &[bool] {
        &self.zealot
    }

    /// Conviction at `site`.
    pub fn certainty(&self, site: usize) -> f64 {
        self.certainty[site]
    }

    /// Whether the agent at `site` ever changed opinion.
    pub fn has_changed(&self, site: usize) -> bool {
        self.changed[site]
    }

    /// Number of occupied sites.
    pub const fn population(&self) -> usize {
        self.population
    }

    /// Number of distinct opinions present at initialization.
    pub const fn initial_opinions(&self) -> usize {
        self.initial_opinions
    }

    /// Number of opinions still held by at least one agent.
    pub const fn surviving_opinions(&self) -> usize {
        self.surviving
    }

    /// Number of agents holding `spin`.
    pub fn holders_of(&self, spin: Spin) -> usize {
        if is_occupied(spin) {
            self.tally.get(self.tally_slot(spin)).copied().unwrap_or(0)
        } else {
            0
        }
    }

    /// `true` once at most one opinion survives.
    pub const fn is_consensus(&self) -> bool {
        self.surviving <= 1
    }

    /// Incrementally maintained number of disagreeing occupied links.
    pub const fn interface_count(&self) -> usize {
        self.interfaces
    }

    /// `true` if both sites are occupied and hold different opinions.
    pub fn disagree(&self, a: usize, b: usize) -> bool {
        let (sa, sb) = (self.spins[a], self.spins[b]);
        is_occupied(sa) && is_occupied(sb) && sa != sb
    }

    /// Number of occupied neighbors of `site` holding a different opinion.
    pub fn disagreeing_neighbors(&self, site: usize) -> usize {
        self.topology
            .neighbors(site)
            .iter()
            .filter(|&&nb| self.disagree(site, nb))
            .count()
    }

    /// An occupied site with at least one disagreeing neighbor.
    pub fn is_active(&self, site: usize) -> bool {
        self.topology
            .neighbors(site)
            .iter()
            .any(|&nb| self.disagree(site, nb))
    }

    /// Full rescan of the disagreeing occupied links, counting each link
    /// once through its right and down endpoints.
    pub fn count_interfaces(&self) -> usize {
        (0..self.site_count())
            .map(|site| {
                usize::from(self.disagree(site, self.topology.right(site)))
                    + usize::from(self.disagree(site, self.topology.down(site)))
            })
            .sum()
    }

    // -----------------------------------------------------------------------
    // Scenario setters
    // -----------------------------------------------------------------------

    /// Overwrite the conviction at `site` without touching the zealot flag.
    pub fn set_certainty(&mut self, site: usize, certainty: f64) {
        self.certainty[site] = certainty;
    }

    /// Overwrite the zealot flag at `site`.
    pub fn set_zealot(&mut self, site: usize, zealot: bool) {
        self.zealot[site] = zealot;
    }

    // -----------------------------------------------------------------------
    // Dynamics-facing mutation
    // -----------------------------------------------------------------------

    /// Make the agent at `site` adopt `spin`, marking it as changed and
    /// updating tallies and the interface count.
    pub fn adopt(&mut self, site: usize, spin: Spin) {
        let old = self.spins[site];
        if old == spin || !is_occupied(old) || !is_occupied(spin) {
            return;
        }
        let before = self.disagreeing_neighbors(site);

        let old_slot = self.tally_slot(old);
        self.tally[old_slot] -= 1;
        if self.tally[old_slot] == 0 {
            self.surviving -= 1;
        }
        let new_slot = self.tally_slot(spin);
        if self.tally[new_slot] == 0 {
            self.surviving += 1;
        }
        self.tally[new_slot] += 1;

        self.spins[site] = spin;
        self.changed[site] = true;

        let after = self.disagreeing_neighbors(site);
        self.interfaces = self.interfaces + after - before;
    }

    /// Exchange the complete state (spin, conviction, zealot flag, change
    /// marker) of two sites, updating the interface count from the links
    /// around both endpoints.
    pub fn swap_sites(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let before = self.disagreeing_neighbors(a) + self.disagreeing_neighbors(b);
        self.spins.swap(a, b);
        self.certainty.swap(a, b);
        self.zealot.swap(a, b);
        self.changed.swap(a, b);
        let after = self.disagreeing_neighbors(a) + self.disagreeing_neighbors(b);
        self.interfaces = self.interfaces + after - before;
    }

    pub(crate) fn add_certainty(&mut self, site: usize, delta: f64) {
        self.certainty[site] += delta;
    }

    fn tally_slot(&self, spin: Spin) -> usize {
        match self.mode {
            OpinionMode::Binary => usize::from(spin > 0),
            OpinionMode::NonBinary => usize::try_from(spin - 1).unwrap_or(0),
        }
    }
}

/// Opinion id given to `site` on a non-binary lattice.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn opinion_id(site: usize) -> Spin {
    // Topology guarantees N fits in i32.
    site as Spin + 1
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::rng::{ChaChaSource, ScriptedSource};

    fn binary(side: usize, spins: Vec<Spin>) -> LatticeState {
        LatticeState::from_spins(Topology::new(side).unwrap(), OpinionMode::Binary, spins).unwrap()
    }

    #[test]
    fn random_binary_draws_one_uniform_per_site() {
        let topology = Topology::new(2).unwrap();
        let mut rng = ScriptedSource::new(vec![0.1, 0.9, 0.4, 0.6]);
        let state =
            LatticeState::random(topology, OpinionMode::Binary, OccupancyModel::Full, &mut rng)
                .unwrap();
        assert_eq!(state.spins(), &[-1, 1, -1, 1]);
        assert_eq!(rng.consumed(), 4);
        assert_eq!(state.population(), 4);
        assert_eq!(state.holders_of(SPIN_UP), 2);
        assert!(!state.is_consensus());
    }

    #[test]
    fn diluted_draws_occupation_before_spin() {
        let topology = Topology::new(2).unwrap();
        // site0: occupied (0.2 <= 0.5), spin draw 0.9 -> +1
        // site1: vacant (0.7)
        // site2: occupied, spin draw 0.1 -> -1
        // site3: vacant
        let mut rng = ScriptedSource::new(vec![0.2, 0.9, 0.7, 0.3, 0.1, 0.8]);
        let state = LatticeState::random(
            topology,
            OpinionMode::Binary,
            OccupancyModel::Diluted { density: 0.5 },
            &mut rng,
        )
        .unwrap();
        assert_eq!(state.spins(), &[1, VACANT, -1, VACANT]);
        assert_eq!(state.population(), 2);
    }

    #[test]
    fn rejects_invalid_density() {
        let topology = Topology::new(2).unwrap();
        let mut rng = ChaChaSource::new(1);
        let err = LatticeState::random(
            topology,
            OpinionMode::Binary,
            OccupancyModel::Diluted { density: 0.0 },
            &mut rng,
        );
        assert!(matches!(err, Err(LatticeError::InvalidDensity(_))));
    }

    #[test]
    fn non_binary_starts_with_distinct_opinions() {
        let topology = Topology::new(3).unwrap();
        let mut rng = ChaChaSource::new(1);
        let state =
            LatticeState::random(topology, OpinionMode::NonBinary, OccupancyModel::Full, &mut rng)
                .unwrap();
        assert_eq!(state.surviving_opinions(), 9);
        assert_eq!(state.initial_opinions(), 9);
        assert_eq!(state.spin(4), 5);
        // Every link disagrees.
        assert_eq!(state.interface_count(), 18);
    }

    #[test]
    fn from_spins_validates_shape_and_values() {
        let topology = Topology::new(2).unwrap();
        let err = LatticeState::from_spins(topology.clone(), OpinionMode::Binary, vec![1, 1, 1]);
        assert!(matches!(err, Err(LatticeError::SpinCountMismatch { .. })));

        let err = LatticeState::from_spins(topology.clone(), OpinionMode::Binary, vec![1, 2, 1, 1]);
        assert!(matches!(err, Err(LatticeError::InvalidSpin { site: 1, spin: 2 })));

        let err = LatticeState::from_spins(topology, OpinionMode::NonBinary, vec![1, 2, 3, 5]);
        assert!(matches!(err, Err(LatticeError::InvalidSpin { site: 3, spin: 5 })));
    }

    #[test]
    fn adopt_updates_tallies_and_interfaces() {
        // 2x2 lattice, one dissenter at site 0.
        let mut state = binary(2, vec![-1, 1, 1, 1]);
        // On a 2x2 torus every neighbor pair is linked twice.
        assert_eq!(state.interface_count(), 4);
        assert_eq!(state.count_interfaces(), 4);

        state.adopt(0, SPIN_UP);
        assert!(state.has_changed(0));
        assert_eq!(state.holders_of(SPIN_DOWN), 0);
        assert!(state.is_consensus());
        assert_eq!(state.interface_count(), 0);
        assert_eq!(state.count_interfaces(), 0);
    }

    #[test]
    fn adopting_the_same_spin_is_a_no_op() {
        let mut state = binary(2, vec![1, 1, 1, -1]);
        state.adopt(0, SPIN_UP);
        assert!(!state.has_changed(0));
    }

    #[test]
    fn swap_moves_the_whole_agent() {
        let mut state = binary(3, vec![1, VACANT, -1, -1, -1, -1, -1, -1, -1]);
        state.set_certainty(0, 0.7);
        state.set_zealot(0, true);
        let before = state.count_interfaces();
        assert_eq!(state.interface_count(), before);

        state.swap_sites(0, 1);
        assert_eq!(state.spin(1), SPIN_UP);
        assert_eq!(state.spin(0), VACANT);
        assert_eq!(state.certainty(1), 0.7);
        assert!(state.is_zealot(1));
        assert!(!state.is_zealot(0));
        assert_eq!(state.interface_count(), state.count_interfaces());
    }

    #[test]
    fn vacant_sites_never_disagree() {
        let state = binary(2, vec![1, VACANT, -1, VACANT]);
        assert!(!state.disagree(0, 1));
        assert!(state.disagree(0, 2));
        assert!(!state.is_active(1));
        assert!(state.is_active(0));
    }
}
