//! Elementary update rule and the synchronous sweep.
//!
//! One elementary update picks a neighbor of a site and lets the pair
//! interact. Agreement reinforces both convictions; disagreement either
//! persuades the site or triggers the tug of war on convictions, depending
//! on the zealot flag and the acceptance rule. Convictions crossing the
//! threshold turn a site into a zealot; in reversible mode a conviction
//! falling back to the threshold clears the flag again.
//!
//! # Draw order
//!
//! Per elementary update: neighbor slot (`floor(4u)`), then, for the
//! probabilistic rule only, the `alpha` and `beta` acceptance draws, then,
//! when mobility is enabled, the move draw and the move direction.

// Sites come from the topology tables and stay below N.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use ladvoter_types::{AcceptanceMode, ResetPolicy};
use tracing::trace;

use crate::rng::UniformSource;
use crate::state::LatticeState;
use crate::topology::NEIGHBOR_COUNT;

/// Parameters of the elementary update rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateRules {
    /// Conviction increment `Δ` per reinforcing encounter.
    pub increment: f64,
    /// Conviction at or above which a site becomes a zealot.
    pub threshold: f64,
    /// Conviction change applied to a persuaded site.
    pub reset: ResetPolicy,
    /// Intransigent mode: zealot flags are never cleared.
    pub irreversible: bool,
    /// Rule deciding whether a disagreeing encounter persuades.
    pub acceptance: AcceptanceMode,
    /// Probability of attempting a swap with a vacant neighbor after each
    /// elementary update.
    pub mobility: Option<f64>,
}

impl Default for UpdateRules {
    fn default() -> Self {
        Self {
            increment: 0.01,
            threshold: 1.0,
            reset: ResetPolicy::Decrement,
            irreversible: false,
            acceptance: AcceptanceMode::Simplified,
            mobility: None,
        }
    }
}

impl UpdateRules {
    /// Pure voter dynamics: no conviction build-up, no zealots.
    pub fn voter() -> Self {
        Self {
            increment: 0.0,
            ..Self::default()
        }
    }

    fn gain(&self, state: &mut LatticeState, site: usize) {
        if state.certainty(site) >= self.threshold {
            state.set_zealot(site, true);
        }
    }

    fn loss(&self, state: &mut LatticeState, site: usize) {
        if !self.irreversible && state.certainty(site) <= self.threshold {
            state.set_zealot(site, false);
        }
    }

    fn reset(&self, state: &mut LatticeState, site: usize) {
        let reset = self.reset.apply(state.certainty(site), self.increment);
        state.set_certainty(site, reset);
    }
}

/// What happened during one elementary update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encounter {
    /// The chosen site or its neighbor was vacant.
    Vacant,
    /// Both sites agreed; convictions grew.
    Reinforced,
    /// The site adopted the neighbor's opinion.
    Persuaded,
    /// A non-zealot rejected the neighbor's opinion.
    Resisted,
    /// A zealot held its opinion.
    Held,
}

impl Encounter {
    /// `true` if the site's spin changed.
    pub const fn changed_spin(self) -> bool {
        matches!(self, Self::Persuaded)
    }
}

/// Counters accumulated over one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Elementary updates performed.
    pub updates: usize,
    /// Updates where the site adopted the neighbor's opinion.
    pub persuaded: usize,
    /// Updates between agreeing sites.
    pub reinforced: usize,
    /// Rejections by non-zealots.
    pub resisted: usize,
    /// Rejections by zealots.
    pub held: usize,
    /// Successful moves into a vacant neighbor.
    pub moves: usize,
}

impl SweepStats {
    fn record(&mut self, encounter: Encounter) {
        self.updates += 1;
        match encounter {
            Encounter::Vacant => {}
            Encounter::Reinforced => self.reinforced += 1,
            Encounter::Persuaded => self.persuaded += 1,
            Encounter::Resisted => self.resisted += 1,
            Encounter::Held => self.held += 1,
        }
    }
}

/// Let the agent at `site` interact with a uniformly chosen neighbor.
///
/// A vacant site or neighbor produces [`Encounter::Vacant`] with no state
/// change (the neighbor slot is still drawn).
pub fn interact(
    state: &mut LatticeState,
    rules: &UpdateRules,
    rng: &mut dyn UniformSource,
    site: usize,
) -> Encounter {
    let slot = rng.below(NEIGHBOR_COUNT);
    let nb = state.topology().neighbor(site, slot);

    let acceptance = match rules.acceptance {
        AcceptanceMode::Simplified => None,
        AcceptanceMode::Probabilistic { alpha, beta } => {
            Some((rng.chance(alpha), rng.chance(beta)))
        }
    };

    if !state.is_occupied(site) || !state.is_occupied(nb) {
        return Encounter::Vacant;
    }

    let delta = rules.increment;

    if state.spin(site) == state.spin(nb) {
        state.add_certainty(site, delta);
        state.add_certainty(nb, delta);
        rules.gain(state, site);
        rules.gain(state, nb);
        return Encounter::Reinforced;
    }

    match acceptance {
        None => {
            let persuaded = !state.is_zealot(site);
            if persuaded {
                state.adopt(site, state.spin(nb));
            }
            state.add_certainty(nb, delta);
            rules.reset(state, site);
            rules.loss(state, site);
            rules.gain(state, nb);
            if persuaded {
                Encounter::Persuaded
            } else {
                Encounter::Held
            }
        }
        Some((accept, _)) if !state.is_zealot(site) => {
            if accept {
                state.adopt(site, state.spin(nb));
                rules.reset(state, site);
                state.add_certainty(nb, delta);
                rules.loss(state, site);
                rules.gain(state, nb);
                Encounter::Persuaded
            } else {
                state.add_certainty(site, delta);
                state.add_certainty(nb, -delta);
                rules.loss(state, nb);
                rules.gain(state, site);
                Encounter::Resisted
            }
        }
        Some((_, yield_conviction)) => {
            if yield_conviction {
                rules.reset(state, site);
            } else {
                state.add_certainty(site, -delta);
            }
            state.add_certainty(nb, delta);
            rules.loss(state, site);
            rules.gain(state, nb);
            Encounter::Held
        }
    }
}

/// With probability `mobility`, move the agent at `site` into a uniformly
/// chosen neighbor if that neighbor is vacant.
///
/// Returns the destination site when a move happened.
pub fn try_move(
    state: &mut LatticeState,
    mobility: f64,
    rng: &mut dyn UniformSource,
    site: usize,
) -> Option<usize> {
    if !rng.chance(mobility) {
        return None;
    }
    let slot = rng.below(NEIGHBOR_COUNT);
    let target = state.topology().neighbor(site, slot);
    if state.is_occupied(site) && !state.is_occupied(target) {
        state.swap_sites(site, target);
        Some(target)
    } else {
        None
    }
}

/// One Monte Carlo step: `N` elementary updates on uniformly drawn
/// occupied sites, each followed by an optional mobility attempt.
///
/// Vacant sites are redrawn. A lattice with no agent is left untouched.
pub fn sweep(
    state: &mut LatticeState,
    rules: &UpdateRules,
    rng: &mut dyn UniformSource,
) -> SweepStats {
    let mut stats = SweepStats::default();
    let n = state.site_count();
    if state.population() == 0 {
        return stats;
    }

    for _ in 0..n {
        let site = loop {
            let candidate = rng.below(n);
            if state.is_occupied(candidate) {
                break candidate;
            }
        };
        stats.record(interact(state, rules, rng, site));

        if let Some(mobility) = rules.mobility {
            if try_move(state, mobility, rng, site).is_some() {
                stats.moves += 1;
            }
        }
    }

    trace!(
        persuaded = stats.persuaded,
        reinforced = stats.reinforced,
        moves = stats.moves,
        "sweep done"
    );
    stats
}
