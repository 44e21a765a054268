//! Active-site list and event-driven stepping.
//!
//! An active site is an occupied site with at least one disagreeing
//! occupied neighbor. The list is kept dense: removal swaps the site with
//! the last entry. `position[s]` is `Some(k)` exactly when `sites[k] == s`.
//!
//! In event-driven mode each elementary update picks a site uniformly from
//! the list and advances simulated time by `1 / |list|`, so a unit of time
//! still corresponds to one update per active site on average.

// Positions index a list holding at most N sites.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use crate::rng::UniformSource;
use crate::state::LatticeState;
use crate::update::{Encounter, UpdateRules, interact, try_move};

/// Dense list of active sites with an inverse index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveList {
    sites: Vec<usize>,
    position: Vec<Option<usize>>,
}

impl ActiveList {
    /// Empty list able to hold any site of an `n`-site lattice.
    pub fn new(n: usize) -> Self {
        Self {
            sites: Vec::with_capacity(n),
            position: vec![None; n],
        }
    }

    /// List holding every active site of `state`, in index order.
    pub fn from_state(state: &LatticeState) -> Self {
        let mut list = Self::new(state.site_count());
        list.rebuild(state);
        list
    }

    /// Discard the contents and rescan `state`.
    pub fn rebuild(&mut self, state: &LatticeState) {
        self.sites.clear();
        self.position.clear();
        self.position.resize(state.site_count(), None);
        for site in 0..state.site_count() {
            if state.is_active(site) {
                self.include(site);
            }
        }
    }

    /// Append `site` unless it is already listed.
    pub fn include(&mut self, site: usize) {
        if self.position[site].is_none() {
            self.position[site] = Some(self.sites.len());
            self.sites.push(site);
        }
    }

    /// Remove `site` by swapping it with the last entry. No-op if absent.
    pub fn remove(&mut self, site: usize) {
        let Some(k) = self.position[site].take() else {
            return;
        };
        self.sites.swap_remove(k);
        if let Some(&moved) = self.sites.get(k) {
            self.position[moved] = Some(k);
        }
    }

    /// Whether `site` is listed.
    pub fn contains(&self, site: usize) -> bool {
        self.position[site].is_some()
    }

    /// Index of `site` in the list.
    pub fn position_of(&self, site: usize) -> Option<usize> {
        self.position[site]
    }

    /// Number of listed sites.
    pub const fn len(&self) -> usize {
        self.sites.len()
    }

    /// `true` when no site is active, i.e. the lattice reached consensus
    /// (or every remaining interface is blocked by vacancies).
    pub const fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Listed sites in list order.
    pub fn as_slice(&self) -> &[usize] {
        &self.sites
    }

    /// Re-evaluate `site` and its four neighbors against `state`.
    pub fn refresh(&mut self, state: &LatticeState, site: usize) {
        self.sync(state, site);
        for nb in state.topology().neighbors(site) {
            self.sync(state, nb);
        }
    }

    /// Uniformly chosen listed site (`list[floor(u * len)]`).
    pub fn pick(&self, rng: &mut dyn UniformSource) -> Option<usize> {
        if self.sites.is_empty() {
            None
        } else {
            Some(self.sites[rng.below(self.sites.len())])
        }
    }

    fn sync(&mut self, state: &LatticeState, site: usize) {
        if state.is_active(site) {
            self.include(site);
        } else {
            self.remove(site);
        }
    }
}

/// Outcome of one event-driven update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventStep {
    /// The updated site.
    pub site: usize,
    /// What the encounter did.
    pub encounter: Encounter,
    /// Simulated time consumed, `1 / |list|` at selection.
    pub elapsed: f64,
    /// Destination of a mobility move, if one happened.
    pub moved_to: Option<usize>,
}

/// Perform one event-driven update, keeping `list` in sync with `state`.
///
/// Returns `None` when the list is empty.
pub fn event_step(
    state: &mut LatticeState,
    rules: &UpdateRules,
    list: &mut ActiveList,
    rng: &mut dyn UniformSource,
) -> Option<EventStep> {
    let site = list.pick(rng)?;
    let elapsed = 1.0 / list.len() as f64;

    let encounter = interact(state, rules, rng, site);
    if encounter.changed_spin() {
        list.refresh(state, site);
    }

    let moved_to = rules
        .mobility
        .and_then(|mobility| try_move(state, mobility, rng, site));
    if let Some(target) = moved_to {
        list.refresh(state, site);
        list.refresh(state, target);
    }

    Some(EventStep {
        site,
        encounter,
        elapsed,
        moved_to,
    })
}
