//! Periodic lattice, agent state, and opinion dynamics for the LAD voter
//! simulation.
//!
//! Everything in this crate is single-threaded and synchronous. A run owns
//! one [`LatticeState`] and mutates it in place through the update rule;
//! measurements only read it.
//!
//! # Modules
//!
//! - [`topology`] -- Precomputed right/left/up/down neighbor tables on an
//!   `L x L` torus.
//! - [`rng`] -- [`UniformSource`] trait with the `ChaCha8` production source
//!   and a scripted source for deterministic tests.
//! - [`state`] -- [`LatticeState`]: spins, convictions, zealot flags, change
//!   markers, opinion tallies, and the incremental interface count.
//! - [`update`] -- The elementary update rule, mobility moves, and the
//!   synchronous sweep.
//! - [`active`] -- [`ActiveList`] and event-driven stepping in continuous
//!   time.
//! - [`measure`] -- One-pass scan for persistence, zealot fraction, and
//!   active-interface density.
//! - [`palette`] -- Snapshot color classification.
//! - [`error`] -- [`LatticeError`].

pub mod active;
pub mod error;
pub mod measure;
pub mod palette;
pub mod rng;
pub mod state;
pub mod topology;
pub mod update;

pub use active::{ActiveList, EventStep, event_step};
pub use error::LatticeError;
pub use measure::{Observables, observe};
pub use palette::{PALETTE, SiteColor, classify, palette_frame};
pub use rng::{ChaChaSource, ScriptedSource, UniformSource};
pub use state::LatticeState;
pub use topology::{NEIGHBOR_COUNT, Topology};
pub use update::{Encounter, SweepStats, UpdateRules, interact, sweep, try_move};
