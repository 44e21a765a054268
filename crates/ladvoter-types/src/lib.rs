//! Shared type definitions for the LAD voter simulation.
//!
//! This crate holds the small value types that cross crate boundaries:
//! spin encoding, the configuration enumerations that select a model
//! variant at run time, and the records handed to output sinks.
//!
//! # Modules
//!
//! - [`spin`] -- Spin encoding, including the reserved vacancy value
//! - [`enums`] -- Model-variant selectors (reset policy, acceptance,
//!   occupancy, update mode) and the percolation class
//! - [`structs`] -- Measurement and per-domain records

pub mod enums;
pub mod spin;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AcceptanceMode, DEFAULT_GAMMA, OccupancyModel, OpinionMode, PercolationClass, ResetPolicy,
    UpdateMode,
};
pub use spin::{SPIN_DOWN, SPIN_UP, Spin, VACANT, is_occupied};
pub use structs::{DomainRecord, MeasurementRecord};
