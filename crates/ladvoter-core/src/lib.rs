//! Configuration, scheduling, measurement, and run orchestration for the
//! LAD voter simulation.
//!
//! This crate ties the lattice dynamics and the cluster analysis together
//! into a run: sweep (or event-driven step), measure at scheduled times,
//! stop at absorption or at the end of the time budget.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `ladvoter-config.yaml` into
//!   strongly-typed structs.
//! - [`schedule`] -- Logarithmic and power-law measurement times.
//! - [`observer`] -- [`Observer`] combining the scalar scan with cluster
//!   labeling and the optional domain catalog.
//! - [`sink`] -- [`MeasurementSink`] trait with column, JSON-lines, and
//!   in-memory implementations.
//! - [`runner`] -- [`Simulation`] driver.
//! - [`error`] -- [`RunnerError`] and [`SinkError`].
//!
//! [`Observer`]: observer::Observer
//! [`MeasurementSink`]: sink::MeasurementSink
//! [`Simulation`]: runner::Simulation
//! [`RunnerError`]: error::RunnerError
//! [`SinkError`]: error::SinkError

pub mod config;
pub mod error;
pub mod observer;
pub mod runner;
pub mod schedule;
pub mod sink;
