//! Simulation driver.
//!
//! This module provides [`Simulation`], which owns the lattice, the random
//! stream, the measurement schedule, and the observer, and drives a run to
//! completion with [`Simulation::run`]:
//!
//! - **Sweep mode**: integer time. Before each sweep the driver checks for
//!   an absorbing state, then measures if the current step is scheduled.
//! - **Event-driven mode**: continuous time advancing by `1 / |active|` per
//!   update. Every scheduled time passed since the last update is
//!   recorded, stamped with its scheduled value.
//! - **Absorption**: the absorbing state is measured once and that record
//!   is stamped at every scheduled time not yet written, starting with the
//!   next one. No row is written at an unscheduled time, so every run
//!   yields exactly one row per scheduled time.

use tracing::{debug, info};

use ladvoter_lattice::{
    ActiveList, ChaChaSource, LatticeState, Topology, UniformSource, UpdateRules, event_step,
    sweep,
};
use ladvoter_types::UpdateMode;

use crate::config::SimulationConfig;
use crate::error::RunnerError;
use crate::observer::{Measurement, Observer};
use crate::schedule::MeasurementSchedule;
use crate::sink::{MeasurementSink, RunHeader};

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// No further opinion change is possible.
    Absorbed,
    /// Every scheduled time was measured.
    TimeBudget,
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// The reason the run ended.
    pub end_reason: EndReason,
    /// Simulated time at the end of the run.
    pub final_time: f64,
    /// Rows handed to the sink, fill rows included.
    pub records: usize,
    /// Elementary updates performed.
    pub updates: u64,
    /// Seed of the run.
    pub seed: u64,
}

/// A configured run.
pub struct Simulation<R: UniformSource = ChaChaSource> {
    config: SimulationConfig,
    seed: u64,
    state: LatticeState,
    rules: UpdateRules,
    rng: R,
    schedule: MeasurementSchedule,
    observer: Observer,
}

impl Simulation<ChaChaSource> {
    /// Validate `config` and build a random initial lattice from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] for an invalid configuration and
    /// [`RunnerError::Lattice`] if the lattice cannot be built.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self, RunnerError> {
        config.validate()?;
        let topology = Topology::new(config.lattice.side)?;
        let mut rng = ChaChaSource::new(seed);
        let state = LatticeState::random(
            topology,
            config.lattice.opinions,
            config.lattice.occupancy,
            &mut rng,
        )?;
        Self::with_state(config, seed, state, rng)
    }
}

impl<R: UniformSource> Simulation<R> {
    /// Run `config` from a prepared lattice and random source.
    ///
    /// The lattice geometry in `config` is ignored in favor of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Config`] for an invalid configuration.
    pub fn with_state(
        config: SimulationConfig,
        seed: u64,
        state: LatticeState,
        rng: R,
    ) -> Result<Self, RunnerError> {
        config.validate()?;
        let schedule = MeasurementSchedule::new(config.schedule.spacing, config.schedule.max_time);
        let observer = Observer::new(
            state.site_count(),
            config.connectivity(),
            config.clusters.domain_statistics,
        );
        let rules = config.update_rules();
        Ok(Self {
            config,
            seed,
            state,
            rules,
            rng,
            schedule,
            observer,
        })
    }

    /// Current lattice.
    pub const fn state(&self) -> &LatticeState {
        &self.state
    }

    /// Measurement times of this run.
    pub const fn schedule(&self) -> &MeasurementSchedule {
        &self.schedule
    }

    /// Seed of this run.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Header describing this run for the output files.
    pub fn header(&self) -> RunHeader {
        RunHeader::new(&self.config, self.seed, self.state.population())
    }

    /// Drive the run until absorption or the end of the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Cluster`] if a measurement fails and
    /// [`RunnerError::Sink`] if the sink rejects a record.
    pub fn run(&mut self, sink: &mut dyn MeasurementSink) -> Result<RunSummary, RunnerError> {
        info!(
            seed = self.seed,
            side = self.state.topology().side(),
            agents = self.state.population(),
            increment = self.rules.increment,
            reset = self.rules.reset.label(),
            irreversible = self.rules.irreversible,
            update_mode = ?self.config.dynamics.update_mode,
            points = self.schedule.len(),
            max_time = self.config.schedule.max_time,
            "Simulation starting"
        );

        let summary = match self.config.dynamics.update_mode {
            UpdateMode::Sweep => self.run_sweeps(sink)?,
            UpdateMode::EventDriven => self.run_events(sink)?,
        };
        sink.finish()?;

        info!(
            end_reason = ?summary.end_reason,
            final_time = summary.final_time,
            records = summary.records,
            updates = summary.updates,
            "Simulation complete"
        );
        Ok(summary)
    }

    /// No opinion change can happen any more. Without mobility a lattice
    /// with no disagreeing link is frozen; with mobility agents can still
    /// meet, so only consensus is final.
    const fn is_absorbed(&self) -> bool {
        if self.rules.mobility.is_some() {
            self.state.is_consensus()
        } else {
            self.state.interface_count() == 0
        }
    }

    fn run_sweeps(&mut self, sink: &mut dyn MeasurementSink) -> Result<RunSummary, RunnerError> {
        let mut pending = 0_usize;
        let mut records = 0_usize;
        let mut updates = 0_u64;
        let mut t = 0_u64;

        loop {
            if self.is_absorbed() {
                let measurement = self.measure(t as f64, None)?;
                records = records.saturating_add(self.fill(sink, &measurement, pending)?);
                return Ok(self.summary(EndReason::Absorbed, t as f64, records, updates));
            }
            if self.schedule.get(pending) == Some(t) {
                let measurement = self.measure(t as f64, None)?;
                sink.write(&measurement)?;
                records = records.saturating_add(1);
                pending = pending.saturating_add(1);
            }
            if pending == self.schedule.len() {
                return Ok(self.summary(EndReason::TimeBudget, t as f64, records, updates));
            }

            let stats = sweep(&mut self.state, &self.rules, &mut self.rng);
            updates = updates.saturating_add(stats.updates as u64);
            t = t.saturating_add(1);
        }
    }

    fn run_events(&mut self, sink: &mut dyn MeasurementSink) -> Result<RunSummary, RunnerError> {
        let mut list = ActiveList::from_state(&self.state);
        let mut pending = 0_usize;
        let mut records = 0_usize;
        let mut updates = 0_u64;
        let mut time = 0.0_f64;

        loop {
            if list.is_empty() {
                let measurement = self.measure(time, Some(0))?;
                records = records.saturating_add(self.fill(sink, &measurement, pending)?);
                return Ok(self.summary(EndReason::Absorbed, time, records, updates));
            }

            let due: Vec<u64> = self
                .remaining(pending)
                .iter()
                .copied()
                .take_while(|&p| p as f64 <= time)
                .collect();
            if !due.is_empty() {
                let measurement = self.measure(time, Some(list.len()))?;
                records = records.saturating_add(stamp(sink, &measurement, &due)?);
                pending = pending.saturating_add(due.len());
            }
            if pending == self.schedule.len() {
                return Ok(self.summary(EndReason::TimeBudget, time, records, updates));
            }

            if let Some(step) = event_step(&mut self.state, &self.rules, &mut list, &mut self.rng) {
                time += step.elapsed;
                updates = updates.saturating_add(1);
            }
        }
    }

    fn measure(&mut self, time: f64, active: Option<usize>) -> Result<Measurement, RunnerError> {
        let measurement = self.observer.measure(&self.state, time, active)?;
        let record = &measurement.record;
        debug!(
            time = record.time,
            persistence = record.persistence,
            zealots = record.zealot_fraction,
            active = record.active_density,
            clusters = record.cluster_count,
            largest = record.largest_size,
            "Measurement"
        );
        Ok(measurement)
    }

    /// Scheduled times from index `pending` on.
    fn remaining(&self, pending: usize) -> &[u64] {
        self.schedule.points().get(pending..).unwrap_or_default()
    }

    /// Stamp the absorbing state `last` at every scheduled time from index
    /// `pending` on.
    fn fill(
        &self,
        sink: &mut dyn MeasurementSink,
        last: &Measurement,
        pending: usize,
    ) -> Result<usize, RunnerError> {
        let filled = stamp(sink, last, self.remaining(pending))?;
        if filled > 0 {
            info!(
                time = last.record.time,
                filled = filled,
                "Absorbing state reached, filling remaining schedule"
            );
        }
        Ok(filled)
    }

    const fn summary(
        &self,
        end_reason: EndReason,
        final_time: f64,
        records: usize,
        updates: u64,
    ) -> RunSummary {
        RunSummary {
            end_reason,
            final_time,
            records,
            updates,
            seed: self.seed,
        }
    }
}

/// Write `measurement` once per time in `times`. Only the first row
/// carries the domain catalog.
fn stamp(
    sink: &mut dyn MeasurementSink,
    measurement: &Measurement,
    times: &[u64],
) -> Result<usize, RunnerError> {
    for (k, &p) in times.iter().enumerate() {
        let domains = if k == 0 {
            measurement.domains.clone()
        } else {
            None
        };
        sink.write(&Measurement {
            record: measurement.record.at_time(p as f64),
            domains,
        })?;
    }
    Ok(times.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use ladvoter_lattice::ScriptedSource;
    use ladvoter_types::{OpinionMode, SPIN_DOWN, SPIN_UP};

    fn config(yaml: &str) -> SimulationConfig {
        SimulationConfig::parse(yaml).unwrap()
    }

    #[test]
    fn uniform_lattice_is_absorbed_at_once_and_filled() {
        let state = LatticeState::from_spins(
            Topology::new(4).unwrap(),
            OpinionMode::Binary,
            vec![SPIN_UP; 16],
        )
        .unwrap();
        let config = config("lattice:\n  side: 4\nschedule:\n  max_time: 100\n");
        let mut sim =
            Simulation::with_state(config, 1, state, ScriptedSource::new(Vec::new())).unwrap();
        let mut sink = MemorySink::default();
        let summary = sim.run(&mut sink).unwrap();

        assert_eq!(summary.end_reason, EndReason::Absorbed);
        assert_eq!(summary.updates, 0);
        assert_eq!(summary.records, sim.schedule().len());
        assert_eq!(sink.measurements.len(), sim.schedule().len());
        assert!(sink.finished);
        let times: Vec<f64> = sink.records().map(|r| r.time).collect();
        assert_eq!(times.first(), Some(&0.0));
        assert_eq!(times.last(), Some(&100.0));
        assert!(sink.records().all(|r| r.cluster_count == 1 && r.largest_size == 16));
    }

    #[test]
    fn frozen_event_driven_lattice_reports_empty_list() {
        let state = LatticeState::from_spins(
            Topology::new(3).unwrap(),
            OpinionMode::Binary,
            vec![SPIN_DOWN; 9],
        )
        .unwrap();
        let config = config(
            "lattice:\n  side: 3\ndynamics:\n  update_mode: event_driven\nschedule:\n  max_time: 10\n",
        );
        let mut sim =
            Simulation::with_state(config, 1, state, ScriptedSource::new(Vec::new())).unwrap();
        let mut sink = MemorySink::default();
        let summary = sim.run(&mut sink).unwrap();

        assert_eq!(summary.end_reason, EndReason::Absorbed);
        let first = sink.records().next().unwrap();
        assert_eq!(first.active_sites, Some(0));
        assert_eq!(first.active_density, 0.0);
        // Absorbed before the first update: the whole schedule is fill.
        assert_eq!(summary.records, sim.schedule().len());
        assert_eq!(first.time, 0.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Simulation::new(config("lattice:\n  side: 1\n"), 1);
        assert!(matches!(err, Err(RunnerError::Config { .. })));
    }
}
