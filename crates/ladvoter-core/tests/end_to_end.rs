//! End-to-end runs of the simulation driver.
//!
//! Builds small lattices, runs them to completion, and checks the rows
//! handed to the sinks.

#![allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use ladvoter_core::config::SimulationConfig;
use ladvoter_core::runner::{EndReason, Simulation};
use ladvoter_core::sink::{ColumnSink, MeasurementSink, MemorySink};
use ladvoter_lattice::{ChaChaSource, LatticeState, Topology};
use ladvoter_types::{OpinionMode, PercolationClass, SPIN_DOWN, SPIN_UP};

fn config(yaml: &str) -> SimulationConfig {
    SimulationConfig::parse(yaml).unwrap()
}

fn checkerboard(side: usize) -> LatticeState {
    let topology = Topology::new(side).unwrap();
    let spins = (0..side * side)
        .map(|s| {
            if (topology.row(s) + topology.column(s)) % 2 == 0 {
                SPIN_UP
            } else {
                SPIN_DOWN
            }
        })
        .collect();
    LatticeState::from_spins(topology, OpinionMode::Binary, spins).unwrap()
}

#[test]
fn checkerboard_starts_fully_active() {
    let config = config(
        "lattice:\n  side: 4\ndynamics:\n  increment: 0.0\nschedule:\n  max_time: 1\n",
    );
    let mut sim =
        Simulation::with_state(config, 3, checkerboard(4), ChaChaSource::new(3)).unwrap();
    let mut sink = MemorySink::default();
    sim.run(&mut sink).unwrap();

    let first = sink.records().next().unwrap();
    assert_eq!(first.time, 0.0);
    assert_eq!(first.persistence, 1.0);
    assert_eq!(first.active_density, 1.0);
    assert_eq!(first.cluster_count, 16);
    assert_eq!(first.largest_size, 1);
    assert_eq!(first.second_size, 1);
    assert_eq!(first.largest_percolation, PercolationClass::None);
}

#[test]
fn same_seed_same_run() {
    let yaml = "lattice:\n  side: 12\nschedule:\n  max_time: 200\nclusters:\n  domain_statistics: true\n";
    let run = |seed| {
        let mut sim = Simulation::new(config(yaml), seed).unwrap();
        let mut sink = MemorySink::default();
        let summary = sim.run(&mut sink).unwrap();
        (summary, sink.measurements)
    };
    let (a_summary, a) = run(11);
    let (b_summary, b) = run(11);
    assert_eq!(a_summary, b_summary);
    assert_eq!(a, b);
}

#[test]
fn sweep_runs_always_fill_the_schedule() {
    for seed in [1_u64, 3, 5, 7] {
        let yaml = "lattice:\n  side: 6\ndynamics:\n  increment: 0.0\nschedule:\n  max_time: 2000\n";
        let mut sim = Simulation::new(config(yaml), seed).unwrap();
        let mut sink = MemorySink::default();
        let summary = sim.run(&mut sink).unwrap();

        assert_eq!(summary.records, sim.schedule().len());
        let times: Vec<f64> = sink.records().map(|r| r.time).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(times.last(), Some(&2000.0));
        if summary.end_reason == EndReason::Absorbed {
            let last = sink.records().last().unwrap();
            assert_eq!(last.cluster_count, 1);
            assert_eq!(last.active_density, 0.0);
        }
    }
}

#[test]
fn event_driven_run_stamps_scheduled_times() {
    let yaml = "lattice:\n  side: 8\ndynamics:\n  increment: 0.0\n  update_mode: event_driven\nschedule:\n  spacing:\n    kind: power_law\n    points: 12\n  max_time: 500\n";
    let mut sim = Simulation::new(config(yaml), 9).unwrap();
    let mut sink = MemorySink::default();
    let summary = sim.run(&mut sink).unwrap();

    assert_eq!(summary.records, sim.schedule().len());
    assert!(sink.records().all(|r| r.active_sites.is_some()));

    let scheduled: Vec<f64> = sim.schedule().points().iter().map(|&p| p as f64).collect();
    let times: Vec<f64> = sink.records().map(|r| r.time).collect();
    assert_eq!(times, scheduled);
}

#[test]
fn absorption_between_scheduled_times_writes_only_scheduled_rows() {
    let yaml = "lattice:\n  side: 4\ndynamics:\n  increment: 0.0\nschedule:\n  spacing:\n    kind: power_law\n    points: 5\n  max_time: 1000000\n";
    for seed in 1_u64..40 {
        let mut sim = Simulation::new(config(yaml), seed).unwrap();
        let mut sink = MemorySink::default();
        let summary = sim.run(&mut sink).unwrap();

        assert_eq!(summary.end_reason, EndReason::Absorbed, "seed {seed}");
        assert_eq!(summary.records, sim.schedule().len(), "seed {seed}");
        let scheduled: Vec<f64> = sim.schedule().points().iter().map(|&p| p as f64).collect();
        let times: Vec<f64> = sink.records().map(|r| r.time).collect();
        assert_eq!(times, scheduled, "seed {seed}");
        assert!(summary.final_time < 1_000_000.0);

        let last = sink.records().last().unwrap();
        assert_eq!(last.cluster_count, 1);
        assert_eq!(last.largest_size, 16);
    }
}

#[test]
fn domain_catalog_covers_every_agent() {
    let yaml = "lattice:\n  side: 10\n  occupancy:\n    kind: diluted\n    density: 0.9\nclusters:\n  domain_statistics: true\nschedule:\n  max_time: 30\n";
    let mut sim = Simulation::new(config(yaml), 21).unwrap();
    let population = sim.state().population();
    let mut sink = MemorySink::default();
    sim.run(&mut sink).unwrap();

    for m in sink.measurements.iter().filter(|m| m.domains.is_some()) {
        let catalog = m.domains.as_ref().unwrap();
        let covered: usize = catalog.domains.iter().map(|d| d.size).sum();
        assert_eq!(covered, population);
        assert_eq!(catalog.domains.len(), m.record.cluster_count);
    }
}

#[test]
fn non_binary_persistence_counts_surviving_opinions() {
    let yaml = "lattice:\n  side: 6\n  opinions: non_binary\ndynamics:\n  increment: 0.0\nschedule:\n  max_time: 100\n";
    let mut sim = Simulation::new(config(yaml), 5).unwrap();
    let mut sink = MemorySink::default();
    sim.run(&mut sink).unwrap();

    let persistence: Vec<f64> = sink.records().map(|r| r.persistence).collect();
    assert_eq!(persistence[0], 1.0);
    assert!(persistence.windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn column_output_has_one_row_per_record() {
    let yaml = "lattice:\n  side: 8\nschedule:\n  max_time: 50\n";
    let mut sim = Simulation::new(config(yaml), 13).unwrap();
    let header = sim.header();
    let mut buffer = Vec::new();
    let records = {
        let mut sink = ColumnSink::new(&header, &mut buffer).unwrap();
        let summary = sim.run(&mut sink).unwrap();
        sink.finish().unwrap();
        summary.records
    };

    let text = String::from_utf8(buffer).unwrap();
    assert!(text.starts_with("# LAD Voter Model 2D Main Output\n# Seed: 13\n"));
    let rows: Vec<&str> = text
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
    assert_eq!(rows.len(), records);
    assert!(rows.iter().all(|r| r.split_whitespace().count() == 9));
    assert!(rows[0].starts_with("0 1.00000000 "));
}
