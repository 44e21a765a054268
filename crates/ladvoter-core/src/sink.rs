//! Measurement sinks.
//!
//! The runner hands every [`Measurement`] to a [`MeasurementSink`]. Two
//! file formats are provided:
//!
//! - [`ColumnSink`] writes whitespace-separated columns with `#` header
//!   lines: the main time series, and optionally the domain catalog and the
//!   two domain histograms (non-zealot "rough" domains and zealot "smooth"
//!   domains) as blank-line separated blocks.
//! - [`JsonLinesSink`] writes one JSON object per measurement.
//!
//! [`MemorySink`] and [`NullSink`] serve tests and dry runs.

use std::io::Write;

use ladvoter_cluster::DomainCatalog;
use ladvoter_types::{
    DomainRecord, MeasurementRecord, OccupancyModel, OpinionMode, ResetPolicy, UpdateMode,
};
use serde::Serialize;

use crate::config::SimulationConfig;
use crate::error::SinkError;
use crate::observer::Measurement;

/// Receiver of the measurements of one run.
pub trait MeasurementSink {
    /// Record one measurement.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the measurement cannot be stored.
    fn write(&mut self, measurement: &Measurement) -> Result<(), SinkError>;

    /// Called once after the last measurement.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if buffered output cannot be flushed.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A sink that discards everything.
pub struct NullSink;

impl MeasurementSink for NullSink {
    fn write(&mut self, _measurement: &Measurement) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A sink that keeps every measurement in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Measurements in arrival order.
    pub measurements: Vec<Measurement>,
    /// Whether [`MeasurementSink::finish`] was called.
    pub finished: bool,
}

impl MemorySink {
    /// Main records in arrival order.
    pub fn records(&self) -> impl Iterator<Item = &MeasurementRecord> {
        self.measurements.iter().map(|m| &m.record)
    }
}

impl MeasurementSink for MemorySink {
    fn write(&mut self, measurement: &Measurement) -> Result<(), SinkError> {
        self.measurements.push(measurement.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run header
// ---------------------------------------------------------------------------

/// Parameters identifying a run, written at the top of every output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunHeader {
    /// Seed actually used.
    pub seed: u64,
    /// Linear size `L`.
    pub side: usize,
    /// Zealots never lose their flag.
    pub irreversible: bool,
    /// Conviction increment.
    pub increment: f64,
    /// Opinion space.
    pub opinions: OpinionMode,
    /// Conviction reset rule.
    pub reset: ResetPolicy,
    /// Scheduling scheme.
    pub update_mode: UpdateMode,
    /// Number of agents on a diluted lattice.
    pub agents: Option<usize>,
}

impl RunHeader {
    /// Header for a run of `config` with `seed` and `population` agents.
    pub fn new(config: &SimulationConfig, seed: u64, population: usize) -> Self {
        let agents = match config.lattice.occupancy {
            OccupancyModel::Full => None,
            OccupancyModel::Diluted { .. } => Some(population),
        };
        Self {
            seed,
            side: config.lattice.side,
            irreversible: config.dynamics.irreversible,
            increment: config.dynamics.increment,
            opinions: config.lattice.opinions,
            reset: config.dynamics.reset_policy,
            update_mode: config.dynamics.update_mode,
            agents,
        }
    }

    fn write_lines(&self, out: &mut impl Write, title: &str) -> std::io::Result<()> {
        writeln!(out, "# LAD Voter Model 2D {title}")?;
        writeln!(out, "# Seed: {}", self.seed)?;
        writeln!(out, "# Linear size: {}", self.side)?;
        writeln!(out, "# Irreversible: {}", u8::from(self.irreversible))?;
        writeln!(out, "# Increment: {:.6}", self.increment)?;
        writeln!(out, "# Binary: {}", u8::from(self.opinions == OpinionMode::Binary))?;
        writeln!(out, "# Reset (1 Full, 2 Gamma reset): {}", self.reset.code())?;
        if let ResetPolicy::GammaReset { gamma } = self.reset {
            writeln!(out, "# Gamma: {gamma:.6}")?;
        }
        if let Some(agents) = self.agents {
            writeln!(out, "# Agents: {agents}")?;
        }
        Ok(())
    }

    const fn event_driven(&self) -> bool {
        matches!(self.update_mode, UpdateMode::EventDriven)
    }
}

// ---------------------------------------------------------------------------
// Column format
// ---------------------------------------------------------------------------

/// Writers for the per-domain outputs.
struct DomainWriters<W> {
    catalog: W,
    rough: W,
    smooth: W,
}

/// Whitespace-separated column output.
pub struct ColumnSink<W: Write> {
    main: W,
    domains: Option<DomainWriters<W>>,
    event_driven: bool,
}

impl<W: Write> ColumnSink<W> {
    /// Sink writing the main time series to `main`. The header is written
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the header cannot be written.
    pub fn new(header: &RunHeader, mut main: W) -> Result<Self, SinkError> {
        header.write_lines(&mut main, "Main Output")?;
        let mut columns =
            String::from("# Time Persistence Zealots Active Clusters Big1 Perc1 Big2 Perc2");
        if header.event_driven() {
            columns.push_str(" NActive");
        }
        writeln!(main, "{columns}")?;
        writeln!(main, "\n")?;
        main.flush()?;
        Ok(Self {
            main,
            domains: None,
            event_driven: header.event_driven(),
        })
    }

    /// Also write the domain catalog and the non-zealot and zealot
    /// histograms.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if a header cannot be written.
    pub fn with_domains(
        mut self,
        header: &RunHeader,
        mut catalog: W,
        mut rough: W,
        mut smooth: W,
    ) -> Result<Self, SinkError> {
        for (out, title) in [
            (&mut catalog, "Domain Catalog"),
            (&mut rough, "Rough Domains"),
            (&mut smooth, "Smooth Domains"),
        ] {
            header.write_lines(out, title)?;
            writeln!(out, "\n")?;
            out.flush()?;
        }
        self.domains = Some(DomainWriters {
            catalog,
            rough,
            smooth,
        });
        Ok(self)
    }

    fn write_main(&mut self, record: &MeasurementRecord) -> std::io::Result<()> {
        let out = &mut self.main;
        if self.event_driven {
            write!(out, "{:.8}", record.time)?;
        } else {
            write!(out, "{:.0}", record.time)?;
        }
        write!(
            out,
            " {:.8} {:.8} {:.8} {:.8} {:.8} {} {:.8} {}",
            record.persistence,
            record.zealot_fraction,
            record.active_density,
            record.cluster_density(),
            record.largest_fraction(),
            record.largest_percolation.code(),
            record.second_fraction(),
            record.second_percolation.code(),
        )?;
        if let Some(active) = record.active_sites {
            write!(out, " {active}")?;
        }
        writeln!(out)
    }
}

/// Per-measurement block header shared by the domain outputs.
fn write_block_header(out: &mut impl Write, record: &MeasurementRecord) -> std::io::Result<()> {
    writeln!(out, "# Time: {}", record.time)?;
    writeln!(out, "# Persistence: {:.8}", record.persistence)?;
    writeln!(out, "# Zealot fraction: {:.8}", record.zealot_fraction)?;
    writeln!(out, "# Density of active interfaces: {:.8}", record.active_density)?;
    writeln!(out, "# Total number of clusters: {:.8}", record.cluster_density())?;
    writeln!(out, "# Biggest cluster size: {}", record.largest_size)?;
    writeln!(out, "# Percolation 1: {}", record.largest_percolation.code())?;
    writeln!(out, "# Sec. biggest cluster size: {}", record.second_size)?;
    writeln!(out, "# Percolation 2: {}", record.second_percolation.code())
}

fn write_catalog(
    out: &mut impl Write,
    record: &MeasurementRecord,
    domains: &[DomainRecord],
) -> std::io::Result<()> {
    write_block_header(out, record)?;
    writeln!(out, "# Index Size Perc Hull Area Smooth")?;
    for (index, d) in domains.iter().enumerate() {
        writeln!(
            out,
            "{index} {} {} {} {} {}",
            d.size,
            d.percolation.code(),
            d.hull_perimeter,
            d.hull_area,
            u8::from(d.zealot)
        )?;
    }
    writeln!(out, "\n")?;
    out.flush()
}

fn write_histogram(
    out: &mut impl Write,
    record: &MeasurementRecord,
    catalog: &DomainCatalog,
    zealot: bool,
) -> std::io::Result<()> {
    write_block_header(out, record)?;
    writeln!(out, "# Size Clusters Hulls Areas Perc0 Perc1 Perc2")?;
    for (key, row) in catalog.histograms.rows(zealot) {
        let [p0, p1, p2] = row.by_percolation;
        writeln!(
            out,
            "{key} {} {} {} {p0} {p1} {p2}",
            row.clusters, row.hulls, row.areas
        )?;
    }
    writeln!(out, "\n")?;
    out.flush()
}

impl<W: Write> MeasurementSink for ColumnSink<W> {
    fn write(&mut self, measurement: &Measurement) -> Result<(), SinkError> {
        self.write_main(&measurement.record)?;
        if let (Some(writers), Some(catalog)) =
            (self.domains.as_mut(), measurement.domains.as_ref())
        {
            let record = &measurement.record;
            write_catalog(&mut writers.catalog, record, &catalog.domains)?;
            write_histogram(&mut writers.rough, record, catalog, false)?;
            write_histogram(&mut writers.smooth, record, catalog, true)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.main.flush()?;
        if let Some(writers) = self.domains.as_mut() {
            writers.catalog.flush()?;
            writers.rough.flush()?;
            writers.smooth.flush()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON lines
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DomainLine<'a> {
    time: f64,
    domains: &'a [DomainRecord],
}

/// One JSON object per line. The first line of each stream carries the
/// run header.
pub struct JsonLinesSink<W: Write> {
    records: W,
    domains: Option<W>,
}

impl<W: Write> JsonLinesSink<W> {
    /// Sink writing main records to `records` and, if given, the domain
    /// catalog to `domains`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the header line cannot be written.
    pub fn new(
        header: &RunHeader,
        mut records: W,
        mut domains: Option<W>,
    ) -> Result<Self, SinkError> {
        write_json_line(&mut records, header)?;
        if let Some(out) = domains.as_mut() {
            write_json_line(out, header)?;
        }
        Ok(Self { records, domains })
    }
}

fn write_json_line<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), SinkError> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

impl<W: Write> MeasurementSink for JsonLinesSink<W> {
    fn write(&mut self, measurement: &Measurement) -> Result<(), SinkError> {
        write_json_line(&mut self.records, &measurement.record)?;
        if let (Some(out), Some(catalog)) =
            (self.domains.as_mut(), measurement.domains.as_ref())
        {
            let line = DomainLine {
                time: measurement.record.time,
                domains: &catalog.domains,
            };
            write_json_line(out, &line)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.records.flush()?;
        if let Some(out) = self.domains.as_mut() {
            out.flush()?;
        }
        Ok(())
    }
}
