//! Output file naming and sink construction.
//!
//! Files are named `<root>_sd<seed>_<k>.<ext>`. The root encodes the model
//! variant so runs of different variants can share a directory; the seed
//! keeps repeated runs of one variant apart. If the main file of a seed
//! already exists, the seed is advanced by two (staying odd for clock
//! seeds) until a free name is found.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use ladvoter_core::config::{OutputFormat, SimulationConfig};
use ladvoter_core::sink::{ColumnSink, JsonLinesSink, MeasurementSink, RunHeader};
use ladvoter_types::{OccupancyModel, OpinionMode, ResetPolicy};
use tracing::warn;

use crate::error::EngineError;

/// Root of the output file names for `config`.
///
/// For example `binarytrans-ALPHA1.0-L128-DETA0.01000` for the default
/// binary, reversible, decrement-reset model.
pub fn root_name(config: &SimulationConfig) -> String {
    let dynamics = &config.dynamics;
    let opinions = match config.lattice.opinions {
        OpinionMode::Binary => "binary",
        OpinionMode::NonBinary => "nonbinary",
    };
    let reversibility = if dynamics.irreversible { "intrans" } else { "trans" };
    let alpha = dynamics.acceptance.alpha();
    let side = config.lattice.side;
    let increment = dynamics.increment;

    let mut root = format!("{opinions}{reversibility}-ALPHA{alpha:.1}-L{side}-");
    match dynamics.reset_policy {
        ResetPolicy::Decrement => root.push_str(&format!("DETA{increment:.5}")),
        ResetPolicy::FullReset => root.push_str(&format!("FULLRESET-DETA-{increment:.5}")),
        ResetPolicy::GammaReset { gamma } => {
            root.push_str(&format!("GAMMA{gamma:.1}-DETA-{increment:.5}"));
        }
    }
    if let OccupancyModel::Diluted { density } = config.lattice.occupancy {
        root.push_str(&format!("-RHO{density:.2}"));
    }
    if let Some(mobility) = dynamics.mobility {
        root.push_str(&format!("-MOB{mobility:.2}"));
    }
    root
}

/// Paths of the output files of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    stem: PathBuf,
    extension: &'static str,
    /// Seed encoded in the names; may differ from the requested seed.
    pub seed: u64,
}

impl OutputPaths {
    fn new(directory: &Path, root: &str, seed: u64, format: OutputFormat) -> Self {
        let extension = match format {
            OutputFormat::Columns => "dsf",
            OutputFormat::JsonLines => "jsonl",
        };
        Self {
            stem: directory.join(format!("{root}_sd{seed}")),
            extension,
            seed,
        }
    }

    /// Path of output stream `k` (`1` main, `2` catalog, `3` and `4`
    /// histograms).
    pub fn stream(&self, k: u8) -> PathBuf {
        let mut name = self.stem.clone().into_os_string();
        name.push(format!("_{k}.{}", self.extension));
        PathBuf::from(name)
    }

    /// Path of the main time series.
    pub fn main(&self) -> PathBuf {
        self.stream(1)
    }
}

/// Pick free output names in `directory`, advancing `seed` by two while
/// the main file already exists.
///
/// # Errors
///
/// Returns [`EngineError::SeedExhausted`] if the seed would overflow.
pub fn claim(
    directory: &Path,
    root: &str,
    seed: u64,
    format: OutputFormat,
) -> Result<OutputPaths, EngineError> {
    let mut paths = OutputPaths::new(directory, root, seed, format);
    while paths.main().exists() {
        let Some(next) = paths.seed.checked_add(2) else {
            return Err(EngineError::SeedExhausted {
                root: root.to_owned(),
            });
        };
        warn!(
            taken = %paths.main().display(),
            seed = next,
            "Output name in use, advancing seed"
        );
        paths = OutputPaths::new(directory, root, next, format);
    }
    Ok(paths)
}

fn create(path: PathBuf) -> Result<BufWriter<File>, EngineError> {
    match File::create(&path) {
        Ok(file) => Ok(BufWriter::new(file)),
        Err(source) => Err(EngineError::Output { path, source }),
    }
}

/// Open the sink writing the streams of `config` to `paths`.
///
/// # Errors
///
/// Returns [`EngineError::Output`] if a file cannot be created and
/// [`EngineError::Sink`] if a header cannot be written.
pub fn open_sink(
    config: &SimulationConfig,
    paths: &OutputPaths,
    header: &RunHeader,
) -> Result<Box<dyn MeasurementSink>, EngineError> {
    let domains = config.clusters.domain_statistics;
    match config.output.format {
        OutputFormat::Columns => {
            let mut sink = ColumnSink::new(header, create(paths.main())?)?;
            if domains {
                sink = sink.with_domains(
                    header,
                    create(paths.stream(2))?,
                    create(paths.stream(3))?,
                    create(paths.stream(4))?,
                )?;
            }
            Ok(Box::new(sink))
        }
        OutputFormat::JsonLines => {
            let catalog = if domains {
                Some(create(paths.stream(2))?)
            } else {
                None
            };
            Ok(Box::new(JsonLinesSink::new(
                header,
                create(paths.main())?,
                catalog,
            )?))
        }
    }
}
