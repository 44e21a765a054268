//! Command-line driver for the LAD voter simulation.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument,
//!    `LADVOTER_CONFIG`, or `ladvoter-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Resolve the seed and claim free output file names
//! 4. Build the initial lattice
//! 5. Open the output streams and run until absorption or the end of the
//!    schedule
//! 6. Log the result

mod error;
mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use ladvoter_core::config::{LoggingConfig, SimulationConfig};
use ladvoter_core::runner::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "LADVOTER_CONFIG";

/// Configuration file read when no path is given.
const DEFAULT_CONFIG: &str = "ladvoter-config.yaml";

fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        path = %config_path.display(),
        side = config.lattice.side,
        opinions = ?config.lattice.opinions,
        increment = config.dynamics.increment,
        update_mode = ?config.dynamics.update_mode,
        max_time = config.schedule.max_time,
        "Configuration loaded"
    );
    config.validate().map_err(EngineError::from)?;

    // 3. Seed and output names.
    let directory = &config.output.directory;
    std::fs::create_dir_all(directory).map_err(|source| EngineError::Output {
        path: directory.clone(),
        source,
    })?;
    let root = output::root_name(&config);
    let paths = output::claim(directory, &root, config.resolve_seed(), config.output.format)?;
    info!(
        root = root,
        seed = paths.seed,
        main = %paths.main().display(),
        "Output files claimed"
    );

    // 4. Initial lattice.
    let domain_statistics = config.clusters.domain_statistics;
    let mut simulation = Simulation::new(config.clone(), paths.seed).map_err(EngineError::from)?;
    info!(
        agents = simulation.state().population(),
        domain_statistics = domain_statistics,
        "Lattice initialized"
    );

    // 5. Run.
    let mut sink = output::open_sink(&config, &paths, &simulation.header())?;
    let summary = simulation.run(sink.as_mut()).map_err(EngineError::from)?;

    // 6. Result.
    info!(
        end_reason = ?summary.end_reason,
        final_time = summary.final_time,
        records = summary.records,
        seed = summary.seed,
        "ladvoter-engine finished"
    );
    Ok(())
}

fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_ENV))
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from)
}

/// Load configuration from `path`, falling back to defaults (plus the
/// environment overrides) when the file does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
