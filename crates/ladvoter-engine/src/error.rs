//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of output preparation and the
//! run itself, so `main` can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ladvoter_core::config::ConfigError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: ladvoter_core::error::RunnerError,
    },

    /// An output sink could not be set up.
    #[error("sink error: {source}")]
    Sink {
        /// The underlying sink error.
        #[from]
        source: ladvoter_core::error::SinkError,
    },

    /// An output file or directory could not be created.
    #[error("cannot create {}: {source}", path.display())]
    Output {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// No free output name was found before the seed overflowed.
    #[error("no free output name for {root}")]
    SeedExhausted {
        /// Root of the file names.
        root: String,
    },
}
