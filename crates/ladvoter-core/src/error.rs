//! Error types for the run driver and its output sinks.

use ladvoter_cluster::ClusterError;
use ladvoter_lattice::LatticeError;

use crate::config::ConfigError;

/// Errors raised while writing measurements.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing to an output stream failed.
    #[error("output write failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Encoding a record as JSON failed.
    #[error("JSON encoding failed: {source}")]
    Json {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Errors that can occur during a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The configuration is unusable.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The initial lattice could not be built.
    #[error("lattice error: {source}")]
    Lattice {
        /// The underlying lattice error.
        #[from]
        source: LatticeError,
    },

    /// Cluster analysis failed during a measurement.
    #[error("cluster analysis error: {source}")]
    Cluster {
        /// The underlying cluster error.
        #[from]
        source: ClusterError,
    },

    /// A measurement could not be written.
    #[error("sink error: {source}")]
    Sink {
        /// The underlying sink error.
        #[from]
        source: SinkError,
    },
}
