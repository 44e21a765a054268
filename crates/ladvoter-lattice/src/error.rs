//! Error types for the `ladvoter-lattice` crate.
//!
//! All fallible operations in this crate return [`LatticeError`]. These
//! are configuration or construction errors; the dynamics themselves
//! cannot fail once a state is built.

use ladvoter_types::Spin;

/// Errors that can occur while building a lattice or its state.
#[derive(Debug, thiserror::Error)]
pub enum LatticeError {
    /// The linear size is too small for a periodic square lattice.
    #[error("lattice side must be at least 2, got {0}")]
    InvalidSide(usize),

    /// `side * side` does not fit the site index or opinion id range.
    #[error("lattice side {0} is too large")]
    SideTooLarge(usize),

    /// The occupation density lies outside `(0, 1]`.
    #[error("occupation density must lie in (0, 1], got {0}")]
    InvalidDensity(f64),

    /// A supplied spin vector does not have one entry per site.
    #[error("expected {expected} spins, got {actual}")]
    SpinCountMismatch {
        /// Number of lattice sites.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },

    /// A supplied spin is not valid for the opinion mode.
    #[error("spin {spin} at site {site} is not valid for this opinion mode")]
    InvalidSpin {
        /// The offending site.
        site: usize,
        /// The offending value.
        spin: Spin,
    },
}
