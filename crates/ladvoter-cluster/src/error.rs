//! Error types for the `ladvoter-cluster` crate.

/// Errors raised by the cluster engine.
///
/// Labeling itself cannot fail; only the hull walk has preconditions that
/// a malformed input can violate.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// The hull walk could not trace the outer boundary of a cluster.
    #[error("degenerate hull for cluster rooted at site {root}: {reason}")]
    DegenerateHull {
        /// Root of the cluster being traced.
        root: usize,
        /// What went wrong.
        reason: String,
    },

    /// A root passed in does not label any occupied cluster.
    #[error("site {0} is not the root of a cluster")]
    NotARoot(usize),
}
