//! Enumeration types selecting a model variant at run time.
//!
//! Each enum replaces one family of compile-time switches of the classic
//! LAD voter programs: the opinion space, the conviction reset rule, the
//! acceptance rule, dilution, and the update scheme.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Opinion space
// ---------------------------------------------------------------------------

/// The opinion space of the lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpinionMode {
    /// Two opinions, `+1` and `-1`, drawn uniformly at start.
    #[default]
    Binary,
    /// Every site starts with its own distinct opinion.
    NonBinary,
}

// ---------------------------------------------------------------------------
// Conviction reset
// ---------------------------------------------------------------------------

/// How a site's conviction changes after it is persuaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Subtract the increment from the conviction.
    #[default]
    Decrement,
    /// Drop the conviction to zero.
    FullReset,
    /// Divide the conviction by `gamma` (`gamma > 1`).
    GammaReset {
        /// The rescale divisor.
        #[serde(default = "default_gamma")]
        gamma: f64,
    },
}

/// Divisor used by [`ResetPolicy::GammaReset`] when none is given.
pub const DEFAULT_GAMMA: f64 = 1.05;

const fn default_gamma() -> f64 {
    DEFAULT_GAMMA
}

impl ResetPolicy {
    /// Apply the policy to a conviction value.
    pub fn apply(self, certainty: f64, increment: f64) -> f64 {
        match self {
            Self::Decrement => certainty - increment,
            Self::FullReset => 0.0,
            Self::GammaReset { gamma } => certainty / gamma,
        }
    }

    /// Short tag used in output headers and file names.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Decrement => "DECREMENT",
            Self::FullReset => "FULLRESET",
            Self::GammaReset { .. } => "GAMMA",
        }
    }

    /// Numeric code matching the historical output headers
    /// (`0` decrement, `1` full reset, `2` gamma reset).
    pub const fn code(self) -> u8 {
        match self {
            Self::Decrement => 0,
            Self::FullReset => 1,
            Self::GammaReset { .. } => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Acceptance
// ---------------------------------------------------------------------------

/// Rule deciding whether a disagreeing encounter persuades the site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcceptanceMode {
    /// `alpha = beta = 1` with no random draws: a non-zealot always adopts.
    #[default]
    Simplified,
    /// General tug-of-war rule with two acceptance probabilities.
    Probabilistic {
        /// Probability that a non-zealot adopts the neighbor's opinion.
        alpha: f64,
        /// Probability that a zealot site takes the persuaded-side
        /// conviction update instead of the reinforcing one.
        beta: f64,
    },
}

impl AcceptanceMode {
    /// The `alpha` value in effect (`1.0` for the simplified rule).
    pub const fn alpha(self) -> f64 {
        match self {
            Self::Simplified => 1.0,
            Self::Probabilistic { alpha, .. } => alpha,
        }
    }
}

// ---------------------------------------------------------------------------
// Occupancy
// ---------------------------------------------------------------------------

/// Whether every site holds an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccupancyModel {
    /// Every site is occupied.
    #[default]
    Full,
    /// Each site is occupied independently with probability `density`.
    Diluted {
        /// Occupation probability in `(0, 1]`.
        density: f64,
    },
}

// ---------------------------------------------------------------------------
// Update scheme
// ---------------------------------------------------------------------------

/// How elementary updates are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// `N` random-site updates per Monte Carlo step.
    #[default]
    Sweep,
    /// Updates drawn from the active-site list, advancing continuous time
    /// by `1 / |active|` per update.
    EventDriven,
}

// ---------------------------------------------------------------------------
// Percolation
// ---------------------------------------------------------------------------

/// How far a cluster extends across the periodic lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercolationClass {
    /// Touches neither every row nor every column.
    #[default]
    None,
    /// Touches every row or every column, not both.
    Spanning,
    /// Touches every row and every column.
    Percolating,
}

impl PercolationClass {
    /// Build the class from the two axis tests.
    pub const fn from_axes(every_column: bool, every_row: bool) -> Self {
        match (every_column, every_row) {
            (true, true) => Self::Percolating,
            (true, false) | (false, true) => Self::Spanning,
            (false, false) => Self::None,
        }
    }

    /// Numeric code used in the column output (`0`, `1`, `2`).
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Spanning => 1,
            Self::Percolating => 2,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reset_policies_follow_their_rule() {
        assert!((ResetPolicy::Decrement.apply(0.5, 0.1) - 0.4).abs() < 1e-12);
        assert_eq!(ResetPolicy::FullReset.apply(0.5, 0.1), 0.0);
        let gamma = ResetPolicy::GammaReset { gamma: 2.0 };
        assert!((gamma.apply(0.5, 0.1) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn percolation_class_from_axes() {
        assert_eq!(PercolationClass::from_axes(false, false), PercolationClass::None);
        assert_eq!(PercolationClass::from_axes(true, false), PercolationClass::Spanning);
        assert_eq!(PercolationClass::from_axes(false, true), PercolationClass::Spanning);
        assert_eq!(PercolationClass::from_axes(true, true), PercolationClass::Percolating);
        assert_eq!(PercolationClass::Percolating.code(), 2);
    }

    #[test]
    fn reset_policy_deserializes_from_tagged_json() {
        let policy: ResetPolicy =
            serde_json::from_str(r#"{"kind":"gamma_reset","gamma":1.05}"#).unwrap();
        assert_eq!(policy, ResetPolicy::GammaReset { gamma: 1.05 });

        let policy: ResetPolicy = serde_json::from_str(r#"{"kind":"full_reset"}"#).unwrap();
        assert_eq!(policy, ResetPolicy::FullReset);

        let policy: ResetPolicy = serde_json::from_str(r#"{"kind":"gamma_reset"}"#).unwrap();
        assert_eq!(policy, ResetPolicy::GammaReset { gamma: DEFAULT_GAMMA });
    }

    #[test]
    fn simplified_acceptance_has_unit_alpha() {
        assert_eq!(AcceptanceMode::Simplified.alpha(), 1.0);
        let general = AcceptanceMode::Probabilistic { alpha: 0.3, beta: 0.7 };
        assert_eq!(general.alpha(), 0.3);
    }
}
