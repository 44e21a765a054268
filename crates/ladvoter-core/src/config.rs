//! Configuration loading and typed config structures for the LAD voter
//! simulation.
//!
//! A run is described by `ladvoter-config.yaml`. Every section and field
//! is optional; missing values take the defaults below, which reproduce the
//! classic binary, reversible, decrement-reset model on a `128 x 128`
//! lattice with `Δ = 0.01`.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ladvoter_cluster::Connectivity;
use ladvoter_lattice::UpdateRules;
use ladvoter_types::{AcceptanceMode, OccupancyModel, OpinionMode, ResetPolicy, UpdateMode};
use serde::Deserialize;
use tracing::warn;

use crate::schedule::ScheduleKind;

/// Environment variable overriding `run.seed`.
pub const SEED_ENV: &str = "LADVOTER_SEED";

/// Environment variable overriding `output.directory`.
pub const OUTPUT_DIR_ENV: &str = "LADVOTER_OUTPUT_DIR";

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is outside its allowed range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Lattice geometry and initial occupation.
    #[serde(default)]
    pub lattice: LatticeConfig,

    /// Update rule parameters.
    #[serde(default)]
    pub dynamics: DynamicsConfig,

    /// Cluster analysis options.
    #[serde(default)]
    pub clusters: ClusterConfig,

    /// Measurement time points.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Run identity.
    #[serde(default)]
    pub run: RunConfig,

    /// Output location and format.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `LADVOTER_SEED` overrides `run.seed`
    /// - `LADVOTER_OUTPUT_DIR` overrides `output.directory`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment override is
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply the `LADVOTER_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV) {
            match val.trim().parse::<u64>() {
                Ok(seed) => self.run.seed = Some(seed),
                Err(err) => warn!(value = %val, error = %err, "Ignoring unparsable {SEED_ENV}"),
            }
        }
        if let Ok(val) = std::env::var(OUTPUT_DIR_ENV) {
            self.output.directory = PathBuf::from(val);
        }
    }

    /// Reject configurations that cannot describe a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let side = self.lattice.side;
        if side < 2 {
            return Err(invalid("lattice.side", format!("must be at least 2, got {side}")));
        }
        if side
            .checked_mul(side)
            .is_none_or(|n| i32::try_from(n).is_err())
        {
            return Err(invalid("lattice.side", format!("{side} is too large")));
        }
        if let OccupancyModel::Diluted { density } = self.lattice.occupancy {
            if !(density > 0.0 && density <= 1.0) {
                return Err(invalid(
                    "lattice.occupancy.density",
                    format!("must lie in (0, 1], got {density}"),
                ));
            }
        }

        let dynamics = &self.dynamics;
        if !dynamics.increment.is_finite() || dynamics.increment < 0.0 {
            return Err(invalid(
                "dynamics.increment",
                format!("must be finite and non-negative, got {}", dynamics.increment),
            ));
        }
        if !dynamics.threshold.is_finite() || dynamics.threshold <= 0.0 {
            return Err(invalid(
                "dynamics.threshold",
                format!("must be finite and positive, got {}", dynamics.threshold),
            ));
        }
        if let ResetPolicy::GammaReset { gamma } = dynamics.reset_policy {
            if !gamma.is_finite() || gamma <= 1.0 {
                return Err(invalid(
                    "dynamics.reset_policy.gamma",
                    format!("must be greater than 1, got {gamma}"),
                ));
            }
        }
        if let AcceptanceMode::Probabilistic { alpha, beta } = dynamics.acceptance {
            check_probability("dynamics.acceptance.alpha", alpha)?;
            check_probability("dynamics.acceptance.beta", beta)?;
        }
        if let Some(mobility) = dynamics.mobility {
            check_probability("dynamics.mobility", mobility)?;
        }

        if let ScheduleKind::PowerLaw { points } = self.schedule.spacing {
            if points < 2 {
                return Err(invalid(
                    "schedule.spacing.points",
                    format!("need at least 2 points, got {points}"),
                ));
            }
        }
        if self.schedule.max_time == 0 {
            return Err(invalid("schedule.max_time", "must be positive".to_owned()));
        }
        Ok(())
    }

    /// Seed for this run: `run.seed` if set, otherwise the current Unix
    /// time forced odd.
    pub fn resolve_seed(&self) -> u64 {
        self.run.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(1, |elapsed| elapsed.as_secs() | 1)
        })
    }

    /// Update rule parameters.
    pub const fn update_rules(&self) -> UpdateRules {
        UpdateRules {
            increment: self.dynamics.increment,
            threshold: self.dynamics.threshold,
            reset: self.dynamics.reset_policy,
            irreversible: self.dynamics.irreversible,
            acceptance: self.dynamics.acceptance,
            mobility: self.dynamics.mobility,
        }
    }

    /// Cluster connectivity: zealot-aware unless disabled, and by default
    /// only when convictions can grow.
    pub fn connectivity(&self) -> Connectivity {
        let zealot_aware = self
            .clusters
            .zealot_aware
            .unwrap_or(self.dynamics.increment > 0.0);
        if zealot_aware {
            Connectivity::OpinionAndZealotry
        } else {
            Connectivity::Opinion
        }
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn check_probability(field: &'static str, p: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(invalid(field, format!("must lie in [0, 1], got {p}")))
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Lattice geometry and initial occupation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatticeConfig {
    /// Linear size `L`.
    #[serde(default = "default_side")]
    pub side: usize,

    /// Opinion space.
    #[serde(default)]
    pub opinions: OpinionMode,

    /// Full or diluted occupation.
    #[serde(default)]
    pub occupancy: OccupancyModel,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            side: default_side(),
            opinions: OpinionMode::default(),
            occupancy: OccupancyModel::default(),
        }
    }
}

/// Update rule parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DynamicsConfig {
    /// Conviction increment `Δ`; `0` gives the pure voter model.
    #[serde(default = "default_increment")]
    pub increment: f64,

    /// Conviction at which a site becomes a zealot.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Conviction change of a persuaded site.
    #[serde(default)]
    pub reset_policy: ResetPolicy,

    /// Zealots never lose their flag.
    #[serde(default)]
    pub irreversible: bool,

    /// Acceptance rule for disagreeing encounters.
    #[serde(default)]
    pub acceptance: AcceptanceMode,

    /// Probability of a move into a vacant neighbor after each update.
    #[serde(default)]
    pub mobility: Option<f64>,

    /// Sweep or event-driven scheduling.
    #[serde(default)]
    pub update_mode: UpdateMode,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            increment: default_increment(),
            threshold: default_threshold(),
            reset_policy: ResetPolicy::default(),
            irreversible: false,
            acceptance: AcceptanceMode::default(),
            mobility: None,
            update_mode: UpdateMode::default(),
        }
    }
}

/// Cluster analysis options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClusterConfig {
    /// Split clusters by zealot flag. Defaults to `increment > 0`.
    #[serde(default)]
    pub zealot_aware: Option<bool>,

    /// Produce the per-domain catalog and histograms at every measurement.
    #[serde(default)]
    pub domain_statistics: bool,
}

/// Measurement time points.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Spacing of the time points.
    #[serde(default)]
    pub spacing: ScheduleKind,

    /// Time budget in Monte Carlo steps.
    #[serde(default = "default_max_time")]
    pub max_time: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            spacing: ScheduleKind::default(),
            max_time: default_max_time(),
        }
    }
}

/// Run identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Random seed. When absent, the wall clock picks an odd one.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Output stream format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Whitespace-separated columns with `#` headers.
    #[default]
    Columns,
    /// One JSON object per line.
    JsonLines,
}

/// Output location and format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the output files.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Stream format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG` is
    /// unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_side() -> usize {
    128
}

const fn default_increment() -> f64 {
    0.01
}

const fn default_threshold() -> f64 {
    1.0
}

const fn default_max_time() -> u64 {
    100_000
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.lattice.side, 128);
        assert_eq!(config.dynamics.increment, 0.01);
        assert_eq!(config.schedule.max_time, 100_000);
        assert_eq!(config.connectivity(), Connectivity::OpinionAndZealotry);
        config.validate().unwrap();
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = SimulationConfig::parse(include_str!("../../../ladvoter-config.yaml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
lattice:
  side: 64
  opinions: non_binary
  occupancy:
    kind: diluted
    density: 0.8
dynamics:
  increment: 0.005
  threshold: 2.0
  reset_policy:
    kind: gamma_reset
    gamma: 1.2
  irreversible: true
  acceptance:
    kind: probabilistic
    alpha: 0.5
    beta: 0.25
  mobility: 0.1
  update_mode: event_driven
clusters:
  zealot_aware: false
  domain_statistics: true
schedule:
  spacing:
    kind: power_law
    points: 30
  max_time: 5000
run:
  seed: 1111111111
output:
  directory: /tmp/runs
  format: json_lines
logging:
  level: debug
  json: true
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.lattice.side, 64);
        assert_eq!(config.lattice.opinions, OpinionMode::NonBinary);
        assert_eq!(config.lattice.occupancy, OccupancyModel::Diluted { density: 0.8 });
        assert_eq!(config.dynamics.reset_policy, ResetPolicy::GammaReset { gamma: 1.2 });
        assert!(config.dynamics.irreversible);
        assert_eq!(
            config.dynamics.acceptance,
            AcceptanceMode::Probabilistic { alpha: 0.5, beta: 0.25 }
        );
        assert_eq!(config.dynamics.mobility, Some(0.1));
        assert_eq!(config.dynamics.update_mode, UpdateMode::EventDriven);
        assert_eq!(config.connectivity(), Connectivity::Opinion);
        assert!(config.clusters.domain_statistics);
        assert_eq!(config.schedule.spacing, ScheduleKind::PowerLaw { points: 30 });
        assert_eq!(config.run.seed, Some(1_111_111_111));
        assert_eq!(config.resolve_seed(), 1_111_111_111);
        assert_eq!(config.output.format, OutputFormat::JsonLines);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        config.validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = SimulationConfig::parse("lattice:\n  side: 16\n").unwrap();
        assert_eq!(config.lattice.side, 16);
        assert_eq!(config.dynamics, DynamicsConfig::default());
        assert_eq!(config.schedule.spacing, ScheduleKind::Logarithmic);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let err = SimulationConfig::parse("lattice: [unclosed");
        assert!(matches!(err, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn validation_names_the_offending_field() {
        let cases: Vec<(&str, &str)> = vec![
            ("lattice:\n  side: 1\n", "lattice.side"),
            ("lattice:\n  side: 100000\n", "lattice.side"),
            ("lattice:\n  occupancy:\n    kind: diluted\n    density: 1.5\n", "lattice.occupancy.density"),
            ("dynamics:\n  increment: -0.1\n", "dynamics.increment"),
            ("dynamics:\n  threshold: 0.0\n", "dynamics.threshold"),
            ("dynamics:\n  reset_policy:\n    kind: gamma_reset\n    gamma: 0.9\n", "dynamics.reset_policy.gamma"),
            ("dynamics:\n  acceptance:\n    kind: probabilistic\n    alpha: 1.5\n    beta: 0.5\n", "dynamics.acceptance.alpha"),
            ("dynamics:\n  mobility: -0.5\n", "dynamics.mobility"),
            ("schedule:\n  spacing:\n    kind: power_law\n    points: 1\n", "schedule.spacing.points"),
            ("schedule:\n  max_time: 0\n", "schedule.max_time"),
        ];
        for (yaml, expected) in cases {
            let config = SimulationConfig::parse(yaml).unwrap();
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected, "{yaml}"),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn pure_voter_clusters_ignore_zealotry() {
        let config = SimulationConfig::parse("dynamics:\n  increment: 0.0\n").unwrap();
        assert_eq!(config.connectivity(), Connectivity::Opinion);
        assert_eq!(config.update_rules().increment, 0.0);
    }

    #[test]
    fn clock_seed_is_odd() {
        assert_eq!(SimulationConfig::default().resolve_seed() % 2, 1);
    }
}
