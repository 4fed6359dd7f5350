//! Configuration loading and typed config structures for Life3D.
//!
//! The canonical configuration lives in `life3d-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure and a
//! loader that reads the file. Every field has a default, so a partial file
//! (or none at all) is a valid configuration.
//!
//! Loading only checks syntax. Semantic checks (rule notation, parameter
//! ranges, grid extents, seeds) run in [`crate::configure`], so every way of
//! building a simulation goes through the same validation.

use std::path::{Path, PathBuf};

use life3d_types::{Rgb, Seed, Shape};
use serde::{Deserialize, Serialize};

use crate::color::ColorConfig;
use crate::mutation::MutationConfig;
use crate::rule::RuleError;
use crate::termination::TerminationConfig;

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

    /// The rule string is malformed.
    #[error("invalid rule: {source}")]
    InvalidRule {
        /// The underlying parse error.
        #[from]
        source: RuleError,
    },

    /// A color inheritance parameter is out of range.
    #[error("invalid color parameter {field}: {value}")]
    InvalidColorParams {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A mutation parameter is out of range.
    #[error("invalid mutation parameter {field}: {value}")]
    InvalidMutation {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A grid extent is zero.
    #[error("grid extents must be positive, got {x}x{y}x{z}")]
    InvalidShape {
        /// Extent along x.
        x: u32,
        /// Extent along y.
        y: u32,
        /// Extent along z.
        z: u32,
    },

    /// The grid has more cells than the engine accepts.
    #[error("grid {x}x{y}x{z} exceeds the limit of {max} cells")]
    GridTooLarge {
        /// Extent along x.
        x: u32,
        /// Extent along y.
        y: u32,
        /// Extent along z.
        z: u32,
        /// Largest accepted cell count.
        max: usize,
    },

    /// No seed cells were given.
    #[error("seed list is empty")]
    EmptySeeds,
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `life3d-config.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Lattice extents.
    #[serde(default)]
    pub grid: Shape,

    /// Birth/survive rule in `B<list>/S<list>` notation.
    #[serde(default = "default_rule")]
    pub rule: String,

    /// Seed for the run's random number generator.
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,

    /// Color inheritance settings.
    #[serde(default)]
    pub color: ColorConfig,

    /// Mutation settings.
    #[serde(default)]
    pub mutation: MutationConfig,

    /// Termination detector settings.
    #[serde(default)]
    pub termination: TerminationConfig,

    /// Run loop and export settings.
    #[serde(default)]
    pub run: RunConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Initial live cells.
    #[serde(default = "default_seeds")]
    pub seeds: Vec<Seed>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid: Shape::default(),
            rule: default_rule(),
            rng_seed: default_rng_seed(),
            color: ColorConfig::default(),
            mutation: MutationConfig::default(),
            termination: TerminationConfig::default(),
            run: RunConfig::default(),
            logging: LoggingConfig::default(),
            seeds: default_seeds(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Run loop and export settings for the headless driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Step budget for one run.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Export a snapshot every N steps. Zero disables export.
    #[serde(default)]
    pub snapshot_every: u64,

    /// Directory for snapshots and the run report.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Stop as soon as a step leaves no live cell.
    #[serde(default = "default_true")]
    pub auto_stop_extinction: bool,

    /// Stop once the alive mask has been steady for `steady_patience` steps.
    #[serde(default = "default_true")]
    pub auto_stop_steady: bool,

    /// Consecutive steady-state steps required before stopping. Zero is
    /// treated as one.
    #[serde(default = "default_steady_patience")]
    pub steady_patience: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            snapshot_every: 0,
            output_dir: default_output_dir(),
            auto_stop_extinction: true,
            auto_stop_steady: true,
            steady_patience: default_steady_patience(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_rule() -> String {
    String::from("B6/S5-7")
}

const fn default_rng_seed() -> u64 {
    42
}

const fn default_max_steps() -> u64 {
    60
}

const fn default_true() -> bool {
    true
}

const fn default_steady_patience() -> u32 {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./out")
}

fn default_log_level() -> String {
    String::from("info")
}

/// A 3x3x3 block at the center of the default 24-cube, one primary color
/// per z layer.
fn default_seeds() -> Vec<Seed> {
    let layers = [
        Rgb::new(255, 60, 60),
        Rgb::new(60, 255, 60),
        Rgb::new(60, 60, 255),
    ];
    let mut seeds = Vec::with_capacity(27);
    for (z, rgb) in (11_i64..=13).zip(layers) {
        for y in 11_i64..=13 {
            for x in 11_i64..=13 {
                seeds.push(Seed::new(x, y, z, rgb));
            }
        }
    }
    seeds
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use life3d_types::ColorMode;

    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.grid, Shape::cube(24));
        assert_eq!(config.seeds.len(), 27);
        assert_eq!(config.termination.cycle_window, 8);
    }

    #[test]
    fn partial_yaml_overrides_fields() {
        let yaml = r#"
grid: { x: 8, y: 8, z: 8 }
rule: "B5/S4-6"
color:
  mode: hsv_boosted_mean
  saturation_boost: 1.5
mutation:
  enabled: false
  per_step: { probability: 0.25, max_mutants: 2 }
run:
  snapshot_every: 5
seeds:
  - { x: -1, y: 0, z: 3, rgb: [255, 100, 50] }
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.grid, Shape::cube(8));
        assert_eq!(config.rule, "B5/S4-6");
        assert_eq!(config.color.mode, ColorMode::HsvBoostedMean);
        assert!((config.color.saturation_boost - 1.5).abs() < f64::EPSILON);
        assert!((config.color.saturation_floor - 0.35).abs() < f64::EPSILON);
        assert!(!config.mutation.enabled);
        assert_eq!(config.mutation.per_step.max_mutants, 2);
        assert_eq!(config.mutation.per_step.burst_length, 4);
        assert_eq!(config.run.snapshot_every, 5);
        assert_eq!(config.run.max_steps, 60);
        assert_eq!(
            config.seeds,
            vec![Seed::new(-1, 0, 3, Rgb::new(255, 100, 50))]
        );
    }

    #[test]
    fn stop_policy_fields_default_on() {
        let config = SimulationConfig::parse("run: { max_steps: 5 }").unwrap();
        assert!(config.run.auto_stop_extinction);
        assert!(config.run.auto_stop_steady);
        assert_eq!(config.run.steady_patience, 1);

        let yaml = "run: { auto_stop_steady: false, steady_patience: 4 }";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(!config.run.auto_stop_steady);
        assert_eq!(config.run.steady_patience, 4);
    }

    #[test]
    fn out_of_range_seed_channels_are_clamped() {
        let yaml = "seeds: [{ x: 1, y: 1, z: 1, rgb: [300, -5, 10] }]";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.seeds, vec![Seed::new(1, 1, 1, Rgb::new(255, 0, 10))]);
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = SimulationConfig::parse("grid: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn unknown_color_mode_is_rejected() {
        let err = SimulationConfig::parse("color: { mode: sepia }").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SimulationConfig::from_file(Path::new("/nonexistent/life3d.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
