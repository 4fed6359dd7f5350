//! Color mutation for newborn cells.
//!
//! Two independent passes run after color inheritance, both touching only
//! the colors of cells born this step:
//!
//! 1. **Per-birth**: every newborn independently mutates with a fixed
//!    probability.
//! 2. **Per-step (bursty)**: at most `max_mutants` newborns mutate, and only
//!    on steps the [`BurstPhase`] schedule marks eligible. The schedule
//!    alternates `burst_length` eligible steps with `cooldown_length`
//!    ineligible ones.
//!
//! A mutation adds Gaussian noise to each channel, rounds, and clamps to
//! `[0, 255]`. Noise comes from the Box-Muller transform over the run's RNG.

use std::f64::consts::TAU;

use life3d_types::Rgb;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::to_channel;
use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Mutation settings for both passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Master switch. When off neither pass runs and no draws are consumed.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Independent per-newborn mutation.
    #[serde(default)]
    pub per_birth: PerBirthConfig,

    /// Bursty per-step mutation.
    #[serde(default)]
    pub per_step: PerStepConfig,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_birth: PerBirthConfig::default(),
            per_step: PerStepConfig::default(),
        }
    }
}

impl MutationConfig {
    /// Both passes switched off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Check probabilities, standard deviations, and the burst length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("per_birth.probability", self.per_birth.probability)?;
        check_std_dev("per_birth.std_dev", self.per_birth.std_dev)?;
        check_probability("per_step.probability", self.per_step.probability)?;
        check_std_dev("per_step.std_dev", self.per_step.std_dev)?;
        if self.per_step.burst_length == 0 {
            return Err(ConfigError::InvalidMutation {
                field: "per_step.burst_length",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Per-birth pass settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerBirthConfig {
    /// Chance that any one newborn mutates.
    #[serde(default)]
    pub probability: f64,

    /// Standard deviation of the per-channel noise.
    #[serde(default = "default_std_dev")]
    pub std_dev: f64,
}

impl Default for PerBirthConfig {
    fn default() -> Self {
        Self {
            probability: 0.0,
            std_dev: default_std_dev(),
        }
    }
}

/// Per-step (bursty) pass settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerStepConfig {
    /// Chance that an eligible step with newborns mutates at all.
    #[serde(default = "default_per_step_probability")]
    pub probability: f64,

    /// Upper bound on newborns mutated in one step.
    #[serde(default = "default_max_mutants")]
    pub max_mutants: u32,

    /// Standard deviation of the per-channel noise.
    #[serde(default = "default_std_dev")]
    pub std_dev: f64,

    /// Consecutive eligible steps per burst. Must be at least 1.
    #[serde(default = "default_burst_length")]
    pub burst_length: u32,

    /// Ineligible steps between bursts. Zero means every step is eligible.
    #[serde(default = "default_cooldown_length")]
    pub cooldown_length: u32,
}

impl Default for PerStepConfig {
    fn default() -> Self {
        Self {
            probability: default_per_step_probability(),
            max_mutants: default_max_mutants(),
            std_dev: default_std_dev(),
            burst_length: default_burst_length(),
            cooldown_length: default_cooldown_length(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_std_dev() -> f64 {
    30.0
}

const fn default_per_step_probability() -> f64 {
    0.2
}

const fn default_max_mutants() -> u32 {
    1
}

const fn default_burst_length() -> u32 {
    4
}

const fn default_cooldown_length() -> u32 {
    2
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidMutation { field, value })
    }
}

fn check_std_dev(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidMutation { field, value })
    }
}

// ---------------------------------------------------------------------------
// Burst schedule
// ---------------------------------------------------------------------------

/// Where the per-step pass is in its burst/cooldown cycle.
///
/// The count is the number of steps left in the current phase, including
/// the step about to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BurstPhase {
    /// Per-step mutation is allowed.
    Bursting(u32),
    /// Per-step mutation is suppressed.
    Cooling(u32),
}

impl BurstPhase {
    /// Initial phase: a full burst.
    pub const fn start(config: &PerStepConfig) -> Self {
        Self::Bursting(config.burst_length)
    }

    /// Whether the step about to run may apply per-step mutation.
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Bursting(_))
    }

    /// Phase for the following step. Called exactly once per step.
    pub const fn advance(self, config: &PerStepConfig) -> Self {
        match self {
            Self::Bursting(r) if r > 1 => Self::Bursting(r.saturating_sub(1)),
            Self::Bursting(_) => {
                if config.cooldown_length == 0 {
                    Self::Bursting(config.burst_length)
                } else {
                    Self::Cooling(config.cooldown_length)
                }
            }
            Self::Cooling(r) if r > 1 => Self::Cooling(r.saturating_sub(1)),
            Self::Cooling(_) => Self::Bursting(config.burst_length),
        }
    }
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

/// One standard-normal sample scaled by `std_dev`, via Box-Muller.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    // 1 - [0, 1) keeps u1 away from zero so the log stays finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
    z * std_dev
}

/// Add rounded Gaussian noise to every channel, clamping to `[0, 255]`.
///
/// Consumes three Gaussian samples in `r`, `g`, `b` order.
pub fn perturb<R: Rng + ?Sized>(color: Rgb, std_dev: f64, rng: &mut R) -> Rgb {
    let mut shift = |ch: u8| to_channel(f64::from(ch) + gaussian(rng, std_dev));
    let r = shift(color.r);
    let g = shift(color.g);
    let b = shift(color.b);
    Rgb::new(r, g, b)
}

/// Per-birth pass over newborn colors in ascending cell order.
///
/// Returns the number of newborns mutated.
pub fn apply_per_birth<R: Rng + ?Sized>(
    config: &PerBirthConfig,
    newborn_colors: &mut [Rgb],
    rng: &mut R,
) -> u64 {
    let mut mutated = 0_u64;
    for color in newborn_colors.iter_mut() {
        if rng.random::<f64>() < config.probability {
            *color = perturb(*color, config.std_dev, rng);
            mutated = mutated.saturating_add(1);
        }
    }
    mutated
}

/// Per-step pass: on success mutate up to `max_mutants` distinct newborns.
///
/// The caller checks burst eligibility. With no newborns nothing is drawn.
/// Returns the number of newborns mutated.
pub fn apply_per_step<R: Rng + ?Sized>(
    config: &PerStepConfig,
    newborn_colors: &mut [Rgb],
    rng: &mut R,
) -> u64 {
    let n = newborn_colors.len();
    if n == 0 {
        return 0;
    }
    if rng.random::<f64>() >= config.probability {
        return 0;
    }
    let k = usize::try_from(config.max_mutants).map_or(n, |m| m.min(n));

    // Fisher-Yates partial shuffle: the first k slots become the sample.
    let mut picks: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = rng.random_range(i..n);
        picks.swap(i, j);
    }

    let mut mutated = 0_u64;
    for &idx in picks.iter().take(k) {
        if let Some(color) = newborn_colors.get_mut(idx) {
            *color = perturb(*color, config.std_dev, rng);
            mutated = mutated.saturating_add(1);
        }
    }
    mutated
}
