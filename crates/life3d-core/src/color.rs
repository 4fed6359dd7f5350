//! Color inheritance for newborn cells.
//!
//! Every newborn looks at the cells that were alive in the pre-step snapshot
//! within Chebyshev radius 2 and derives its color from them under one of
//! five [`ColorMode`]s. Plain averaging pulls a population toward gray over
//! many generations, so the other modes either keep lineages distinct or
//! re-saturate the blend.
//!
//! Contributions arrive per offset: on a grid narrower than the window one
//! physical cell may appear several times and then weighs in several times.
//! The two parent-drawing modes work over distinct cells instead.
//!
//! All channel results are rounded half away from zero and clamped to
//! `[0, 255]`.

use std::collections::BTreeSet;
use std::f64::consts::TAU;

use life3d_types::{ColorMode, Rgb};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Color of a newborn with no living cell in its window.
pub const FALLBACK_COLOR: Rgb = Rgb::MID_GRAY;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Color inheritance settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Inheritance scheme.
    #[serde(default)]
    pub mode: ColorMode,

    /// Multiplier applied to the mean saturation in `hsv_boosted_mean`.
    #[serde(default = "default_saturation_boost")]
    pub saturation_boost: f64,

    /// Lower bound on the boosted saturation in `hsv_boosted_mean`.
    #[serde(default = "default_saturation_floor")]
    pub saturation_floor: f64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            mode: ColorMode::default(),
            saturation_boost: default_saturation_boost(),
            saturation_floor: default_saturation_floor(),
        }
    }
}

impl ColorConfig {
    /// Settings for `mode` with the default HSV tuning.
    pub fn with_mode(mode: ColorMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Check parameter ranges.
    ///
    /// `saturation_boost` must be finite and non-negative and
    /// `saturation_floor` must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.saturation_boost.is_finite() || self.saturation_boost < 0.0 {
            return Err(ConfigError::InvalidColorParams {
                field: "saturation_boost",
                value: self.saturation_boost,
            });
        }
        if !(0.0..=1.0).contains(&self.saturation_floor) {
            return Err(ConfigError::InvalidColorParams {
                field: "saturation_floor",
                value: self.saturation_floor,
            });
        }
        Ok(())
    }
}

const fn default_saturation_boost() -> f64 {
    1.3
}

const fn default_saturation_floor() -> f64 {
    0.35
}

// ---------------------------------------------------------------------------
// Inheritance
// ---------------------------------------------------------------------------

/// One living cell seen from a newborn's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    /// Flat index of the living cell.
    pub cell: usize,
    /// Its color in the pre-step snapshot.
    pub color: Rgb,
    /// Chebyshev distance of the offset it was reached through (1 or 2).
    pub distance: u32,
}

/// Derive a newborn's color from its window contributions.
///
/// Contributions must be in neighborhood table order; the parent modes
/// draw from `rng` over that order. An empty slice yields
/// [`FALLBACK_COLOR`] without touching `rng`.
pub fn inherit<R: Rng + ?Sized>(
    config: &ColorConfig,
    contributions: &[Contribution],
    rng: &mut R,
) -> Rgb {
    if contributions.is_empty() {
        return FALLBACK_COLOR;
    }
    match config.mode {
        ColorMode::Mean => mean(contributions),
        ColorMode::DistanceWeighted => distance_weighted(contributions),
        ColorMode::TwoParentBlend => two_parent_blend(contributions, rng),
        ColorMode::RandomParent => random_parent(contributions, rng),
        ColorMode::HsvBoostedMean => {
            hsv_boosted_mean(contributions, config.saturation_boost, config.saturation_floor)
        }
    }
}

/// Per-channel arithmetic mean.
pub fn mean(contributions: &[Contribution]) -> Rgb {
    weighted_mean(contributions.iter().map(|c| (c.color, 1.0)))
}

/// Mean weighted by `1 / (1 + d)`.
pub fn distance_weighted(contributions: &[Contribution]) -> Rgb {
    weighted_mean(
        contributions
            .iter()
            .map(|c| (c.color, 1.0 / (1.0 + f64::from(c.distance)))),
    )
}

/// Average of two distinct parents drawn uniformly.
///
/// Draws `i` in `0..n`, then `j` in `0..n-1` and shifts it past `i`, so the
/// pair is always distinct. A single candidate is copied.
pub fn two_parent_blend<R: Rng + ?Sized>(contributions: &[Contribution], rng: &mut R) -> Rgb {
    let parents = distinct_parents(contributions);
    let n = parents.len();
    if n < 2 {
        return parents.first().copied().unwrap_or(FALLBACK_COLOR);
    }
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n.saturating_sub(1));
    if j >= i {
        j = j.saturating_add(1);
    }
    match (parents.get(i), parents.get(j)) {
        (Some(&a), Some(&b)) => weighted_mean([(a, 1.0), (b, 1.0)]),
        _ => FALLBACK_COLOR,
    }
}

/// Exact copy of one distinct parent drawn uniformly.
pub fn random_parent<R: Rng + ?Sized>(contributions: &[Contribution], rng: &mut R) -> Rgb {
    let parents = distinct_parents(contributions);
    if parents.is_empty() {
        return FALLBACK_COLOR;
    }
    let i = rng.random_range(0..parents.len());
    parents.get(i).copied().unwrap_or(FALLBACK_COLOR)
}

/// HSV mean with a circular hue average and boosted, floored saturation.
pub fn hsv_boosted_mean(contributions: &[Contribution], boost: f64, floor: f64) -> Rgb {
    let mut sin_sum = 0.0_f64;
    let mut cos_sum = 0.0_f64;
    let mut s_sum = 0.0_f64;
    let mut v_sum = 0.0_f64;
    for c in contributions {
        let hsv = Hsv::from(c.color);
        let angle = hsv.h * TAU;
        sin_sum += angle.sin();
        cos_sum += angle.cos();
        s_sum += hsv.s;
        v_sum += hsv.v;
    }
    let n = count_as_f64(contributions.len());
    let h = circular_hue(sin_sum, cos_sum);
    let s = (s_sum / n * boost).clamp(floor.min(1.0), 1.0);
    let v = (v_sum / n).clamp(0.0, 1.0);
    Hsv { h, s, v }.into()
}

/// First occurrence of each physical cell, in table order.
fn distinct_parents(contributions: &[Contribution]) -> Vec<Rgb> {
    let mut seen = BTreeSet::new();
    contributions
        .iter()
        .filter(|c| seen.insert(c.cell))
        .map(|c| c.color)
        .collect()
}

fn weighted_mean(items: impl IntoIterator<Item = (Rgb, f64)>) -> Rgb {
    let mut sums = [0.0_f64; 3];
    let mut total = 0.0_f64;
    for (color, w) in items {
        for (sum, ch) in sums.iter_mut().zip(color.channels()) {
            *sum = f64::from(ch).mul_add(w, *sum);
        }
        total += w;
    }
    if total <= 0.0 {
        return FALLBACK_COLOR;
    }
    let [r, g, b] = sums;
    Rgb::new(
        to_channel(r / total),
        to_channel(g / total),
        to_channel(b / total),
    )
}

/// Hue in `[0, 1)` from summed unit vectors. A zero resultant maps to 0.
fn circular_hue(sin_sum: f64, cos_sum: f64) -> f64 {
    if sin_sum.hypot(cos_sum) < 1e-12 {
        return 0.0;
    }
    let h = sin_sum.atan2(cos_sum) / TAU;
    let h = h.rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if h >= 1.0 { 0.0 } else { h }
}

/// Round half away from zero and clamp into a channel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

pub(crate) fn count_as_f64(n: usize) -> f64 {
    u32::try_from(n).map_or(f64::from(u32::MAX), f64::from)
}

// ---------------------------------------------------------------------------
// HSV
// ---------------------------------------------------------------------------

/// A color in HSV space, every component in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue as a fraction of a full turn.
    pub h: f64,
    /// Saturation.
    pub s: f64,
    /// Value.
    pub v: f64,
}

impl From<Rgb> for Hsv {
    fn from(c: Rgb) -> Self {
        let max = c.r.max(c.g).max(c.b);
        let min = c.r.min(c.g).min(c.b);
        let v = f64::from(max) / 255.0;
        if max == min {
            return Self { h: 0.0, s: 0.0, v };
        }
        let (r, g, b) = (f64::from(c.r), f64::from(c.g), f64::from(c.b));
        let d = f64::from(max) - f64::from(min);
        let s = d / f64::from(max);
        let sector = if max == c.r {
            ((g - b) / d).rem_euclid(6.0)
        } else if max == c.g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Self {
            h: sector / 6.0,
            s,
            v,
        }
    }
}

impl From<Hsv> for Rgb {
    #[allow(clippy::cast_possible_truncation, clippy::suboptimal_flops)]
    fn from(hsv: Hsv) -> Self {
        let h = hsv.h.rem_euclid(1.0) * 6.0;
        let s = hsv.s.clamp(0.0, 1.0);
        let v = hsv.v.clamp(0.0, 1.0);
        let i = h.floor();
        let f = h - i;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);
        let (r, g, b) = match i as i32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::new(
            to_channel(r * 255.0),
            to_channel(g * 255.0),
            to_channel(b * 255.0),
        )
    }
}
