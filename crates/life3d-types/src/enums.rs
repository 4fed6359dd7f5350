//! Enumeration types for the Life3D simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color inheritance
// ---------------------------------------------------------------------------

/// How a newborn cell derives its color from living cells within
/// Chebyshev radius 2.
///
/// Plain averaging drifts every population toward gray over many
/// generations; the other modes trade off between preserving distinct
/// lineages (`RandomParent`) and keeping blended colors saturated
/// (`HsvBoostedMean`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Per-channel arithmetic mean of every living neighbor.
    #[default]
    Mean,
    /// Mean weighted by `1 / (1 + d)` where `d` is the Chebyshev distance.
    DistanceWeighted,
    /// Average of two distinct living neighbors drawn at random.
    TwoParentBlend,
    /// Exact copy of one living neighbor drawn at random.
    RandomParent,
    /// Circular-hue HSV mean with boosted, floored saturation.
    HsvBoostedMean,
}

impl ColorMode {
    /// Every mode, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Mean,
        Self::DistanceWeighted,
        Self::TwoParentBlend,
        Self::RandomParent,
        Self::HsvBoostedMean,
    ];

    /// The configuration-file spelling of this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::DistanceWeighted => "distance_weighted",
            Self::TwoParentBlend => "two_parent_blend",
            Self::RandomParent => "random_parent",
            Self::HsvBoostedMean => "hsv_boosted_mean",
        }
    }

    /// Whether this mode consumes random draws per newborn.
    pub const fn is_stochastic(self) -> bool {
        matches!(self, Self::TwoParentBlend | Self::RandomParent)
    }
}

impl core::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Termination
// ---------------------------------------------------------------------------

/// Why a step was flagged as terminal.
///
/// The engine only reports the signal; the driving loop decides whether
/// to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum TerminalReason {
    /// No cell is alive after the step.
    Extinction,
    /// The alive mask repeats with the given period. Period 1 means the
    /// step changed nothing.
    SteadyState {
        /// Number of steps after which the alive mask recurs.
        period: u32,
    },
}

impl TerminalReason {
    /// Short label used in logs and reports (`extinction`, `steady-state`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extinction => "extinction",
            Self::SteadyState { .. } => "steady-state",
        }
    }
}

impl core::fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Extinction => f.write_str("extinction"),
            Self::SteadyState { period: 1 } => f.write_str("steady-state"),
            Self::SteadyState { period } => write!(f, "steady-state (period {period})"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn color_mode_serde_uses_snake_case() {
        for mode in ColorMode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
            let back: ColorMode = serde_json::from_str(&json).unwrap();
            assert_eq!(back, mode);
        }
    }

    #[test]
    fn only_parent_modes_are_stochastic() {
        assert!(ColorMode::RandomParent.is_stochastic());
        assert!(ColorMode::TwoParentBlend.is_stochastic());
        assert!(!ColorMode::Mean.is_stochastic());
        assert!(!ColorMode::HsvBoostedMean.is_stochastic());
    }

    #[test]
    fn terminal_reason_labels() {
        assert_eq!(TerminalReason::Extinction.as_str(), "extinction");
        assert_eq!(
            TerminalReason::SteadyState { period: 3 }.as_str(),
            "steady-state"
        );
        assert_eq!(
            TerminalReason::SteadyState { period: 1 }.to_string(),
            "steady-state"
        );
        assert_eq!(
            TerminalReason::SteadyState { period: 2 }.to_string(),
            "steady-state (period 2)"
        );
    }
}
