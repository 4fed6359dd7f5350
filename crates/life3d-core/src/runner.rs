//! Bounded run loop.
//!
//! This module provides [`run_simulation`], which drives
//! [`Simulation::step`] until the engine raises a terminal signal or the
//! step budget runs out, notifying a [`StepCallback`] after every step.
//!
//! The engine only reports terminal signals; whether to stop on them is
//! decided here, by the run's [`StopPolicy`].

use life3d_types::{StepInfo, TerminalReason};
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::simulation::Simulation;
use crate::step::StepError;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step failed.
    #[error("step error: {source}")]
    Step {
        /// The underlying step error.
        #[from]
        source: StepError,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// Every cell died.
    Extinction,
    /// The alive mask stopped changing or started repeating.
    SteadyState {
        /// Cycle length in steps; 1 for a still life.
        period: u32,
    },
    /// The step budget was exhausted first.
    MaxStepsReached,
}

impl From<TerminalReason> for RunEndReason {
    fn from(reason: TerminalReason) -> Self {
        match reason {
            TerminalReason::Extinction => Self::Extinction,
            TerminalReason::SteadyState { period } => Self::SteadyState { period },
        }
    }
}

impl RunEndReason {
    /// Short label used in logs and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extinction => "extinction",
            Self::SteadyState { .. } => "steady-state",
            Self::MaxStepsReached => "max-steps",
        }
    }
}

/// How the run loop reacts to terminal signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    /// Step budget. Zero executes no steps.
    pub max_steps: u64,
    /// Stop on the first extinct step.
    pub stop_on_extinction: bool,
    /// Stop once enough consecutive steps were steady.
    pub stop_on_steady: bool,
    /// Consecutive steady-state steps required; zero behaves as one.
    pub steady_patience: u32,
}

impl StopPolicy {
    /// Stop on the first terminal signal or after `max_steps` steps.
    pub const fn max_steps(max_steps: u64) -> Self {
        Self {
            max_steps,
            stop_on_extinction: true,
            stop_on_steady: true,
            steady_patience: 1,
        }
    }

    /// Whether the streak of steady steps is long enough to stop.
    const fn steady_exhausted(&self, streak: u32) -> bool {
        let patience = if self.steady_patience == 0 {
            1
        } else {
            self.steady_patience
        };
        self.stop_on_steady && streak >= patience
    }
}

impl From<&RunConfig> for StopPolicy {
    fn from(run: &RunConfig) -> Self {
        Self {
            max_steps: run.max_steps,
            stop_on_extinction: run.auto_stop_extinction,
            stop_on_steady: run.auto_stop_steady,
            steady_patience: run.steady_patience,
        }
    }
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// The last step's info, if any step ran.
    pub final_info: Option<StepInfo>,
    /// Total number of steps executed.
    pub total_steps: u64,
}

/// Callback invoked after each step completes.
///
/// Implementations can export snapshots, collect statistics, and so on.
/// The callback sees the simulation after the step was committed.
pub trait StepCallback {
    /// Called after a step completes successfully.
    fn on_step(&mut self, info: &StepInfo, sim: &Simulation);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl StepCallback for NoOpCallback {
    fn on_step(&mut self, _info: &StepInfo, _sim: &Simulation) {}
}

/// Run until the policy accepts a terminal signal or the step budget is
/// spent.
///
/// Extinction stops the run at once when `stop_on_extinction` is set.
/// Steady-state signals stop it after `steady_patience` consecutive steady
/// steps when `stop_on_steady` is set. Ignored signals are logged at debug
/// level and the loop carries on.
///
/// # Errors
///
/// Returns [`RunnerError`] if a step fails.
pub fn run_simulation(
    sim: &mut Simulation,
    policy: StopPolicy,
    callback: &mut dyn StepCallback,
) -> Result<RunResult, RunnerError> {
    let mut final_info: Option<StepInfo> = None;
    let mut total_steps: u64 = 0;
    let mut steady_streak: u32 = 0;

    info!(
        max_steps = policy.max_steps,
        stop_on_extinction = policy.stop_on_extinction,
        stop_on_steady = policy.stop_on_steady,
        steady_patience = policy.steady_patience,
        population = sim.population(),
        "Simulation starting"
    );

    while total_steps < policy.max_steps {
        let step_info = sim.step()?;
        total_steps = total_steps.saturating_add(1);

        callback.on_step(&step_info, sim);

        let stop = match step_info.terminal {
            Some(TerminalReason::Extinction) => {
                steady_streak = 0;
                policy.stop_on_extinction
            }
            Some(TerminalReason::SteadyState { .. }) => {
                steady_streak = steady_streak.saturating_add(1);
                policy.steady_exhausted(steady_streak)
            }
            None => {
                steady_streak = 0;
                false
            }
        };

        if let Some(reason) = step_info.terminal {
            if stop {
                info!(
                    step = step_info.step,
                    reason = %reason,
                    alive = step_info.alive_after,
                    "Terminal state reached"
                );
                return Ok(RunResult {
                    end_reason: reason.into(),
                    final_info: Some(step_info),
                    total_steps,
                });
            }
            debug!(
                step = step_info.step,
                reason = %reason,
                steady_streak,
                "Terminal signal ignored"
            );
        }

        final_info = Some(step_info);
    }

    info!(
        step = sim.step_count(),
        max_steps = policy.max_steps,
        "Step limit reached"
    );
    Ok(RunResult {
        end_reason: RunEndReason::MaxStepsReached,
        final_info,
        total_steps,
    })
}

/// Log the end-of-run summary.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = result.end_reason.as_str(),
        total_steps = result.total_steps,
        final_step = result.final_info.as_ref().map(|s| s.step),
        final_alive = result.final_info.as_ref().map(|s| s.alive_after),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_info {
        info!(
            step = summary.step,
            alive = summary.alive_after,
            births = summary.births,
            deaths = summary.deaths,
            mutations = summary.mutations(),
            "Final step summary"
        );
    } else {
        warn!("Simulation ended with no steps executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use life3d_types::{Rgb, Seed, Shape};

    use super::*;
    use crate::color::ColorConfig;
    use crate::mutation::MutationConfig;
    use crate::rule::Rule;
    use crate::termination::TerminationConfig;

    fn sim(rule: &str, seeds: &[Seed]) -> Simulation {
        Simulation::configure(
            Rule::parse(rule).unwrap(),
            ColorConfig::default(),
            MutationConfig::disabled(),
            Shape::cube(6),
            seeds,
            42,
            TerminationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn lone_cell_goes_extinct_after_one_step() {
        let mut s = sim("B6/S5-7", &[Seed::new(1, 1, 1, Rgb::WHITE)]);
        let result = run_simulation(&mut s, StopPolicy::max_steps(10), &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, RunEndReason::Extinction);
        assert_eq!(result.total_steps, 1);
    }

    #[test]
    fn still_life_is_steady_state() {
        // With S0-26 and no births nothing ever changes.
        let mut s = sim("B/S0-26", &[Seed::new(1, 1, 1, Rgb::WHITE)]);
        let result = run_simulation(&mut s, StopPolicy::max_steps(10), &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, RunEndReason::SteadyState { period: 1 });
        assert_eq!(result.total_steps, 1);
    }

    #[test]
    fn budget_bounds_the_run() {
        // B1/S: every step is a fresh, growing shell around the seed.
        let mut s = sim("B1/S", &[Seed::new(0, 0, 0, Rgb::WHITE)]);
        let result = run_simulation(&mut s, StopPolicy::max_steps(1), &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, RunEndReason::MaxStepsReached);
        assert_eq!(result.total_steps, 1);
        assert_eq!(result.final_info.unwrap().births, 26);
    }

    #[test]
    fn zero_budget_runs_nothing() {
        let mut s = sim("B6/S5-7", &[Seed::new(1, 1, 1, Rgb::WHITE)]);
        let result = run_simulation(&mut s, StopPolicy::max_steps(0), &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, RunEndReason::MaxStepsReached);
        assert_eq!(result.total_steps, 0);
        assert!(result.final_info.is_none());
    }

    #[test]
    fn still_life_runs_on_when_steady_stop_is_off() {
        let mut s = sim("B/S0-26", &[Seed::new(1, 1, 1, Rgb::WHITE)]);
        let policy = StopPolicy {
            stop_on_steady: false,
            ..StopPolicy::max_steps(10)
        };
        let result = run_simulation(&mut s, policy, &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, RunEndReason::MaxStepsReached);
        assert_eq!(result.total_steps, 10);
        assert_eq!(s.population(), 1);
    }

    #[test]
    fn steady_patience_counts_consecutive_steady_steps() {
        let mut s = sim("B/S0-26", &[Seed::new(1, 1, 1, Rgb::WHITE)]);
        let policy = StopPolicy {
            steady_patience: 3,
            ..StopPolicy::max_steps(10)
        };
        let result = run_simulation(&mut s, policy, &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, RunEndReason::SteadyState { period: 1 });
        assert_eq!(result.total_steps, 3);
    }

    #[test]
    fn zero_patience_behaves_as_one() {
        let mut s = sim("B/S0-26", &[Seed::new(1, 1, 1, Rgb::WHITE)]);
        let policy = StopPolicy {
            steady_patience: 0,
            ..StopPolicy::max_steps(10)
        };
        let result = run_simulation(&mut s, policy, &mut NoOpCallback).unwrap();
        assert_eq!(result.total_steps, 1);
    }

    #[test]
    fn extinction_runs_on_when_extinction_stop_is_off() {
        let mut s = sim("B6/S5-7", &[Seed::new(1, 1, 1, Rgb::WHITE)]);
        let policy = StopPolicy {
            stop_on_extinction: false,
            ..StopPolicy::max_steps(4)
        };
        let result = run_simulation(&mut s, policy, &mut NoOpCallback).unwrap();
        assert_eq!(result.end_reason, RunEndReason::MaxStepsReached);
        assert_eq!(result.total_steps, 4);
        assert_eq!(result.final_info.unwrap().alive_after, 0);
    }

    #[test]
    fn policy_follows_run_config() {
        let run = RunConfig {
            max_steps: 12,
            auto_stop_extinction: false,
            steady_patience: 5,
            ..RunConfig::default()
        };
        let policy = StopPolicy::from(&run);
        assert_eq!(policy.max_steps, 12);
        assert!(!policy.stop_on_extinction);
        assert!(policy.stop_on_steady);
        assert_eq!(policy.steady_patience, 5);
    }

    #[test]
    fn callback_sees_every_step() {
        struct Counter {
            steps: Vec<u64>,
        }
        impl StepCallback for Counter {
            fn on_step(&mut self, info: &StepInfo, sim: &Simulation) {
                assert_eq!(info.step, sim.step_count());
                self.steps.push(info.step);
            }
        }
        let mut s = sim("B1/S", &[Seed::new(0, 0, 0, Rgb::WHITE)]);
        let mut cb = Counter { steps: Vec::new() };
        let result = run_simulation(&mut s, StopPolicy::max_steps(3), &mut cb).unwrap();
        assert_eq!(cb.steps, (1..=result.total_steps).collect::<Vec<_>>());
    }
}
