//! Extinction and steady-state detection.
//!
//! [`detect`] is a pure check run after each commit. It never mutates the
//! [`History`]; the step orchestrator records every committed mask itself.
//!
//! Checks run in order and the first hit wins:
//!
//! 1. extinction: nothing alive;
//! 2. period 1: the step changed no alive flag;
//! 3. cycle: the new mask equals one of the last `cycle_window` committed
//!    masks.
//!
//! Only the alive mask is compared. Colors and ages keep changing inside a
//! still life, but the pattern itself has stopped evolving.

use std::collections::VecDeque;

use life3d_types::TerminalReason;
use serde::{Deserialize, Serialize};

/// Termination detector settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationConfig {
    /// Longest cycle period to detect. Zero limits detection to period 1.
    #[serde(default = "default_cycle_window")]
    pub cycle_window: u32,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            cycle_window: default_cycle_window(),
        }
    }
}

const fn default_cycle_window() -> u32 {
    8
}

/// Bounded history of committed alive masks, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    capacity: usize,
    states: VecDeque<Vec<bool>>,
}

impl History {
    /// An empty history holding at most `cycle_window` masks.
    pub fn new(config: &TerminationConfig) -> Self {
        let capacity = usize::try_from(config.cycle_window).unwrap_or(usize::MAX);
        Self {
            capacity,
            states: VecDeque::new(),
        }
    }

    /// Record a committed mask, evicting the oldest when full.
    pub fn record(&mut self, alive: &[bool]) {
        if self.capacity == 0 {
            return;
        }
        while self.states.len() >= self.capacity {
            self.states.pop_front();
        }
        self.states.push_back(alive.to_vec());
    }

    /// Masks from newest to oldest, with their age in steps (newest is 1
    /// step behind the mask being checked).
    pub fn recent(&self) -> impl Iterator<Item = (u32, &[bool])> {
        self.states
            .iter()
            .rev()
            .zip(1_u32..)
            .map(|(s, age)| (age, s.as_slice()))
    }

    /// Number of masks held.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no mask has been recorded.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Classify the committed mask `next_alive` against its predecessor
/// `alive` and the history of earlier masks.
///
/// `history` must end with `alive` when it is non-empty.
pub fn detect(alive: &[bool], next_alive: &[bool], history: &History) -> Option<TerminalReason> {
    if !next_alive.iter().any(|a| *a) {
        return Some(TerminalReason::Extinction);
    }
    if next_alive == alive {
        return Some(TerminalReason::SteadyState { period: 1 });
    }
    history
        .recent()
        .skip(1)
        .find(|(_, past)| *past == next_alive)
        .map(|(period, _)| TerminalReason::SteadyState { period })
}
