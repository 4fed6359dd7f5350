//! Step orchestration: the single-step transition function.
//!
//! [`Engine::advance`] maps one [`SimState`] to the next. Every phase reads
//! the pre-step snapshot and writes fresh arrays, in this fixed order:
//!
//! 1. **Count** -- live Moore neighbors per cell.
//! 2. **Rule** -- next alive mask; births and deaths fall out of it.
//! 3. **Inherit** -- a color for every newborn, in ascending cell order.
//! 4. **Per-birth mutation** -- independent noise on newborn colors.
//! 5. **Per-step mutation** -- bursty noise, gated by the [`BurstPhase`].
//! 6. **Age** -- survivors age, newborns and deaths reset.
//! 7. **Commit** -- assemble the new [`Grid`].
//! 8. **Check** -- verify the alive/color/age invariants.
//! 9. **Detect** -- extinction, steady state, or cycle.
//! 10. **Record** -- push the committed mask onto the [`History`].
//!
//! Random draws happen in phases 3 to 5 only, always in that order, so a
//! fixed RNG seed reproduces a run exactly.

use life3d_types::{Rgb, StepInfo};
use rand::rngs::StdRng;
use tracing::debug;

use crate::age;
use crate::color::{self, ColorConfig, Contribution};
use crate::error::StateInvariantError;
use crate::geometry::{self, Neighborhood, Torus};
use crate::grid::Grid;
use crate::mutation::{self, BurstPhase, MutationConfig};
use crate::rule::Rule;
use crate::termination::{self, History};

/// Errors that can occur during step execution.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The committed grid broke an alive/color/age invariant.
    #[error("state invariant violated: {source}")]
    Invariant {
        /// The underlying invariant violation.
        #[from]
        source: StateInvariantError,
    },
}

/// Everything that changes from one step to the next.
#[derive(Debug, Clone)]
pub struct SimState {
    /// The committed grid.
    pub grid: Grid,
    /// The run's only source of randomness.
    pub rng: StdRng,
    /// Burst schedule position for the step about to run.
    pub burst: BurstPhase,
    /// Recent committed alive masks, newest last.
    pub history: History,
    /// Steps executed so far.
    pub step: u64,
}

/// The immutable part of a run: geometry, rule, and color/mutation settings.
#[derive(Debug, Clone)]
pub struct Engine {
    torus: Torus,
    moore: Neighborhood,
    window: Neighborhood,
    rule: Rule,
    color: ColorConfig,
    mutation: MutationConfig,
}

impl Engine {
    /// Assemble an engine from validated parts.
    pub fn new(torus: Torus, rule: Rule, color: ColorConfig, mutation: MutationConfig) -> Self {
        Self {
            torus,
            moore: Neighborhood::moore(),
            window: Neighborhood::inheritance_window(),
            rule,
            color,
            mutation,
        }
    }

    /// The lattice.
    pub const fn torus(&self) -> &Torus {
        &self.torus
    }

    /// The birth/survive rule.
    pub const fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Color inheritance settings.
    pub const fn color(&self) -> &ColorConfig {
        &self.color
    }

    /// Mutation settings.
    pub const fn mutation(&self) -> &MutationConfig {
        &self.mutation
    }

    /// Compute the state after one step.
    ///
    /// `state` is left untouched; the returned state owns fresh arrays and
    /// the advanced RNG.
    pub fn advance(&self, state: &SimState) -> Result<(SimState, StepInfo), StepError> {
        let prev = &state.grid;
        let mut rng = state.rng.clone();

        // 1-2. Count neighbors and apply the rule.
        let counts = geometry::neighbor_counts(&self.torus, &self.moore, prev.alive());
        let next_alive = self.rule.apply(prev.alive(), &counts);

        let mut births: Vec<usize> = Vec::new();
        let mut deaths = 0_u64;
        let mut survivors = 0_u64;
        for (i, (was, is)) in prev.alive().iter().zip(&next_alive).enumerate() {
            match (*was, *is) {
                (false, true) => births.push(i),
                (true, false) => deaths = deaths.saturating_add(1),
                (true, true) => survivors = survivors.saturating_add(1),
                (false, false) => {}
            }
        }

        // 3. Inherit colors for newborns.
        let mut newborn_colors: Vec<Rgb> = Vec::with_capacity(births.len());
        let mut contributions: Vec<Contribution> = Vec::with_capacity(self.window.len());
        for &cell in &births {
            contributions.clear();
            for (j, distance) in geometry::window(&self.torus, &self.window, cell) {
                if prev.is_alive(j) {
                    contributions.push(Contribution {
                        cell: j,
                        color: prev.color_of(j)?,
                        distance,
                    });
                }
            }
            newborn_colors.push(color::inherit(&self.color, &contributions, &mut rng));
        }

        // 4-5. Mutate newborn colors.
        let burst_eligible = state.burst.is_eligible();
        let (per_birth_mutations, per_step_mutations) = if self.mutation.enabled {
            let per_birth =
                mutation::apply_per_birth(&self.mutation.per_birth, &mut newborn_colors, &mut rng);
            let per_step = if burst_eligible {
                mutation::apply_per_step(&self.mutation.per_step, &mut newborn_colors, &mut rng)
            } else {
                0
            };
            (per_birth, per_step)
        } else {
            (0, 0)
        };
        if per_step_mutations > 0 {
            debug!(
                step = state.step.saturating_add(1),
                mutants = per_step_mutations,
                "Mutation burst applied"
            );
        }
        let burst = state.burst.advance(&self.mutation.per_step);

        // 6. Age.
        let ages = age::advance(prev.alive(), &next_alive, prev.ages());

        // 7. Commit: survivors keep their color, newborns take the new one.
        let mut colors: Vec<Option<Rgb>> = prev
            .colors()
            .iter()
            .zip(&next_alive)
            .map(|(c, alive)| if *alive { *c } else { None })
            .collect();
        for (&cell, &rgb) in births.iter().zip(&newborn_colors) {
            if let Some(slot) = colors.get_mut(cell) {
                *slot = Some(rgb);
            }
        }
        let grid = Grid::from_parts(prev.shape(), next_alive, colors, ages);

        // 8. Check.
        grid.check_invariants()?;

        // 9-10. Detect, then record.
        let terminal = termination::detect(prev.alive(), grid.alive(), &state.history);
        let mut history = state.history.clone();
        history.record(grid.alive());

        let step = state.step.saturating_add(1);
        let info = StepInfo {
            step,
            alive_before: count_u64(prev.population()),
            alive_after: count_u64(grid.population()),
            births: count_u64(births.len()),
            deaths,
            survivors,
            per_birth_mutations,
            per_step_mutations,
            burst_eligible,
            terminal,
        };

        debug!(
            step,
            alive_before = info.alive_before,
            alive_after = info.alive_after,
            births = info.births,
            deaths = info.deaths,
            terminal = ?info.terminal,
            "Step complete"
        );

        Ok((
            SimState {
                grid,
                rng,
                burst,
                history,
                step,
            },
            info,
        ))
    }
}

fn count_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
