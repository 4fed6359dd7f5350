//! The configured simulation facade.
//!
//! [`configure`] turns a [`SimulationConfig`] into a ready-to-run
//! [`Simulation`], validating everything up front. Afterwards
//! [`Simulation::step`] cannot fail on configuration grounds; the only
//! step-time error is an invariant violation.

use life3d_types::{Seed, Shape, Snapshot, StepInfo};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::color::ColorConfig;
use crate::config::{ConfigError, SimulationConfig};
use crate::geometry::{MAX_CELLS, Torus};
use crate::grid::Grid;
use crate::mutation::{BurstPhase, MutationConfig};
use crate::rule::Rule;
use crate::step::{Engine, SimState, StepError};
use crate::termination::{History, TerminationConfig};

/// Build a simulation from a loaded configuration.
///
/// # Errors
///
/// Returns [`ConfigError`] for a malformed rule, out-of-range color or
/// mutation parameters, a zero or oversized grid, or an empty seed list.
pub fn configure(config: &SimulationConfig) -> Result<Simulation, ConfigError> {
    let rule = Rule::parse(&config.rule)?;
    Simulation::configure(
        rule,
        config.color,
        config.mutation,
        config.grid,
        &config.seeds,
        config.rng_seed,
        config.termination,
    )
}

/// A configured run: the immutable engine plus the evolving state.
#[derive(Debug, Clone)]
pub struct Simulation {
    engine: Engine,
    state: SimState,
}

impl Simulation {
    /// Validate the parts and seed the initial grid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a parameter is out of range, the grid is
    /// empty or oversized, or `seeds` is empty.
    pub fn configure(
        rule: Rule,
        color: ColorConfig,
        mutation: MutationConfig,
        shape: Shape,
        seeds: &[Seed],
        rng_seed: u64,
        termination: TerminationConfig,
    ) -> Result<Self, ConfigError> {
        color.validate()?;
        mutation.validate()?;
        if !shape.is_valid() {
            return Err(ConfigError::InvalidShape {
                x: shape.x,
                y: shape.y,
                z: shape.z,
            });
        }
        let torus = Torus::new(shape).ok_or(ConfigError::GridTooLarge {
            x: shape.x,
            y: shape.y,
            z: shape.z,
            max: MAX_CELLS,
        })?;
        if seeds.is_empty() {
            return Err(ConfigError::EmptySeeds);
        }

        let grid = Grid::seeded(&torus, seeds);
        let mut history = History::new(&termination);
        history.record(grid.alive());

        info!(
            shape = %format_args!("{}x{}x{}", shape.x, shape.y, shape.z),
            rule = %rule,
            color_mode = %color.mode,
            stochastic_colors = color.mode.is_stochastic(),
            mutation_enabled = mutation.enabled,
            cycle_window = termination.cycle_window,
            rng_seed,
            seeded_cells = grid.population(),
            "Simulation configured"
        );

        let state = SimState {
            grid,
            rng: StdRng::seed_from_u64(rng_seed),
            burst: BurstPhase::start(&mutation.per_step),
            history,
            step: 0,
        };
        Ok(Self {
            engine: Engine::new(torus, rule, color, mutation),
            state,
        })
    }

    /// Advance one step.
    ///
    /// On error the simulation keeps its pre-step state.
    pub fn step(&mut self) -> Result<StepInfo, StepError> {
        let (next, info) = self.engine.advance(&self.state)?;
        self.state = next;
        Ok(info)
    }

    /// Owned copy of the current grid.
    pub fn snapshot(&self) -> Snapshot {
        self.state.grid.snapshot(self.state.step)
    }

    /// Steps executed so far.
    pub const fn step_count(&self) -> u64 {
        self.state.step
    }

    /// Live cells right now.
    pub fn population(&self) -> usize {
        self.state.grid.population()
    }

    /// Lattice extents.
    pub const fn shape(&self) -> Shape {
        self.state.grid.shape()
    }

    /// The immutable engine.
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The current state.
    pub const fn state(&self) -> &SimState {
        &self.state
    }
}
