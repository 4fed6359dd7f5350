//! Step engine and run loop for the Life3D chromatic cellular automaton.
//!
//! A 3-dimensional Conway-style automaton on a toroidal lattice where every
//! live cell carries an RGB color and an age. Each step runs a fixed
//! pipeline over the pre-step snapshot: neighbor counting, the birth and
//! survival rule, color inheritance for newborns, two mutation passes, age
//! tracking, commit, invariant check, and termination detection.
//!
//! # Modules
//!
//! - [`age`] -- Age progression for survivors, newborns, and deaths.
//! - [`color`] -- The five color-inheritance modes and HSV conversions.
//! - [`config`] -- Configuration loading from `life3d-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- Grid consistency violations.
//! - [`geometry`] -- Toroidal wrapping, Chebyshev offset tables, shifted
//!   views, and neighbor counting.
//! - [`grid`] -- The alive, color, and age fields plus seed placement.
//! - [`mutation`] -- Per-birth and bursty per-step color mutation.
//! - [`rule`] -- Birth/survive rule parsing and evaluation.
//! - [`runner`] -- The bounded run loop with per-step callbacks.
//! - [`simulation`] -- The configured simulation facade.
//! - [`step`] -- The single-step transition function.
//! - [`termination`] -- Extinction, steady-state, and cycle detection.
//!
//! Results are bit-identical for a fixed RNG seed: every random draw comes
//! from one [`StdRng`](rand::rngs::StdRng) threaded through [`step::SimState`].

pub mod age;
pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod mutation;
pub mod rule;
pub mod runner;
pub mod simulation;
pub mod step;
pub mod termination;

pub use config::{ConfigError, SimulationConfig};
pub use error::StateInvariantError;
pub use rule::Rule;
pub use simulation::{Simulation, configure};
pub use step::{Engine, SimState, StepError};
