//! Shared type definitions for the Life3D simulation.
//!
//! This crate is the single source of truth for the value types that cross
//! crate boundaries: the engine in `life3d-core` produces them, the headless
//! driver in `life3d-engine` logs and exports them, and external renderers
//! consume the serialized [`Snapshot`] form.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for run identifiers
//! - [`enums`] -- Color inheritance modes and terminal reasons
//! - [`structs`] -- Colors, coordinates, seeds, per-step info, snapshots

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ColorMode, TerminalReason};
pub use ids::RunId;
pub use structs::{Coord, Offset, Rgb, Seed, SeedSpec, Shape, Snapshot, StepInfo};
