//! Core value structs for the Life3D simulation.
//!
//! Colors, lattice coordinates, the seed placements a run starts from, the
//! per-step report returned by the engine, and the read-only snapshot
//! exported to renderers.

use serde::{Deserialize, Serialize};

use crate::enums::TerminalReason;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An 8-bit-per-channel RGB color.
///
/// Serializes as a `[r, g, b]` array so configuration files and snapshot
/// exports stay compact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Mid-gray, the color given to a newborn with no living neighbors.
    pub const MID_GRAY: Self = Self::new(128, 128, 128);

    /// Construct a color from its three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// The channels as an array, in `[r, g, b]` order.
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Build a color from wide channel values, clamping each into `0..=255`.
    pub fn clamped([r, g, b]: [i64; 3]) -> Self {
        let ch = |v: i64| u8::try_from(v.clamp(0, 255)).unwrap_or(u8::MAX);
        Self::new(ch(r), ch(g), ch(b))
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        c.channels()
    }
}

// ---------------------------------------------------------------------------
// Lattice geometry
// ---------------------------------------------------------------------------

/// A cell coordinate on the lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Position along the x axis.
    pub x: u32,
    /// Position along the y axis.
    pub y: u32,
    /// Position along the z axis.
    pub z: u32,
}

impl Coord {
    /// Construct a coordinate.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// A relative displacement between two cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    /// Displacement along the x axis.
    pub dx: i32,
    /// Displacement along the y axis.
    pub dy: i32,
    /// Displacement along the z axis.
    pub dz: i32,
}

impl Offset {
    /// Construct an offset.
    pub const fn new(dx: i32, dy: i32, dz: i32) -> Self {
        Self { dx, dy, dz }
    }

    /// Chebyshev length: the largest absolute per-axis displacement.
    pub const fn chebyshev(self) -> u32 {
        let ax = self.dx.unsigned_abs();
        let ay = self.dy.unsigned_abs();
        let az = self.dz.unsigned_abs();
        let m = if ax > ay { ax } else { ay };
        if m > az { m } else { az }
    }

    /// Whether this is the zero displacement.
    pub const fn is_center(self) -> bool {
        self.dx == 0 && self.dy == 0 && self.dz == 0
    }
}

/// Extents of the lattice along each axis.
///
/// Cells are stored in a flat array in z-major order:
/// `index = (z * y_extent + y) * x_extent + x`. Every "fixed coordinate
/// order" iteration in the engine is ascending index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    /// Extent along the x axis.
    pub x: u32,
    /// Extent along the y axis.
    pub y: u32,
    /// Extent along the z axis.
    pub z: u32,
}

impl Default for Shape {
    fn default() -> Self {
        Self::cube(24)
    }
}

impl Shape {
    /// Construct a shape from its three extents.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// A shape with the same extent on every axis.
    pub const fn cube(extent: u32) -> Self {
        Self::new(extent, extent, extent)
    }

    /// Whether every extent is positive.
    pub const fn is_valid(self) -> bool {
        self.x > 0 && self.y > 0 && self.z > 0
    }

    /// Total number of cells, or `None` if it does not fit in `usize`.
    pub fn cell_count(self) -> Option<usize> {
        let x = usize::try_from(self.x).ok()?;
        let y = usize::try_from(self.y).ok()?;
        let z = usize::try_from(self.z).ok()?;
        x.checked_mul(y)?.checked_mul(z)
    }

    /// Whether the coordinate lies inside the lattice.
    pub const fn contains(self, c: Coord) -> bool {
        c.x < self.x && c.y < self.y && c.z < self.z
    }

    /// Flat index of an in-bounds coordinate.
    pub fn index(self, c: Coord) -> Option<usize> {
        if !self.contains(c) {
            return None;
        }
        let nx = usize::try_from(self.x).ok()?;
        let ny = usize::try_from(self.y).ok()?;
        let x = usize::try_from(c.x).ok()?;
        let y = usize::try_from(c.y).ok()?;
        let z = usize::try_from(c.z).ok()?;
        z.checked_mul(ny)?
            .checked_add(y)?
            .checked_mul(nx)?
            .checked_add(x)
    }

    /// Coordinate of a flat index, or `None` if the index is out of range.
    pub fn coord(self, index: usize) -> Option<Coord> {
        let nx = usize::try_from(self.x).ok()?;
        let ny = usize::try_from(self.y).ok()?;
        let x = index.checked_rem(nx)?;
        let rest = index.checked_div(nx)?;
        let y = rest.checked_rem(ny)?;
        let z = rest.checked_div(ny)?;
        let c = Coord::new(
            u32::try_from(x).ok()?,
            u32::try_from(y).ok()?,
            u32::try_from(z).ok()?,
        );
        self.contains(c).then_some(c)
    }
}

// ---------------------------------------------------------------------------
// Seeds
// ---------------------------------------------------------------------------

/// One initial live cell placement.
///
/// Coordinates are signed and wrap modulo the grid extents when the grid is
/// configured, so `x: -1` addresses the last column. Deserialization goes
/// through [`SeedSpec`], so out-of-range color channels are clamped rather
/// than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SeedSpec")]
pub struct Seed {
    /// Position along the x axis (wraps).
    pub x: i64,
    /// Position along the y axis (wraps).
    pub y: i64,
    /// Position along the z axis (wraps).
    pub z: i64,
    /// Color of the seeded cell.
    pub rgb: Rgb,
}

impl Seed {
    /// Construct a seed placement.
    pub const fn new(x: i64, y: i64, z: i64, rgb: Rgb) -> Self {
        Self { x, y, z, rgb }
    }
}

/// A seed as written in a configuration file, with unclamped channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SeedSpec {
    /// Position along the x axis.
    pub x: i64,
    /// Position along the y axis.
    pub y: i64,
    /// Position along the z axis.
    pub z: i64,
    /// Requested color; each channel is clamped into `0..=255`.
    pub rgb: [i64; 3],
}

impl From<SeedSpec> for Seed {
    fn from(spec: SeedSpec) -> Self {
        Self::new(spec.x, spec.y, spec.z, Rgb::clamped(spec.rgb))
    }
}

// ---------------------------------------------------------------------------
// Step report
// ---------------------------------------------------------------------------

/// Summary of one simulation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    /// The step number that was executed (the first step is 1).
    pub step: u64,
    /// Live cells before the step.
    pub alive_before: u64,
    /// Live cells after the step.
    pub alive_after: u64,
    /// Cells that transitioned dead to alive.
    pub births: u64,
    /// Cells that transitioned alive to dead.
    pub deaths: u64,
    /// Cells alive both before and after.
    pub survivors: u64,
    /// Newborns perturbed by the per-birth mutation pass.
    pub per_birth_mutations: u64,
    /// Newborns perturbed by the per-step (bursty) mutation pass.
    pub per_step_mutations: u64,
    /// Whether the burst schedule allowed per-step mutation this step.
    pub burst_eligible: bool,
    /// Set when the driving loop should stop.
    pub terminal: Option<TerminalReason>,
}

impl StepInfo {
    /// Total mutation events this step across both passes.
    pub const fn mutations(&self) -> u64 {
        self.per_birth_mutations
            .saturating_add(self.per_step_mutations)
    }

    /// Whether the step raised a terminal signal.
    pub const fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Read-only copy of the grid state, consumed by renderers.
///
/// All three fields are parallel arrays indexed by [`Shape::index`]. The
/// snapshot owns its data; mutating the simulation afterwards never
/// changes an exported snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Lattice extents.
    pub shape: Shape,
    /// Number of steps executed when the snapshot was taken.
    pub step: u64,
    /// Alive flag per cell.
    pub alive: Vec<bool>,
    /// Color per cell; `None` for dead cells.
    pub colors: Vec<Option<Rgb>>,
    /// Age per cell in steps; zero for dead cells and newborns.
    pub ages: Vec<u32>,
}

impl Snapshot {
    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    /// Whether the cell at `c` is alive. Out-of-bounds coordinates are dead.
    pub fn is_alive(&self, c: Coord) -> bool {
        self.shape
            .index(c)
            .and_then(|i| self.alive.get(i).copied())
            .unwrap_or(false)
    }

    /// Color of the cell at `c`, if it is alive.
    pub fn color_at(&self, c: Coord) -> Option<Rgb> {
        self.shape
            .index(c)
            .and_then(|i| self.colors.get(i).copied().flatten())
    }

    /// Age of the cell at `c`, if it is in bounds.
    pub fn age_at(&self, c: Coord) -> Option<u32> {
        self.shape.index(c).and_then(|i| self.ages.get(i).copied())
    }

    /// Iterate live cells as `(coord, color, age)` in index order.
    pub fn live_cells(&self) -> impl Iterator<Item = (Coord, Rgb, u32)> + '_ {
        self.alive
            .iter()
            .zip(self.colors.iter().zip(self.ages.iter()))
            .enumerate()
            .filter_map(|(i, (alive, (color, age)))| {
                if !*alive {
                    return None;
                }
                let c = self.shape.coord(i)?;
                Some((c, (*color)?, *age))
            })
    }
}
