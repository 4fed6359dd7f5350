//! The cell grid: alive, color, and age fields over one index space.
//!
//! A grid is built once per run from a seed list and replaced wholesale on
//! every step; the step pipeline never edits a grid in place.

use life3d_types::{Rgb, Seed, Shape, Snapshot};

use crate::error::StateInvariantError;
use crate::geometry::Torus;

/// Alive flags, colors, and ages of every cell.
///
/// A dead cell has no color and age zero; a live cell always has a color.
/// [`Grid::check_invariants`] verifies both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    shape: Shape,
    alive: Vec<bool>,
    colors: Vec<Option<Rgb>>,
    ages: Vec<u32>,
}

impl Grid {
    /// An all-dead grid.
    pub fn empty(torus: &Torus) -> Self {
        let n = torus.len();
        Self {
            shape: torus.shape(),
            alive: vec![false; n],
            colors: vec![None; n],
            ages: vec![0; n],
        }
    }

    /// A grid with one live, age-zero cell per seed.
    ///
    /// Seed coordinates wrap modulo the extents. When two seeds land on the
    /// same cell the later one wins.
    pub fn seeded(torus: &Torus, seeds: &[Seed]) -> Self {
        let mut grid = Self::empty(torus);
        let shape = torus.shape();
        for seed in seeds {
            let c = torus.wrap(seed.x, seed.y, seed.z);
            let Some(i) = shape.index(c) else { continue };
            if let (Some(a), Some(col)) = (grid.alive.get_mut(i), grid.colors.get_mut(i)) {
                *a = true;
                *col = Some(seed.rgb);
            }
        }
        grid
    }

    /// Assemble a grid from already computed fields.
    pub(crate) const fn from_parts(
        shape: Shape,
        alive: Vec<bool>,
        colors: Vec<Option<Rgb>>,
        ages: Vec<u32>,
    ) -> Self {
        Self {
            shape,
            alive,
            colors,
            ages,
        }
    }

    /// Lattice extents.
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Alive flag per cell.
    pub fn alive(&self) -> &[bool] {
        &self.alive
    }

    /// Color per cell.
    pub fn colors(&self) -> &[Option<Rgb>] {
        &self.colors
    }

    /// Age per cell.
    pub fn ages(&self) -> &[u32] {
        &self.ages
    }

    /// Whether cell `index` is alive. Out-of-range indices are dead.
    pub fn is_alive(&self, index: usize) -> bool {
        self.alive.get(index).copied().unwrap_or(false)
    }

    /// Color of a live cell.
    ///
    /// Reading a dead cell is an invariant violation, never a fallback.
    pub fn color_of(&self, index: usize) -> Result<Rgb, StateInvariantError> {
        if !self.is_alive(index) {
            return Err(StateInvariantError::ColorReadFromDeadCell { index });
        }
        self.colors
            .get(index)
            .copied()
            .flatten()
            .ok_or(StateInvariantError::LiveCellUncolored { index })
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.alive.iter().filter(|a| **a).count()
    }

    /// Verify field lengths and the alive/color/age relationship.
    pub fn check_invariants(&self) -> Result<(), StateInvariantError> {
        let expected = self.alive.len();
        for (field, actual) in [("colors", self.colors.len()), ("ages", self.ages.len())] {
            if actual != expected {
                return Err(StateInvariantError::FieldLength {
                    field,
                    expected,
                    actual,
                });
            }
        }
        let cells = self.alive.iter().zip(&self.colors).zip(&self.ages);
        for (index, ((alive, color), age)) in cells.enumerate() {
            match (*alive, color.is_some(), *age) {
                (true, false, _) => return Err(StateInvariantError::LiveCellUncolored { index }),
                (false, true, _) => return Err(StateInvariantError::DeadCellColored { index }),
                (false, _, age) if age != 0 => {
                    return Err(StateInvariantError::DeadCellAged { index, age });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Owned copy of the grid for export.
    pub fn snapshot(&self, step: u64) -> Snapshot {
        Snapshot {
            shape: self.shape,
            step,
            alive: self.alive.clone(),
            colors: self.colors.clone(),
            ages: self.ages.clone(),
        }
    }
}
