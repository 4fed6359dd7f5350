//! Lattice geometry: toroidal wrapping and Chebyshev neighborhoods.
//!
//! The lattice is a 3-torus. Every neighborhood is a fixed table of
//! [`Offset`]s built once per run, and every per-offset read goes through
//! [`Torus::neighbor_index`], which wraps each axis independently.
//!
//! Offsets contribute independently. On a grid narrower than the window a
//! single physical cell can be reached through several offsets and is then
//! counted once per offset, exactly as if the field had been rolled along
//! each offset and summed.

use life3d_types::{Coord, Offset, Shape};

/// Radius of the neighborhood used for the birth/survive count.
pub const MOORE_RADIUS: u8 = 1;

/// Radius of the window that newborns inherit color from.
pub const INHERITANCE_RADIUS: u8 = 2;

/// Largest lattice accepted, in cells (just over 320 cubed).
pub const MAX_CELLS: usize = 1 << 25;

// ---------------------------------------------------------------------------
// Neighborhood
// ---------------------------------------------------------------------------

/// Fixed table of offsets within a Chebyshev radius, center excluded.
///
/// Offsets are ordered `dz`, then `dy`, then `dx`, each ascending from
/// `-radius` to `radius`. Random draws over neighbors consume candidates in
/// this order, so the order is part of the determinism contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighborhood {
    offsets: Vec<Offset>,
}

impl Neighborhood {
    /// Build the table for the given Chebyshev radius.
    pub fn chebyshev(radius: u8) -> Self {
        let r = i32::from(radius);
        let lo = 0_i32.saturating_sub(r);
        let mut offsets = Vec::new();
        for dz in lo..=r {
            for dy in lo..=r {
                for dx in lo..=r {
                    let offset = Offset::new(dx, dy, dz);
                    if !offset.is_center() {
                        offsets.push(offset);
                    }
                }
            }
        }
        Self { offsets }
    }

    /// The 26-cell Moore neighborhood.
    pub fn moore() -> Self {
        Self::chebyshev(MOORE_RADIUS)
    }

    /// The 124-cell color inheritance window.
    pub fn inheritance_window() -> Self {
        Self::chebyshev(INHERITANCE_RADIUS)
    }

    /// Offsets in table order.
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// Number of offsets in the table.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the table is empty (radius 0).
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Torus
// ---------------------------------------------------------------------------

/// A validated lattice shape with toroidal addressing.
///
/// Construction guarantees every extent is positive and the cell count is
/// at most [`MAX_CELLS`], so wrapping never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Torus {
    shape: Shape,
    len: usize,
}

impl Torus {
    /// Validate `shape` and build the torus.
    ///
    /// Returns `None` when an extent is zero or the total cell count
    /// exceeds [`MAX_CELLS`].
    pub fn new(shape: Shape) -> Option<Self> {
        if !shape.is_valid() {
            return None;
        }
        let len = shape.cell_count().filter(|n| *n <= MAX_CELLS)?;
        Some(Self { shape, len })
    }

    /// The lattice extents.
    pub const fn shape(&self) -> Shape {
        self.shape
    }

    /// Total number of cells.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false; a torus has at least one cell.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wrap signed coordinates into the lattice.
    pub fn wrap(&self, x: i64, y: i64, z: i64) -> Coord {
        Coord::new(
            wrap_axis(x, self.shape.x),
            wrap_axis(y, self.shape.y),
            wrap_axis(z, self.shape.z),
        )
    }

    /// The coordinate reached from `c` by `offset`, wrapped.
    pub fn shift(&self, c: Coord, offset: Offset) -> Coord {
        self.wrap(
            i64::from(c.x).saturating_add(i64::from(offset.dx)),
            i64::from(c.y).saturating_add(i64::from(offset.dy)),
            i64::from(c.z).saturating_add(i64::from(offset.dz)),
        )
    }

    /// Flat index of the cell reached from `index` by `offset`.
    pub fn neighbor_index(&self, index: usize, offset: Offset) -> Option<usize> {
        let c = self.shape.coord(index)?;
        self.shape.index(self.shift(c, offset))
    }

    /// A read-only view of `field` as seen through `offset`.
    pub const fn shifted<'a, T>(&'a self, field: &'a [T], offset: Offset) -> ShiftedView<'a, T> {
        ShiftedView {
            torus: self,
            field,
            offset,
        }
    }
}

fn wrap_axis(v: i64, extent: u32) -> u32 {
    v.checked_rem_euclid(i64::from(extent))
        .and_then(|w| u32::try_from(w).ok())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Shifted view
// ---------------------------------------------------------------------------

/// A same-shaped view of a per-cell field displaced by an offset.
///
/// `view.get(i)` reads `field[wrap(coord(i) + offset)]`. Nothing is copied.
#[derive(Debug, Clone, Copy)]
pub struct ShiftedView<'a, T> {
    torus: &'a Torus,
    field: &'a [T],
    offset: Offset,
}

impl<T: Copy> ShiftedView<'_, T> {
    /// Value seen at flat index `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.torus
            .neighbor_index(index, self.offset)
            .and_then(|j| self.field.get(j).copied())
    }

    /// The offset this view is displaced by.
    pub const fn offset(&self) -> Offset {
        self.offset
    }

    /// Iterate the view in index order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.field.len()).filter_map(|i| self.get(i))
    }
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Live-neighbor count per cell, accumulated over every offset of `hood`.
///
/// With the Moore table each count is in `[0, 26]`.
pub fn neighbor_counts(torus: &Torus, hood: &Neighborhood, alive: &[bool]) -> Vec<u8> {
    let mut counts = vec![0_u8; alive.len()];
    for &offset in hood.offsets() {
        let view = torus.shifted(alive, offset);
        for (i, count) in counts.iter_mut().enumerate() {
            if view.get(i).unwrap_or(false) {
                *count = count.saturating_add(1);
            }
        }
    }
    counts
}

/// The window of cell `index` as `(neighbor_index, chebyshev_distance)`,
/// in table order.
pub fn window<'a>(
    torus: &'a Torus,
    hood: &'a Neighborhood,
    index: usize,
) -> impl Iterator<Item = (usize, u32)> + 'a {
    hood.offsets().iter().filter_map(move |&offset| {
        torus
            .neighbor_index(index, offset)
            .map(|j| (j, offset.chebyshev()))
    })
}
