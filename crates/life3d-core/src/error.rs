//! Grid consistency violations.
//!
//! A correct engine never produces any of these. They are surfaced to the
//! caller instead of being silently repaired so a bug cannot hide behind a
//! plausible-looking grid.

/// A broken invariant between the alive, color, and age fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateInvariantError {
    /// A dead cell has a non-zero age.
    #[error("dead cell {index} has age {age}")]
    DeadCellAged {
        /// Flat index of the offending cell.
        index: usize,
        /// The stale age.
        age: u32,
    },

    /// A dead cell still carries a color.
    #[error("dead cell {index} still carries a color")]
    DeadCellColored {
        /// Flat index of the offending cell.
        index: usize,
    },

    /// A live cell has no color.
    #[error("live cell {index} has no color")]
    LiveCellUncolored {
        /// Flat index of the offending cell.
        index: usize,
    },

    /// Color inheritance tried to read a dead cell's color.
    #[error("attempted to read the color of dead cell {index}")]
    ColorReadFromDeadCell {
        /// Flat index of the dead cell.
        index: usize,
    },

    /// One of the per-cell fields has the wrong length.
    #[error("field {field} has {actual} cells, expected {expected}")]
    FieldLength {
        /// Which field is mis-sized.
        field: &'static str,
        /// Cell count of the lattice.
        expected: usize,
        /// Length of the field.
        actual: usize,
    },
}
