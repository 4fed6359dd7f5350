//! Age tracking.
//!
//! Survivors age by one step, newborns start at zero, and dead cells are
//! reset to zero.

/// Ages after a step, given the alive masks on either side of it.
pub fn advance(alive: &[bool], next_alive: &[bool], ages: &[u32]) -> Vec<u32> {
    alive
        .iter()
        .zip(next_alive)
        .zip(ages)
        .map(|((was, is), age)| match (*was, *is) {
            (true, true) => age.saturating_add(1),
            _ => 0,
        })
        .collect()
}
