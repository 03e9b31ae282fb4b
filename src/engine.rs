use crate::grid::{CellView, Grid};

/// B3/S23.
#[inline]
pub fn next_state(alive: bool, live_neighbors: u8) -> bool {
    matches!((alive, live_neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// Advance `grid` one generation in place.
///
/// Every neighbor count is taken from the pre-step state before any cell is
/// written, so the sweep order has no effect on the result.
pub fn step(grid: &mut Grid) {
    let counts: Vec<u8> = grid.cells().map(|c| grid.live_neighbor_count(&c)).collect();
    for (alive, n) in grid.raw_mut().iter_mut().zip(counts) {
        *alive = next_state(*alive, n);
    }
}

/// Write the generation after `current` into `next`. Both grids must share
/// dimensions.
pub fn step_into(current: &Grid, next: &mut Grid) {
    assert_eq!(
        (current.width(), current.height()),
        (next.width(), next.height())
    );
    for (cell, out) in current.cells().zip(next.raw_mut().iter_mut()) {
        *out = next_state(cell.alive, current.live_neighbor_count(&cell));
    }
}

/// Double-buffered generation engine. Owns the current grid and a scratch
/// buffer; each step fills the scratch buffer and swaps.
#[derive(Clone, Debug)]
pub struct Engine {
    current: Grid,
    next: Grid,
    generation: u64,
}

impl Engine {
    pub fn new(seed: Grid) -> Self {
        let next = seed.clone();
        Self {
            current: seed,
            next,
            generation: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.current
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn step(&mut self) -> &Grid {
        step_into(&self.current, &mut self.next);
        std::mem::swap(&mut self.current, &mut self.next);
        self.generation += 1;
        &self.current
    }

    /// True when the last step changed nothing.
    pub fn is_still(&self) -> bool {
        self.generation > 0 && self.current.raw() == self.next.raw()
    }
}
