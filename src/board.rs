//! The board shared between the update loop and the render loop.

use crate::grid::{CellView, Grid};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    /// Whole generations are published as immutable snapshots.
    #[default]
    Buffered,
    /// Cells are published one at a time; a frame may mix two generations.
    Relaxed,
}

/// A published generation.
#[derive(Clone, Debug)]
pub struct Frame {
    pub generation: u64,
    pub grid: Arc<Grid>,
}

pub struct RelaxedBoard {
    width: usize,
    height: usize,
    cells: Vec<AtomicBool>,
    generation: AtomicU64,
}

impl RelaxedBoard {
    fn new(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: grid.cells().map(|c| AtomicBool::new(c.alive)).collect(),
            generation: AtomicU64::new(0),
        }
    }
}

impl CellView for RelaxedBoard {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn is_alive(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x].load(Ordering::Relaxed)
    }
}

pub enum Board {
    Buffered(RwLock<Frame>),
    Relaxed(RelaxedBoard),
}

impl Board {
    pub fn new(seed: &Grid, consistency: Consistency) -> Self {
        match consistency {
            Consistency::Buffered => Board::Buffered(RwLock::new(Frame {
                generation: 0,
                grid: Arc::new(seed.clone()),
            })),
            Consistency::Relaxed => Board::Relaxed(RelaxedBoard::new(seed)),
        }
    }

    pub fn consistency(&self) -> Consistency {
        match self {
            Board::Buffered(_) => Consistency::Buffered,
            Board::Relaxed(_) => Consistency::Relaxed,
        }
    }

    pub fn publish(&self, grid: &Grid, generation: u64) {
        match self {
            Board::Buffered(slot) => {
                let frame = Frame {
                    generation,
                    grid: Arc::new(grid.clone()),
                };
                *slot.write().unwrap_or_else(PoisonError::into_inner) = frame;
            }
            Board::Relaxed(board) => {
                for (dst, cell) in board.cells.iter().zip(grid.cells()) {
                    dst.store(cell.alive, Ordering::Relaxed);
                }
                board.generation.store(generation, Ordering::Release);
            }
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Board::Buffered(slot) => slot.read().unwrap_or_else(PoisonError::into_inner).generation,
            Board::Relaxed(board) => board.generation.load(Ordering::Acquire),
        }
    }

    /// Run `f` against the current board contents. In buffered mode the
    /// snapshot is taken up front and the lock is not held while `f` runs.
    pub fn with_view<T>(&self, f: impl FnOnce(&dyn CellView, u64) -> T) -> T {
        match self {
            Board::Buffered(slot) => {
                let frame = slot.read().unwrap_or_else(PoisonError::into_inner).clone();
                f(frame.grid.as_ref(), frame.generation)
            }
            Board::Relaxed(board) => {
                let generation = board.generation.load(Ordering::Acquire);
                f(board, generation)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::EdgePolicy;

    fn alive_set(view: &dyn CellView) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for y in 0..view.height() {
            for x in 0..view.width() {
                if view.is_alive(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn both_modes_publish_the_same_cells() {
        let seed = Grid::with_alive(4, 3, EdgePolicy::Skip, &[(0, 0)]);
        let next = Grid::with_alive(4, 3, EdgePolicy::Skip, &[(3, 2), (1, 1)]);
        for mode in [Consistency::Buffered, Consistency::Relaxed] {
            let board = Board::new(&seed, mode);
            assert_eq!(board.consistency(), mode);
            assert_eq!(board.with_view(|v, _| alive_set(v)), vec![(0, 0)]);
            board.publish(&next, 9);
            assert_eq!(board.generation(), 9);
            let (cells, gen) = board.with_view(|v, g| (alive_set(v), g));
            assert_eq!(cells, vec![(1, 1), (3, 2)]);
            assert_eq!(gen, 9);
        }
    }

    #[test]
    fn buffered_snapshot_survives_publish() {
        let seed = Grid::with_alive(2, 2, EdgePolicy::Skip, &[(0, 0)]);
        let board = Board::new(&seed, Consistency::Buffered);
        let Board::Buffered(slot) = &board else {
            unreachable!()
        };
        let held = slot.read().unwrap().clone();
        board.publish(&Grid::empty(2, 2, EdgePolicy::Skip), 1);
        assert_eq!(held.generation, 0);
        assert_eq!(held.grid.population(), 1);
        assert_eq!(board.with_view(|v, _| alive_set(v)), Vec::new());
    }
}
