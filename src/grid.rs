use rand::Rng;
use serde::{Deserialize, Serialize};

/// How lookups past the border are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Positions outside the grid do not exist and are never counted.
    #[default]
    Skip,
    /// Coordinates wrap around (torus).
    Wrap,
    /// Coordinates are pulled back to the nearest border cell.
    Clamp,
}

impl EdgePolicy {
    /// Map a possibly out-of-range coordinate pair onto the grid.
    pub fn resolve(self, width: usize, height: usize, x: i64, y: i64) -> Option<(usize, usize)> {
        let (w, h) = (width as i64, height as i64);
        match self {
            EdgePolicy::Skip => {
                if x < 0 || y < 0 || x >= w || y >= h {
                    None
                } else {
                    Some((x as usize, y as usize))
                }
            }
            EdgePolicy::Wrap => Some((x.rem_euclid(w) as usize, y.rem_euclid(h) as usize)),
            EdgePolicy::Clamp => Some((x.clamp(0, w - 1) as usize, y.clamp(0, h - 1) as usize)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub alive: bool,
}

/// Read access to a board of cells. Implemented by [`Grid`] and by the
/// shared atomic mirror the renderer reads in relaxed mode.
pub trait CellView {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn is_alive(&self, x: usize, y: usize) -> bool;
}

/// Fixed-size board stored row-major, index = `y * width + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    edge: EdgePolicy,
    cells: Vec<bool>,
}

const OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl Grid {
    pub fn empty(width: usize, height: usize, edge: EdgePolicy) -> Self {
        assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            edge,
            cells: vec![false; width * height],
        }
    }

    /// Seed every cell with an independent Bernoulli trial.
    pub fn populate<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        edge: EdgePolicy,
        alive_probability: f64,
        rng: &mut R,
    ) -> Self {
        let mut grid = Self::empty(width, height, edge);
        for y in 0..height {
            for x in 0..width {
                let i = grid.idx(x, y);
                grid.cells[i] = rng.gen_bool(alive_probability);
            }
        }
        grid
    }

    /// Build a grid with exactly the listed positions alive. Positions off the
    /// board are ignored.
    pub fn with_alive(
        width: usize,
        height: usize,
        edge: EdgePolicy,
        alive: &[(usize, usize)],
    ) -> Self {
        let mut grid = Self::empty(width, height, edge);
        for &(x, y) in alive {
            grid.set(x, y, true);
        }
        grid
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn edge(&self) -> EdgePolicy {
        self.edge
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        if x < self.width && y < self.height {
            let i = self.idx(x, y);
            self.cells[i] = alive;
        }
    }

    /// Look a cell up, translating out-of-range coordinates with the grid's
    /// edge policy. `None` only under [`EdgePolicy::Skip`].
    pub fn cell_at(&self, x: i64, y: i64) -> Option<Cell> {
        let (x, y) = self.edge.resolve(self.width, self.height, x, y)?;
        Some(Cell {
            x,
            y,
            alive: self.cells[self.idx(x, y)],
        })
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let w = self.width;
        self.cells.iter().enumerate().map(move |(i, &alive)| Cell {
            x: i % w,
            y: i / w,
            alive,
        })
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&a| a).count()
    }

    /// Live cells among the up to 8 positions around `cell`, in `[0, 8]`.
    pub fn live_neighbor_count(&self, cell: &Cell) -> u8 {
        let (cx, cy) = (cell.x as i64, cell.y as i64);
        let mut count = 0;
        for (dx, dy) in OFFSETS {
            if let Some(n) = self.cell_at(cx + dx, cy + dy) {
                if n.alive {
                    count += 1;
                }
            }
        }
        count
    }

    pub(crate) fn raw(&self) -> &[bool] {
        &self.cells
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }
}

impl CellView for Grid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn is_alive(&self, x: usize, y: usize) -> bool {
        self.cells[self.idx(x, y)]
    }
}
