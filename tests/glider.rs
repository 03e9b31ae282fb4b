use lifeterm::{step, EdgePolicy, Engine, Grid};
use pretty_assertions::assert_eq;

const GLIDER: [(usize, usize); 5] = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];

fn shifted(cells: &[(usize, usize)], dx: usize, dy: usize) -> Vec<(usize, usize)> {
    cells.iter().map(|&(x, y)| (x + dx, y + dy)).collect()
}

#[test]
fn glider_moves_one_diagonal_every_four_steps() {
    let mut grid = Grid::with_alive(12, 12, EdgePolicy::Skip, &GLIDER);
    for _ in 0..4 {
        step(&mut grid);
    }
    let expected = Grid::with_alive(12, 12, EdgePolicy::Skip, &shifted(&GLIDER, 1, 1));
    assert_eq!(grid, expected);
}

#[test]
fn glider_travels_across_bounded_grid() {
    let mut engine = Engine::new(Grid::with_alive(16, 16, EdgePolicy::Skip, &GLIDER));
    for n in 1..=8 {
        for _ in 0..4 {
            engine.step();
        }
        let expected = Grid::with_alive(16, 16, EdgePolicy::Skip, &shifted(&GLIDER, n, n));
        assert_eq!(engine.grid(), &expected, "after {} generations", n * 4);
    }
}

#[test]
fn glider_dies_into_bounded_corner() {
    // With absent neighbors the glider turns into a block at the corner.
    let mut engine = Engine::new(Grid::with_alive(6, 6, EdgePolicy::Skip, &GLIDER));
    for _ in 0..40 {
        engine.step();
    }
    let block = Grid::with_alive(6, 6, EdgePolicy::Skip, &[(4, 4), (5, 4), (4, 5), (5, 5)]);
    assert_eq!(engine.grid(), &block);
    engine.step();
    assert!(engine.is_still());
}
