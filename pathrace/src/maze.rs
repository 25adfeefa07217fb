//! Maze generation.
//!
//! Two generators are provided:
//!
//! - [`generate_simple`] blocks every cell independently at random. Fast, but the result may have
//!   no route from start to goal at all.
//! - [`generate_connected`] carves a perfect maze with a randomized depth-first walk. Every cell
//!   reached by the walk is connected to the start.
//!
//! The connected generator moves two cells at a time so that a wall cell is left between carved
//! cells. With odd dimensions the walk covers the far border and the goal is always reachable.
//! With even dimensions the last row and column are never carved: the goal is still forced open,
//! but is usually walled in. That limitation is kept as is, callers have to verify solvability.

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::find::{MapStorage, MapTrait};
use crate::grid::{Cell, Direction, Grid, Point};

/// Which generator to use for new rounds
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum MazeKind {
    /// Each cell is passable with probability `density`
    Simple { density: f64 },
    /// Perfect maze carved from the start
    #[default]
    Connected,
}

impl MazeKind {
    pub fn generate<R: Rng + ?Sized>(&self, rows: usize, columns: usize, rng: &mut R) -> Grid {
        match self {
            MazeKind::Simple { density } => generate_simple(rows, columns, *density, rng),
            MazeKind::Connected => generate_connected(rows, columns, rng),
        }
    }

    /// Whether every generated grid is guaranteed to have a route from start to goal
    pub fn is_always_solvable(&self, rows: usize, columns: usize) -> bool {
        matches!(self, MazeKind::Connected) && rows % 2 == 1 && columns % 2 == 1
    }
}

/// Every cell is passable with probability `density`, except start and goal which always are.
pub fn generate_simple<R: Rng + ?Sized>(
    rows: usize,
    columns: usize,
    density: f64,
    rng: &mut R,
) -> Grid {
    let mut grid = Grid::new(rows, columns, Cell::Blocked);

    for row in 0..rows {
        for col in 0..columns {
            if rng.gen::<f64>() < density {
                grid.set(Point::new(row, col), Cell::Passable);
            }
        }
    }

    grid.set(grid.start(), Cell::Passable);
    grid.set(grid.goal(), Cell::Passable);
    grid
}

/// One level of the carving walk: the cell, its shuffled directions and how many of them have
/// been tried so far.
struct Frame {
    at: Point,
    directions: [Direction; 4],
    next: usize,
}

impl Frame {
    fn new<R: Rng + ?Sized>(at: Point, rng: &mut R) -> Self {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        Self {
            at,
            directions,
            next: 0,
        }
    }
}

/// Carves a perfect maze out of a fully blocked grid, starting at the top-left corner.
///
/// This is a recursive backtracker run on an explicit stack. A cell's directions are shuffled
/// when the cell is entered and tried one by one each time the walk returns to it.
pub fn generate_connected<R: Rng + ?Sized>(rows: usize, columns: usize, rng: &mut R) -> Grid {
    let mut grid = Grid::new(rows, columns, Cell::Blocked);
    if rows == 0 || columns == 0 {
        return grid;
    }

    let mut visited = grid.create_storage::<bool>();

    let start = grid.start();
    *visited.get_mut(start) = true;
    grid.set(start, Cell::Passable);

    let mut stack = vec![Frame::new(start, rng)];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.directions.len() {
            // all directions tried, backtrack
            stack.pop();
            continue;
        }
        let direction = frame.directions[frame.next];
        frame.next += 1;
        let at = frame.at;

        let Some(wall) = grid.neighbor(at, direction) else {
            continue;
        };
        let Some(next) = grid.neighbor(wall, direction) else {
            continue;
        };
        if visited.get(next) {
            continue;
        }

        *visited.get_mut(next) = true;
        grid.set(wall, Cell::Passable);
        grid.set(next, Cell::Passable);
        stack.push(Frame::new(next, rng));
    }

    grid.set(grid.goal(), Cell::Passable);
    grid
}
