use crate::find::{MapStorage, MapTrait, NodeReference};
use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Blocked,
    Passable,
}

impl Cell {
    pub fn is_passable(&self) -> bool {
        matches!(self, Cell::Passable)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Cell::Blocked => "#",
                Cell::Passable => ".",
            }
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// The fixed order in which neighbours are visited. Searches and maze carving both rely on
    /// it, so it decides which of several equally short paths is returned.
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// (row, col) delta of one step in this direction
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Up => (-1, 0),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Up => "up",
                Direction::Down => "down",
                Direction::Left => "left",
                Direction::Right => "right",
            }
        )
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(anyhow::anyhow!("Invalid direction: {}", s)),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The point one step away in `direction`, or None if that would underflow.
    /// The upper bounds are checked by the grid.
    pub fn step(&self, direction: Direction) -> Option<Point> {
        let (dr, dc) = direction.delta();
        Some(Point {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }

    pub fn manhattan(&self, other: Point) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl NodeReference for Point {}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A rectangular maze of passable and blocked cells, stored row-major in a single vec.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, columns: usize, fill: Cell) -> Self {
        Self {
            rows,
            columns,
            cells: vec![fill; rows * columns],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Top-left corner, where both players start
    pub fn start(&self) -> Point {
        Point::new(0, 0)
    }

    /// Bottom-right corner
    pub fn goal(&self) -> Point {
        Point::new(self.rows.saturating_sub(1), self.columns.saturating_sub(1))
    }

    fn index(&self, point: Point) -> Option<usize> {
        if point.row < self.rows && point.col < self.columns {
            Some(point.row * self.columns + point.col)
        } else {
            None
        }
    }

    pub fn get(&self, point: Point) -> Option<Cell> {
        self.index(point).map(|i| self.cells[i])
    }

    /// Sets a cell, points outside the grid are ignored.
    pub fn set(&mut self, point: Point, cell: Cell) {
        if let Some(i) = self.index(point) {
            self.cells[i] = cell;
        }
    }

    pub fn is_passable(&self, point: Point) -> bool {
        self.get(point).is_some_and(|c| c.is_passable())
    }

    /// The in-bounds neighbour of `point` in `direction`, regardless of its cell.
    pub fn neighbor(&self, point: Point, direction: Direction) -> Option<Point> {
        point.step(direction).filter(|p| self.is_valid(*p))
    }

    /// Iterates over all points together with their cells, row by row
    pub fn iter(&self) -> impl Iterator<Item = (Point, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (Point::new(i / self.columns, i % self.columns), *cell))
    }
}

impl FromStr for Grid {
    type Err = anyhow::Error;

    /// Parses a grid drawn with `#` for blocked and `.` for passable cells, as printed by
    /// `Display`. Surrounding whitespace and blank lines are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s.lines().filter(|l| !l.trim().is_empty()).collect();
        let columns = lines.first().map(|l| l.trim().chars().count()).unwrap_or(0);

        let mut cells = Vec::with_capacity(lines.len() * columns);
        for (row, line) in lines.iter().enumerate() {
            let line = line.trim();
            if line.chars().count() != columns {
                anyhow::bail!(
                    "row {} has {} cells, expected {}",
                    row,
                    line.chars().count(),
                    columns
                );
            }
            for c in line.chars() {
                cells.push(match c {
                    '#' => Cell::Blocked,
                    '.' => Cell::Passable,
                    _ => anyhow::bail!("invalid cell character {:?} in row {}", c, row),
                });
            }
        }

        Ok(Grid {
            rows: lines.len(),
            columns,
            cells,
        })
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.columns.max(1)) {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

/// A MapStorage with one value per grid cell
#[derive(Debug)]
pub struct CellStorage<T> {
    columns: usize,
    values: Vec<T>,
}

impl<T: Copy + 'static> MapStorage<T> for CellStorage<T> {
    type Reference = Point;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.col < self.columns && node.row * self.columns + node.col < self.values.len()
    }

    fn get(&self, node: Self::Reference) -> T {
        self.values[node.row * self.columns + node.col]
    }

    fn get_mut(&mut self, node: Self::Reference) -> &mut T {
        &mut self.values[node.row * self.columns + node.col]
    }
}

impl<T: Display> Display for CellStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.values.chunks(self.columns.max(1)) {
            for value in row {
                write!(f, "{}", value)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl MapTrait for Grid {
    type Reference = Point;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.row < self.rows && node.col < self.columns
    }

    fn is_passable(&self, node: Self::Reference) -> bool {
        Grid::is_passable(self, node)
    }

    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference> {
        let mut points = Vec::with_capacity(4);

        if self.is_passable(node) {
            for direction in Direction::ALL {
                if let Some(p) = self.neighbor(node, direction) {
                    points.push(p);
                }
            }
        }

        // filter to only keep passable cells
        points.retain(|p| self.is_passable(*p));

        points.into_iter()
    }

    fn heuristic(&self, from: Self::Reference, to: Self::Reference) -> usize {
        from.manhattan(to)
    }

    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T> {
        CellStorage {
            columns: self.columns,
            values: vec![Default::default(); self.rows * self.columns],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn create_basic_map() -> Grid {
        "
        #######
        #.###.#
        #.###.#
        #.#...#
        #.#.###
        #......
        #######
        "
        .parse()
        .unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let map = create_basic_map();
        assert_eq!(map.rows(), 7);
        assert_eq!(map.columns(), 7);
        assert_eq!(map.get(Point::new(1, 1)), Some(Cell::Passable));
        assert_eq!(map.get(Point::new(0, 0)), Some(Cell::Blocked));
        assert_eq!(map.get(Point::new(7, 0)), None);

        let printed = map.to_string();
        assert_eq!(printed.lines().next(), Some("#######"));
        assert_eq!(printed.lines().nth(5), Some("#......"));
    }

    #[test]
    fn test_display_parses_back() {
        let map = create_basic_map();
        assert_eq!(map.to_string().parse::<Grid>().unwrap(), map);
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        assert!("..\n...".parse::<Grid>().is_err());
        assert!("..\n.x".parse::<Grid>().is_err());
    }

    #[test]
    fn test_neighbors_fixed_order() {
        let map = Grid::new(3, 3, Cell::Passable);
        let neighbors: Vec<Point> = map.neighbors_of(Point::new(1, 1)).collect();
        assert_eq!(
            neighbors,
            vec![
                Point::new(1, 2),
                Point::new(2, 1),
                Point::new(1, 0),
                Point::new(0, 1)
            ]
        );
    }

    #[test]
    fn test_neighbors_stay_inside_and_skip_blocked() {
        let map = create_basic_map();
        // corner of the open corridor on the right border
        let neighbors: Vec<Point> = map.neighbors_of(Point::new(5, 6)).collect();
        assert_eq!(neighbors, vec![Point::new(5, 5)]);

        // blocked cells have no neighbors at all
        assert_eq!(map.neighbors_of(Point::new(0, 0)).count(), 0);
    }

    #[test]
    fn test_point_step_underflow() {
        assert_eq!(Point::new(0, 0).step(Direction::Up), None);
        assert_eq!(Point::new(0, 0).step(Direction::Left), None);
        assert_eq!(
            Point::new(0, 0).step(Direction::Down),
            Some(Point::new(1, 0))
        );
        assert_eq!(Point::new(2, 5).manhattan(Point::new(4, 1)), 6);
    }

    #[test]
    fn test_direction_from_str() {
        for direction in Direction::ALL {
            assert_eq!(
                direction.to_string().parse::<Direction>().unwrap(),
                direction
            );
        }
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn test_storage_layout() {
        let map = Grid::new(2, 3, Cell::Passable);
        let mut storage = map.create_storage::<usize>();
        *storage.get_mut(Point::new(1, 2)) = 7;
        assert_eq!(storage.get(Point::new(1, 2)), 7);
        assert_eq!(storage.get(Point::new(0, 2)), 0);
        assert!(storage.is_valid(Point::new(1, 2)));
        assert!(!storage.is_valid(Point::new(2, 0)));
        assert_eq!(storage.to_string(), "000\n007\n");
    }
}
