use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
    fmt::Display,
    ops::{Deref, DerefMut},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, comparable and not references (hence 'static)
pub trait NodeReference: Copy + Eq + 'static {}

pub trait MapTrait {
    /// The type that can be used to reference nodes in the map
    type Reference: NodeReference;

    /// The type that the map uses for storage
    type Storage<T: Default + Copy + Clone + 'static>: MapStorage<T, Reference = Self::Reference>;

    /// Check if the provided node reference lies inside the map
    fn is_valid(&self, node: Self::Reference) -> bool;

    /// Check if the provided node can be stood on. Invalid nodes are never passable.
    fn is_passable(&self, node: Self::Reference) -> bool;

    /// Return an iterator over the passable neighbors of the provided node. Every move costs one
    /// step.
    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference>;

    /// Estimated number of steps between two nodes. Must never overestimate.
    fn heuristic(&self, from: Self::Reference, to: Self::Reference) -> usize;

    /// Create a storage for values of type T
    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T>;
}

pub trait MapStorage<T> {
    type Reference: NodeReference;

    fn is_valid(&self, node: Self::Reference) -> bool;
    fn get(&self, node: Self::Reference) -> T;
    fn get_mut(&mut self, node: Self::Reference) -> &mut T;
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Breadth-first search, expands nodes in the order they were discovered
    Bfs,
    /// A* with the map heuristic (Manhattan distance on grids)
    #[default]
    AStar,
}

impl Algorithm {
    /// Runs a complete search on the map
    pub fn find<M: MapTrait>(
        &self,
        map: &M,
        start: M::Reference,
        goal: M::Reference,
    ) -> Option<Path<M::Reference>> {
        let (state, _) = PathFinder::new(*self, start, goal, map).finish(map);
        match state {
            PathFinderState::PathFound(result) => Some(result.path),
            _ => None,
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Algorithm::Bfs => "bfs",
                Algorithm::AStar => "astar",
            }
        )
    }
}

impl FromStr for Algorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(Algorithm::Bfs),
            "astar" | "a*" => Ok(Algorithm::AStar),
            _ => Err(anyhow::anyhow!("Invalid algorithm: {}", s)),
        }
    }
}

/// Breadth-first search from `start` to `goal`. Returns a path with the fewest steps, or None
/// if the goal can not be reached.
pub fn bfs<M: MapTrait>(
    map: &M,
    start: M::Reference,
    goal: M::Reference,
) -> Option<Path<M::Reference>> {
    Algorithm::Bfs.find(map, start, goal)
}

/// A* search from `start` to `goal`. Returns a path with the fewest steps, or None if the goal
/// can not be reached.
pub fn astar<M: MapTrait>(
    map: &M,
    start: M::Reference,
    goal: M::Reference,
) -> Option<Path<M::Reference>> {
    Algorithm::AStar.find(map, start, goal)
}

/// An ordered sequence of nodes from start to goal (both included). Never empty.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Path<R> {
    cells: Vec<R>,
}

impl<R: Copy> Path<R> {
    fn new(cells: Vec<R>) -> Self {
        debug_assert!(!cells.is_empty());
        Self { cells }
    }

    /// Number of moves, one less than the number of cells
    pub fn steps(&self) -> usize {
        self.cells.len() - 1
    }

    pub fn start(&self) -> R {
        self.cells[0]
    }

    pub fn goal(&self) -> R {
        self.cells[self.cells.len() - 1]
    }

    pub fn into_inner(self) -> Vec<R> {
        self.cells
    }
}

impl<R> Deref for Path<R> {
    type Target = [R];

    fn deref(&self) -> &Self::Target {
        &self.cells
    }
}

/// The objects that we store in the priority queue
#[derive(Debug)]
struct ToVisit<R: Eq> {
    /// g + h
    estimate: usize,
    heuristic: usize,
    /// insertion order, last resort tie breaker
    order: usize,
    cost: usize,
    point: R,
}

impl<R: Eq> Ord for ToVisit<R> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.estimate, self.heuristic, self.order)
            .cmp(&(other.estimate, other.heuristic, other.order))
            .reverse() // reverse for BinaryHeap to be a min-heap
    }
}

impl<R: Eq> PartialOrd for ToVisit<R> {
    fn partial_cmp(&self, other: &ToVisit<R>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: Eq> PartialEq for ToVisit<R> {
    fn eq(&self, other: &ToVisit<R>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R: Eq> Eq for ToVisit<R> {}

#[derive(Debug)]
enum Frontier<R: Eq> {
    Queue(VecDeque<R>),
    Heap(BinaryHeap<ToVisit<R>>),
}

#[derive(Clone, Copy, Debug)]
pub struct VisitedItem<R> {
    /// Best known number of steps from the start
    pub cost: usize,
    pub from: Option<R>,
    /// Set once the node has been taken off the frontier
    pub expanded: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct Visited<R>(Option<VisitedItem<R>>);

impl<R> Default for Visited<R> {
    fn default() -> Self {
        Visited(None)
    }
}
impl<R> Deref for Visited<R> {
    type Target = Option<VisitedItem<R>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<R> DerefMut for Visited<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
impl<R> Display for Visited<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(item) => write!(f, "{:03} ", item.cost),
            None => write!(f, "{:03} ", ""),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult<R> {
    pub path: Path<R>,
    pub total_cost: usize,
    /// Number of nodes taken off the frontier before the goal was reached
    pub expanded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState<R> {
    Computing,
    NoPathFound,
    PathFound(PathResult<R>),
}

impl<R> PathFinderState<R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

/// An incremental shortest path search. Each call to [`PathFinder::step`] takes one node off the
/// frontier, so the search can be spread over several frames.
pub struct PathFinder<M: MapTrait> {
    algorithm: Algorithm,
    start: M::Reference,
    goal: M::Reference,
    visited: M::Storage<Visited<M::Reference>>,
    frontier: Frontier<M::Reference>,
    state: PathFinderState<M::Reference>,
    pushed: usize,
    expanded: usize,
}

impl<M: MapTrait> PathFinder<M> {
    pub fn new(algorithm: Algorithm, start: M::Reference, goal: M::Reference, map: &M) -> Self {
        let mut finder = Self {
            algorithm,
            start,
            goal,
            visited: map.create_storage(),
            frontier: match algorithm {
                Algorithm::Bfs => Frontier::Queue(VecDeque::new()),
                Algorithm::AStar => Frontier::Heap(BinaryHeap::new()),
            },
            state: PathFinderState::Computing,
            pushed: 0,
            expanded: 0,
        };

        // nothing to search for if either end is a wall or outside of the map
        if !map.is_passable(start) || !map.is_passable(goal) {
            finder.state = PathFinderState::NoPathFound;
            return finder;
        }

        *finder.visited.get_mut(start) = Visited(Some(VisitedItem {
            cost: 0,
            from: None,
            expanded: false,
        }));
        finder.push(map, start, 0);
        finder
    }

    fn push(&mut self, map: &M, point: M::Reference, cost: usize) {
        match &mut self.frontier {
            Frontier::Queue(queue) => queue.push_back(point),
            Frontier::Heap(heap) => {
                let heuristic = map.heuristic(point, self.goal);
                heap.push(ToVisit {
                    estimate: cost + heuristic,
                    heuristic,
                    order: self.pushed,
                    cost,
                    point,
                });
            }
        }
        self.pushed += 1;
    }

    /// Takes the next node to expand off the frontier, skipping outdated heap entries
    fn pop(&mut self) -> Option<M::Reference> {
        match &mut self.frontier {
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Heap(heap) => {
                while let Some(visit) = heap.pop() {
                    match *self.visited.get(visit.point) {
                        Some(item) if item.cost < visit.cost => continue,
                        _ => return Some(visit.point),
                    }
                }
                None
            }
        }
    }

    pub fn finish(
        mut self,
        map: &M,
    ) -> (
        PathFinderState<M::Reference>,
        M::Storage<Visited<M::Reference>>,
    ) {
        loop {
            match self.step(map) {
                PathFinderState::Computing => {}
                s => return (s, self.visited),
            }
        }
    }

    pub fn step(&mut self, map: &M) -> PathFinderState<M::Reference> {
        if self.state.is_done() {
            return self.state.clone();
        }

        let Some(current) = self.pop() else {
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };

        let Some(mut item) = *self.visited.get(current) else {
            // only nodes with a recorded cost are ever pushed
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };
        item.expanded = true;
        *self.visited.get_mut(current) = Visited(Some(item));
        self.expanded += 1;

        if current == self.goal {
            self.state = PathFinderState::PathFound(PathResult {
                path: self.backtrack(),
                total_cost: item.cost,
                expanded: self.expanded,
            });
            return self.state.clone();
        }

        let cost = item.cost + 1;
        for neighbor in map.neighbors_of(current) {
            let improves = match (self.algorithm, *self.visited.get(neighbor)) {
                (_, None) => true,
                // bfs discovers every node at its lowest depth
                (Algorithm::Bfs, Some(_)) => false,
                (Algorithm::AStar, Some(known)) => cost < known.cost,
            };

            if improves {
                *self.visited.get_mut(neighbor) = Visited(Some(VisitedItem {
                    cost,
                    from: Some(current),
                    expanded: false,
                }));
                self.push(map, neighbor, cost);
            }
        }

        self.state.clone()
    }

    /// Walks the recorded parents back from the goal
    fn backtrack(&self) -> Path<M::Reference> {
        let mut path = vec![self.goal];
        let mut current = self.goal;

        while let Some(VisitedItem {
            from: Some(from), ..
        }) = *self.visited.get(current)
        {
            path.push(from);
            current = from;
        }

        path.reverse();
        Path::new(path)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn state(&self) -> &PathFinderState<M::Reference> {
        &self.state
    }

    pub fn get_visited(&self) -> &M::Storage<Visited<M::Reference>> {
        &self.visited
    }

    pub fn start(&self) -> M::Reference {
        self.start
    }

    pub fn goal(&self) -> M::Reference {
        self.goal
    }
}
