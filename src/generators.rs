//! Maze generation, one step at a time.
//!
//! A `MazeBuilder` holds all the progress state of one generation algorithm and writes into a
//! `Grid` it is handed on every call to `step`. The grid reports `is_complete` once the maze is a
//! spanning tree over all of its cells.

use std::fmt;
use std::mem;

use fnv::FnvHashMap;
use log::{debug, info, trace};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use smallvec::SmallVec;

use crate::disjoint_set::DisjointSet;
use crate::grid::Grid;
use crate::walls::WallList;

/// Cells affected by a single step, kept for highlighting.
pub type StepCells = SmallVec<[usize; 4]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum BuilderKind {
    RecursiveBacktracker,
    Kruskal,
    Prim,
    Wilson,
}

impl BuilderKind {
    pub const ALL: [BuilderKind; 4] = [BuilderKind::RecursiveBacktracker,
                                       BuilderKind::Kruskal,
                                       BuilderKind::Prim,
                                       BuilderKind::Wilson];
}

impl fmt::Display for BuilderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            BuilderKind::RecursiveBacktracker => "recursive backtracker",
            BuilderKind::Kruskal => "randomized Kruskal",
            BuilderKind::Prim => "randomized Prim",
            BuilderKind::Wilson => "Wilson",
        };
        f.write_str(name)
    }
}

/// A resumable maze generator.
///
/// The builder must always be stepped with the grid it was created for. It never finishes by
/// itself: the caller steps it until `Grid::is_complete` and then calls `on_completion`.
pub struct MazeBuilder {
    algorithm: Algorithm,
    rng: XorShiftRng,
    completed: bool,
    last_step: StepCells,
    steps: usize,
    grid_size: usize,
}

enum Algorithm {
    RecursiveBacktracker(Backtracker),
    Kruskal(Kruskal),
    Prim(Prim),
    Wilson(Wilson),
}

impl MazeBuilder {
    pub fn new(grid: &mut Grid, kind: BuilderKind, mut rng: XorShiftRng) -> MazeBuilder {
        let algorithm = match kind {
            BuilderKind::RecursiveBacktracker => {
                Algorithm::RecursiveBacktracker(Backtracker::new(grid, &mut rng))
            }
            BuilderKind::Kruskal => Algorithm::Kruskal(Kruskal::new(grid, &mut rng)),
            BuilderKind::Prim => Algorithm::Prim(Prim::new(grid, &mut rng)),
            BuilderKind::Wilson => Algorithm::Wilson(Wilson::new(grid, &mut rng)),
        };
        debug!("{} builder created for {:?}", kind, grid);

        MazeBuilder {
            algorithm,
            rng,
            completed: false,
            last_step: StepCells::new(),
            steps: 0,
            grid_size: grid.size(),
        }
    }

    pub fn from_seed(grid: &mut Grid, kind: BuilderKind, seed: u64) -> MazeBuilder {
        MazeBuilder::new(grid, kind, XorShiftRng::seed_from_u64(seed))
    }

    pub fn kind(&self) -> BuilderKind {
        match self.algorithm {
            Algorithm::RecursiveBacktracker(_) => BuilderKind::RecursiveBacktracker,
            Algorithm::Kruskal(_) => BuilderKind::Kruskal,
            Algorithm::Prim(_) => BuilderKind::Prim,
            Algorithm::Wilson(_) => BuilderKind::Wilson,
        }
    }

    /// Advance the algorithm by one transition. Once the algorithm has nothing left to do, or after
    /// `on_completion`, this is a no-op.
    pub fn step(&mut self, grid: &mut Grid) {
        debug_assert_eq!(grid.size(), self.grid_size, "builder stepped with a different grid");
        if self.completed {
            return;
        }

        self.last_step.clear();
        let touched = &mut self.last_step;
        let rng = &mut self.rng;
        match self.algorithm {
            Algorithm::RecursiveBacktracker(ref mut state) => state.step(grid, rng, touched),
            Algorithm::Kruskal(ref mut state) => state.step(grid, touched),
            Algorithm::Prim(ref mut state) => state.step(grid, rng, touched),
            Algorithm::Wilson(ref mut state) => state.step(grid, rng, touched),
        }
        self.steps += 1;
        trace!("builder step {} touched {:?}", self.steps, self.last_step);
    }

    /// Step until the grid is complete, then finish off. Returns the number of steps taken.
    pub fn run_to_completion(&mut self, grid: &mut Grid) -> usize {
        let start_steps = self.steps;
        while !grid.is_complete() && !self.completed {
            self.step(grid);
        }
        self.on_completion();
        self.steps - start_steps
    }

    /// Mark the builder as done and drop the transient per-run state.
    pub fn on_completion(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.last_step.clear();

        match self.algorithm {
            Algorithm::RecursiveBacktracker(ref mut state) => state.stack.clear(),
            Algorithm::Kruskal(ref mut state) => state.order.clear(),
            Algorithm::Prim(ref mut state) => state.frontier.clear(),
            Algorithm::Wilson(ref mut state) => state.clear_walk(),
        }
        info!("maze generated by {} in {} steps", self.kind(), self.steps);
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Cells the most recent step looked at or changed.
    #[inline]
    pub fn last_step_cells(&self) -> &[usize] {
        &self.last_step
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl fmt::Debug for MazeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "MazeBuilder :: kind: {:?}, steps: {}, completed: {}",
               self.kind(),
               self.steps,
               self.completed)
    }
}

/// Depth first carving with an explicit stack standing in for recursion.
struct Backtracker {
    stack: Vec<usize>,
}

impl Backtracker {
    fn new(grid: &mut Grid, rng: &mut XorShiftRng) -> Backtracker {
        let start = grid.random_cell(rng);
        grid.mark_visited(start);

        let mut stack = Vec::with_capacity(grid.size());
        stack.push(start);
        Backtracker { stack }
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut XorShiftRng, touched: &mut StepCells) {
        let current = match self.stack.last() {
            Some(&cell) => cell,
            None => return,
        };
        touched.push(current);

        let unvisited = grid.neighbours(current)
            .into_iter()
            .filter(|&(_, neighbour)| !grid.is_visited(neighbour))
            .collect::<SmallVec<[_; 4]>>();

        if let Some(&(direction, next)) = unvisited.choose(rng) {
            grid.carve_passage(current, direction);
            grid.mark_visited(next);
            self.stack.push(next);
            touched.push(next);
        } else {
            // dead end, backtrack
            self.stack.pop();
        }
    }
}

/// Random order over all walls, carving a wall whenever it joins two different trees.
struct Kruskal {
    walls: WallList,
    sets: DisjointSet,
    order: Vec<usize>,
}

impl Kruskal {
    fn new(grid: &mut Grid, rng: &mut XorShiftRng) -> Kruskal {
        let walls = WallList::new(grid);
        // The last entry, the east wall of the south east corner, is always on the boundary.
        let mut order = (0..walls.len() - 1).collect::<Vec<_>>();
        order.shuffle(rng);

        Kruskal {
            sets: DisjointSet::new(grid.size()),
            walls,
            order,
        }
    }

    fn step(&mut self, grid: &mut Grid, touched: &mut StepCells) {
        if let Some(wall) = self.order.pop().and_then(|index| self.walls.get(index)) {
            touched.push(wall.cell);

            if let Some(neighbour) = wall.neighbour {
                touched.push(neighbour);
                if self.sets.union_sets(wall.cell, neighbour) {
                    grid.carve_passage(wall.cell, wall.direction);
                    grid.flag_visited(wall.cell);
                    grid.flag_visited(neighbour);
                }
            }
        }

        // Every wall is examined even once the tree is whole; completion is only reported
        // when the order runs dry.
        if self.order.is_empty() {
            grid.complete_visits();
        }
    }
}

/// Grows one tree from a random start cell by carving random frontier walls.
struct Prim {
    walls: WallList,
    frontier: Vec<usize>,
}

impl Prim {
    fn new(grid: &mut Grid, rng: &mut XorShiftRng) -> Prim {
        let walls = WallList::new(grid);
        let start = grid.random_cell(rng);
        grid.mark_visited(start);

        let mut frontier = Vec::with_capacity(walls.len());
        frontier.extend(walls.incident_walls(start));
        Prim { walls, frontier }
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut XorShiftRng, touched: &mut StepCells) {
        if !self.frontier.is_empty() {
            let pick = rng.gen_range(0..self.frontier.len());
            let index = self.frontier.swap_remove(pick);
            self.expand(grid, index, touched);
        }

        if self.frontier.is_empty() {
            grid.complete_visits();
        }
    }

    fn expand(&mut self, grid: &mut Grid, index: usize, touched: &mut StepCells) {
        let wall = match self.walls.get(index) {
            Some(wall) => wall,
            None => return,
        };
        touched.push(wall.cell);
        let neighbour = match wall.neighbour {
            Some(n) => n,
            None => return,
        };
        touched.push(neighbour);

        // Stale frontier entries are only weeded out here, when they are drawn.
        let fresh = match (grid.is_visited(wall.cell), grid.is_visited(neighbour)) {
            (true, true) => return,
            (true, false) => neighbour,
            (false, _) => wall.cell,
        };

        grid.carve_passage(wall.cell, wall.direction);
        grid.mark_visited(fresh);
        self.frontier.extend(self.walls
            .incident_walls(fresh)
            .into_iter()
            .filter(|&w| w != index));
    }
}

/// Loop erased random walks from unvisited cells until they hit the maze.
struct Wilson {
    unvisited: Vec<usize>,
    // position of each cell in `unvisited`
    unvisited_positions: Vec<Option<usize>>,
    walk: Vec<usize>,
    walk_positions: FnvHashMap<usize, usize>,
}

impl Wilson {
    fn new(grid: &mut Grid, rng: &mut XorShiftRng) -> Wilson {
        let size = grid.size();
        let mut wilson = Wilson {
            unvisited: (0..size).collect(),
            unvisited_positions: (0..size).map(Some).collect(),
            walk: Vec::new(),
            walk_positions: FnvHashMap::default(),
        };

        let root = grid.random_cell(rng);
        grid.mark_visited(root);
        wilson.remove_unvisited(root);
        wilson
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut XorShiftRng, touched: &mut StepCells) {
        if self.walk.is_empty() {
            let head = match self.unvisited.choose(rng) {
                Some(&cell) => cell,
                None => return,
            };
            self.push_walk(head);
        }

        let head = match self.walk.last() {
            Some(&cell) => cell,
            None => return,
        };
        touched.push(head);

        // Any direction will do, walls and the walk itself do not constrain it.
        let next = match grid.neighbours(head).choose(rng) {
            Some(&(_, cell)) => cell,
            None => {
                // a single cell grid has nowhere to walk to, the root is the whole maze
                self.clear_walk();
                return;
            }
        };
        touched.push(next);

        if grid.is_visited(next) {
            self.push_walk(next);
            self.commit_walk(grid);
        } else if let Some(&position) = self.walk_positions.get(&next) {
            self.erase_loop(position);
        } else {
            self.push_walk(next);
        }
    }

    fn push_walk(&mut self, cell: usize) {
        self.walk_positions.insert(cell, self.walk.len());
        self.walk.push(cell);
    }

    /// Cut the walk back so that the cell at `position` is its head again.
    fn erase_loop(&mut self, position: usize) {
        for cell in self.walk.drain(position + 1..) {
            self.walk_positions.remove(&cell);
        }
    }

    /// Carve the whole walk into the maze. Its last cell is already part of the maze.
    fn commit_walk(&mut self, grid: &mut Grid) {
        let walk = mem::replace(&mut self.walk, Vec::new());
        self.walk_positions.clear();
        for pair in walk.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if let Some(direction) = grid.direction_between(from, to) {
                grid.carve_passage(from, direction);
            }
            if grid.mark_visited(from) {
                self.remove_unvisited(from);
            }
        }
    }

    fn remove_unvisited(&mut self, cell: usize) {
        if let Some(position) = self.unvisited_positions[cell].take() {
            self.unvisited.swap_remove(position);
            if let Some(&moved) = self.unvisited.get(position) {
                self.unvisited_positions[moved] = Some(position);
            }
        }
    }

    fn clear_walk(&mut self) {
        self.walk.clear();
        self.walk_positions.clear();
    }
}
