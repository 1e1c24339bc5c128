//! Resumable maze solvers.
//!
//! A `MazeSolver` searches a completed maze from the route's start cell towards its end cell, one
//! frontier transition per `step`. Solvers only read walls and weights from the grid; the only
//! thing they write is the Searched flag.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;

use log::{debug, info, trace, warn};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use smallvec::SmallVec;

use crate::generators::StepCells;
use crate::grid::Grid;
use crate::session::Route;

/// Distance of a cell the search has not reached yet.
const UNREACHED: u32 = u32::MAX;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum SolverKind {
    DepthFirst,
    BreadthFirst,
    Dijkstra,
    AStar,
}

impl SolverKind {
    pub const ALL: [SolverKind; 4] = [SolverKind::DepthFirst,
                                      SolverKind::BreadthFirst,
                                      SolverKind::Dijkstra,
                                      SolverKind::AStar];

    /// Does the solver take cell weights into account?
    pub fn is_weighted(self) -> bool {
        match self {
            SolverKind::Dijkstra | SolverKind::AStar => true,
            SolverKind::DepthFirst | SolverKind::BreadthFirst => false,
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            SolverKind::DepthFirst => "depth first search",
            SolverKind::BreadthFirst => "breadth first search",
            SolverKind::Dijkstra => "Dijkstra",
            SolverKind::AStar => "A*",
        };
        f.write_str(name)
    }
}

/// Min-heap entry, the cheapest cell pops first. Equal costs pop the lower cell index first so
/// that runs are reproducible.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
struct QueueEntry {
    cost: u32,
    cell: usize,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost
            .cmp(&self.cost)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

enum Frontier {
    DepthFirst(Vec<usize>),
    BreadthFirst(VecDeque<usize>),
    Dijkstra(BinaryHeap<QueueEntry>),
    AStar(BinaryHeap<QueueEntry>),
}

impl Frontier {
    fn len(&self) -> usize {
        match *self {
            Frontier::DepthFirst(ref stack) => stack.len(),
            Frontier::BreadthFirst(ref queue) => queue.len(),
            Frontier::Dijkstra(ref heap) |
            Frontier::AStar(ref heap) => heap.len(),
        }
    }

    /// The cell the goal test looks at: stack top, queue front or cheapest heap entry.
    fn head(&self) -> Option<usize> {
        match *self {
            Frontier::DepthFirst(ref stack) => stack.last().cloned(),
            Frontier::BreadthFirst(ref queue) => queue.front().cloned(),
            Frontier::Dijkstra(ref heap) |
            Frontier::AStar(ref heap) => heap.peek().map(|entry| entry.cell),
        }
    }

    fn clear(&mut self) {
        match *self {
            Frontier::DepthFirst(ref mut stack) => stack.clear(),
            Frontier::BreadthFirst(ref mut queue) => queue.clear(),
            Frontier::Dijkstra(ref mut heap) |
            Frontier::AStar(ref mut heap) => heap.clear(),
        }
    }
}

/// A resumable path search over a completed maze.
///
/// For the unweighted solvers `distance` counts passages from the start. Dijkstra accumulates the
/// weights of the cells entered. A* additionally adds the heuristic of every cell entered, so its
/// distances are search priorities rather than path costs unless the amplifier is zero.
pub struct MazeSolver {
    frontier: Frontier,
    route: Route,
    rng: XorShiftRng,
    distances: Vec<u32>,
    parents: Vec<Option<usize>>,
    heuristic: Vec<u32>,
    path: Vec<usize>,
    completed: bool,
    last_step: StepCells,
    steps: usize,
    grid_size: usize,
}

impl MazeSolver {
    /// Start a search along `route`. A* gets the default heuristic amplifier of 1.
    ///
    /// The grid should hold a completed maze; on anything else the goal may never be reached and
    /// the solver just runs out of frontier.
    pub fn new(grid: &mut Grid, kind: SolverKind, route: Route, rng: XorShiftRng) -> MazeSolver {
        MazeSolver::with_amplifier(grid, kind, route, 1, rng)
    }

    /// An A* search whose heuristic is `amplifier * floor(euclidean distance to the goal)`.
    pub fn astar(grid: &mut Grid, route: Route, amplifier: u32, rng: XorShiftRng) -> MazeSolver {
        MazeSolver::with_amplifier(grid, SolverKind::AStar, route, amplifier, rng)
    }

    pub fn from_seed(grid: &mut Grid, kind: SolverKind, route: Route, seed: u64) -> MazeSolver {
        MazeSolver::new(grid, kind, route, XorShiftRng::seed_from_u64(seed))
    }

    fn with_amplifier(grid: &mut Grid,
                      kind: SolverKind,
                      route: Route,
                      amplifier: u32,
                      rng: XorShiftRng)
                      -> MazeSolver {
        let size = grid.size();
        let Route { start, end } = route;

        debug_assert!(start < size && end < size, "route outside the grid");
        let mut distances = vec![UNREACHED; size];
        if let Some(d) = distances.get_mut(start) {
            *d = 0;
        }
        grid.mark_searched(start);

        let start_entry = QueueEntry { cost: 0, cell: start };
        let frontier = match kind {
            SolverKind::DepthFirst => Frontier::DepthFirst(vec![start]),
            SolverKind::BreadthFirst => Frontier::BreadthFirst(Some(start).into_iter().collect()),
            SolverKind::Dijkstra => Frontier::Dijkstra(Some(start_entry).into_iter().collect()),
            SolverKind::AStar => Frontier::AStar(Some(start_entry).into_iter().collect()),
        };

        let heuristic = if kind == SolverKind::AStar {
            euclidean_heuristic(grid, end, amplifier)
        } else {
            Vec::new()
        };
        debug!("{} solver created for route {} -> {} on {:?}", kind, start, end, grid);

        MazeSolver {
            frontier,
            route,
            rng,
            distances,
            parents: vec![None; size],
            heuristic,
            path: Vec::new(),
            completed: false,
            last_step: StepCells::new(),
            steps: 0,
            grid_size: size,
        }
    }

    pub fn kind(&self) -> SolverKind {
        match self.frontier {
            Frontier::DepthFirst(_) => SolverKind::DepthFirst,
            Frontier::BreadthFirst(_) => SolverKind::BreadthFirst,
            Frontier::Dijkstra(_) => SolverKind::Dijkstra,
            Frontier::AStar(_) => SolverKind::AStar,
        }
    }

    #[inline]
    pub fn route(&self) -> Route {
        self.route
    }

    /// Advance the search by one frontier transition. An empty frontier, or a finalized solver,
    /// makes this a no-op.
    pub fn step(&mut self, grid: &mut Grid) {
        debug_assert_eq!(grid.size(), self.grid_size, "solver stepped with a different grid");
        if self.completed || self.is_exhausted() {
            return;
        }

        self.last_step.clear();
        match self.kind() {
            SolverKind::DepthFirst => self.step_depth_first(grid),
            SolverKind::BreadthFirst => self.step_breadth_first(grid),
            SolverKind::Dijkstra | SolverKind::AStar => self.step_weighted(grid),
        }
        self.steps += 1;
        trace!("solver step {} touched {:?}", self.steps, self.last_step);
    }

    fn step_depth_first(&mut self, grid: &mut Grid) {
        let stack = match self.frontier {
            Frontier::DepthFirst(ref mut stack) => stack,
            _ => return,
        };
        let current = match stack.last() {
            Some(&cell) => cell,
            None => return,
        };
        self.last_step.push(current);

        let candidates = grid.open_neighbours(current)
            .into_iter()
            .filter(|&(_, n)| !grid.is_searched(n))
            .map(|(_, n)| n)
            .collect::<SmallVec<[usize; 4]>>();

        match candidates.choose(&mut self.rng) {
            Some(&next) => {
                grid.mark_searched(next);
                self.distances[next] = self.distances[current].saturating_add(1);
                self.parents[next] = Some(current);
                stack.push(next);
                self.last_step.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }

    fn step_breadth_first(&mut self, grid: &mut Grid) {
        let queue = match self.frontier {
            Frontier::BreadthFirst(ref mut queue) => queue,
            _ => return,
        };
        let current = match queue.pop_front() {
            Some(cell) => cell,
            None => return,
        };
        self.last_step.push(current);

        for (_, next) in grid.open_neighbours(current) {
            if grid.is_searched(next) {
                continue;
            }
            grid.mark_searched(next);
            self.distances[next] = self.distances[current].saturating_add(1);
            self.parents[next] = Some(current);
            queue.push_back(next);
            self.last_step.push(next);
        }
    }

    fn step_weighted(&mut self, grid: &mut Grid) {
        let heap = match self.frontier {
            Frontier::Dijkstra(ref mut heap) |
            Frontier::AStar(ref mut heap) => heap,
            _ => return,
        };
        let QueueEntry { cost, cell: current } = match heap.pop() {
            Some(entry) => entry,
            None => return,
        };
        self.last_step.push(current);
        if cost > self.distances[current] {
            // superseded by a cheaper entry that was already expanded
            return;
        }

        for (_, next) in grid.open_neighbours(current) {
            let estimate = self.heuristic.get(next).cloned().unwrap_or(0);
            let candidate = self.distances[current]
                .saturating_add(grid.weight(next))
                .saturating_add(estimate);

            if candidate < self.distances[next] {
                self.distances[next] = candidate;
                self.parents[next] = Some(current);
                heap.push(QueueEntry { cost: candidate, cell: next });
                grid.mark_searched(next);
                self.last_step.push(next);
            }
        }
    }

    /// Is the goal at the head of the frontier? This is the stopping rule for every solver.
    pub fn is_goal_reached(&self) -> bool {
        self.frontier.head() == Some(self.route.end)
    }

    /// Nothing left to search. On a completed maze this happens only once the goal has been passed
    /// by without stopping.
    pub fn is_exhausted(&self) -> bool {
        self.frontier.len() == 0
    }

    #[inline]
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Step until the goal is reached or the frontier runs dry, then finalize.
    pub fn run_to_goal(&mut self, grid: &mut Grid) -> Option<&[usize]> {
        while !self.completed && !self.is_goal_reached() && !self.is_exhausted() {
            self.step(grid);
        }
        self.finalize()
    }

    /// Reconstruct the path from start to goal, oldest cell first. None while the goal has not been
    /// reached. After a successful call the solver is completed and further steps do nothing.
    pub fn finalize(&mut self) -> Option<&[usize]> {
        if self.completed {
            return Some(self.path.as_slice());
        }
        if !self.is_goal_reached() {
            warn!("{} finalized before reaching cell {}", self.kind(), self.route.end);
            return None;
        }

        self.path = match self.frontier {
            Frontier::DepthFirst(ref stack) => stack.clone(),
            _ => self.parent_chain(self.route.end),
        };
        self.frontier.clear();
        self.last_step.clear();
        self.completed = true;

        info!("maze solved, goal is {} cells away", self.path.len().saturating_sub(1));
        Some(self.path.as_slice())
    }

    /// Follow parent links back from `cell` to the start and reverse.
    fn parent_chain(&self, cell: usize) -> Vec<usize> {
        let mut chain = vec![cell];
        let mut current = cell;
        while let Some(parent) = self.parents[current] {
            chain.push(parent);
            current = parent;
            if chain.len() > self.grid_size {
                // parent links never loop, a longer chain means corrupt state
                break;
            }
        }
        chain.reverse();
        chain
    }

    /// The finalized path, empty until `finalize` succeeds.
    #[inline]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn distance(&self, cell: usize) -> Option<u32> {
        self.distances.get(cell).cloned().filter(|&d| d != UNREACHED)
    }

    /// Best known distance of every cell, None where the search has not reached.
    pub fn distances(&self) -> Vec<Option<u32>> {
        (0..self.distances.len()).map(|cell| self.distance(cell)).collect()
    }

    /// A* estimate for `cell`, zero for the other solvers.
    pub fn heuristic(&self, cell: usize) -> u32 {
        self.heuristic.get(cell).cloned().unwrap_or(0)
    }

    pub fn parent(&self, cell: usize) -> Option<usize> {
        self.parents.get(cell).cloned().unwrap_or(None)
    }

    #[inline]
    pub fn last_step_cells(&self) -> &[usize] {
        &self.last_step
    }

    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl fmt::Debug for MazeSolver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "MazeSolver :: kind: {:?}, route: {:?}, steps: {}, frontier: {}, completed: {}",
               self.kind(),
               self.route,
               self.steps,
               self.frontier.len(),
               self.completed)
    }
}

fn euclidean_heuristic(grid: &Grid, goal: usize, amplifier: u32) -> Vec<u32> {
    let goal = match grid.coordinate(goal) {
        Some(coord) => coord,
        None => return vec![0; grid.size()],
    };
    (0..grid.size())
        .map(|cell| {
            grid.coordinate(cell)
                .map(|coord| coord.euclidean_distance(goal).floor() as u32)
                .unwrap_or(0)
                .saturating_mul(amplifier)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::CompassPrimary;
    use crate::generators::{BuilderKind, MazeBuilder};
    use crate::units::{ColumnsCount, RowsCount};

    fn route(start: usize, end: usize) -> Route {
        Route { start, end }
    }

    fn maze(columns: usize, rows: usize, seed: u64) -> Grid {
        let mut g = Grid::new(ColumnsCount(columns), RowsCount(rows)).expect("valid grid dimensions");
        MazeBuilder::from_seed(&mut g, BuilderKind::RecursiveBacktracker, seed)
            .run_to_completion(&mut g);
        g
    }

    /// 1 column x 4 rows, a straight corridor from 0 down to 3.
    fn corridor() -> Grid {
        let mut g = Grid::new(ColumnsCount(1), RowsCount(4)).unwrap();
        for cell in 0..3 {
            g.carve_passage(cell, CompassPrimary::South);
        }
        g
    }

    fn is_connected_path(g: &Grid, path: &[usize]) -> bool {
        path.windows(2).all(|pair| {
            g.direction_between(pair[0], pair[1]).map_or(false, |dir| g.is_open(pair[0], dir))
        })
    }

    #[test]
    fn start_cell_searched_at_construction() {
        for &kind in SolverKind::ALL.iter() {
            let mut g = corridor();
            let solver = MazeSolver::from_seed(&mut g, kind, route(1, 3), 0);
            assert!(g.is_searched(1));
            assert!(!g.is_searched(0));
            assert_eq!(solver.distance(1), Some(0));
            assert_eq!(solver.distance(0), None);
            assert_eq!(solver.frontier_len(), 1);
            assert_eq!(solver.kind(), kind);
        }
    }

    #[test]
    fn corridor_is_solved_by_every_solver() {
        for &kind in SolverKind::ALL.iter() {
            let mut g = corridor();
            let mut solver = MazeSolver::from_seed(&mut g, kind, route(0, 3), 0);
            assert_eq!(solver.run_to_goal(&mut g), Some(&[0, 1, 2, 3][..]));
            assert!(solver.is_completed());
            assert_eq!(solver.path(), &[0, 1, 2, 3]);
        }
    }

    #[test]
    fn finalize_before_goal_is_refused() {
        let mut g = corridor();
        let mut solver = MazeSolver::from_seed(&mut g, SolverKind::BreadthFirst, route(0, 3), 0);
        assert_eq!(solver.finalize(), None);
        assert!(!solver.is_completed());
        solver.step(&mut g);
        assert_eq!(solver.finalize(), None);
    }

    #[test]
    fn goal_test_uses_the_frontier_head() {
        let mut g = corridor();
        let mut solver = MazeSolver::from_seed(&mut g, SolverKind::BreadthFirst, route(0, 2), 0);
        solver.step(&mut g);
        // 1 is queued but 2 has not been discovered yet
        assert!(!solver.is_goal_reached());
        solver.step(&mut g);
        assert!(solver.is_goal_reached());
        assert_eq!(solver.parent(2), Some(1));
    }

    #[test]
    fn exhausted_solver_steps_are_no_ops() {
        // no passages, the start is walled in
        let mut g = Grid::new(ColumnsCount(2), RowsCount(2)).unwrap();
        for &kind in SolverKind::ALL.iter() {
            g.clear_searched();
            let mut solver = MazeSolver::from_seed(&mut g, kind, route(0, 3), 0);
            solver.step(&mut g);
            assert!(solver.is_exhausted());
            let steps = solver.steps();
            solver.step(&mut g);
            assert_eq!(solver.steps(), steps);
            assert_eq!(solver.run_to_goal(&mut g), None);
        }
    }

    #[test]
    fn depth_first_path_is_its_stack() {
        let mut g = maze(6, 6, 4);
        let mut solver = MazeSolver::from_seed(&mut g, SolverKind::DepthFirst, route(0, 35), 9);
        let path = solver.run_to_goal(&mut g).expect("goal reachable").to_vec();
        assert_eq!(path.first(), Some(&0));
        assert_eq!(path.last(), Some(&35));
        assert!(is_connected_path(&g, &path));
        assert!(path.iter().all(|&cell| g.is_searched(cell)));
    }

    #[test]
    fn breadth_first_distances_count_passages() {
        let mut g = corridor();
        let mut solver = MazeSolver::from_seed(&mut g, SolverKind::BreadthFirst, route(0, 3), 0);
        solver.run_to_goal(&mut g);
        assert_eq!(solver.distances(), vec![Some(0), Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn dijkstra_accumulates_entered_cell_weights() {
        let mut g = corridor();
        for (cell, &w) in [7, 2, 3, 4].iter().enumerate() {
            g.set_weight(cell, w);
        }
        let mut solver = MazeSolver::from_seed(&mut g, SolverKind::Dijkstra, route(0, 3), 0);
        solver.run_to_goal(&mut g);
        // the start cell weight is never paid
        assert_eq!(solver.distance(1), Some(2));
        assert_eq!(solver.distance(2), Some(5));
        assert_eq!(solver.distance(3), Some(9));
    }

    #[test]
    fn dijkstra_prefers_the_cheaper_branch() {
        // 2 x 2 with every passage carved, a loop 0-1-3-2-0
        let mut g = Grid::new(ColumnsCount(2), RowsCount(2)).unwrap();
        g.carve_passage(0, CompassPrimary::South);
        g.carve_passage(0, CompassPrimary::East);
        g.carve_passage(3, CompassPrimary::North);
        g.carve_passage(3, CompassPrimary::West);
        g.set_weight(1, 9);
        g.set_weight(2, 1);
        let mut solver = MazeSolver::from_seed(&mut g, SolverKind::Dijkstra, route(0, 3), 0);
        assert_eq!(solver.run_to_goal(&mut g), Some(&[0, 2, 3][..]));
        assert_eq!(solver.distance(3), Some(2));
    }

    #[test]
    fn astar_heuristic_is_floored_euclidean_distance() {
        let mut g = maze(4, 3, 1);
        let goal = g.index((3, 2).into()).unwrap();
        let solver = MazeSolver::astar(&mut g, route(0, goal), 2, XorShiftRng::seed_from_u64(0));
        // (0, 0) is sqrt(13) away from (3, 2)
        assert_eq!(solver.heuristic(0), 6);
        assert_eq!(solver.heuristic(goal), 0);
        assert_eq!(solver.heuristic(g.index((1, 2).into()).unwrap()), 4);

        let dijkstra = MazeSolver::from_seed(&mut g, SolverKind::Dijkstra, route(0, goal), 0);
        assert_eq!(dijkstra.heuristic(0), 0);
    }

    #[test]
    fn astar_adds_the_heuristic_of_entered_cells() {
        let mut g = corridor();
        let mut solver = MazeSolver::from_seed(&mut g, SolverKind::AStar, route(0, 3), 0);
        solver.run_to_goal(&mut g);
        // unit weights, heuristics 2, 1, 0 for cells 1, 2, 3
        assert_eq!(solver.distance(1), Some(3));
        assert_eq!(solver.distance(2), Some(5));
        assert_eq!(solver.distance(3), Some(6));
    }

    #[test]
    fn finalized_solver_ignores_further_steps() {
        let mut g = maze(5, 5, 2);
        let mut solver = MazeSolver::from_seed(&mut g, SolverKind::BreadthFirst, route(0, 24), 0);
        let path = solver.run_to_goal(&mut g).map(|p| p.to_vec());
        assert!(path.is_some());
        let steps = solver.steps();
        solver.step(&mut g);
        assert_eq!(solver.steps(), steps);
        assert_eq!(solver.finalize().map(|p| p.to_vec()), path);
        assert!(solver.is_exhausted());
    }

    #[test]
    fn queue_entries_pop_cheapest_then_lowest_cell() {
        let mut heap = BinaryHeap::new();
        for &(cost, cell) in &[(5, 1), (2, 9), (2, 4), (7, 0)] {
            heap.push(QueueEntry { cost, cell });
        }
        let order = std::iter::from_fn(|| heap.pop()).map(|e| e.cell).collect::<Vec<_>>();
        assert_eq!(order, vec![4, 9, 1, 0]);
    }
}
