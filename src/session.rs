//! The glue between a maze, the builder carving it and the solver searching it.
//!
//! A `Session` enforces the phase ordering: the grid belongs to the builder until the maze is
//! complete and only then to a solver. Its operations mirror the controls of an interactive maze
//! viewer, so a driver can call them once per frame.

use std::error::Error;
use std::fmt;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use crate::generators::{BuilderKind, MazeBuilder};
use crate::grid::{CellGeometry, Grid, GridError, WeightRange};
use crate::pathing::{MazeSolver, SolverKind};
use crate::units::{ColumnsCount, Height, RowsCount, Width};

/// Start and end cell of a search.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct Route {
    pub start: usize,
    pub end: usize,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum RouteError {
    OutOfBounds { cell: usize, area: usize },
    SameCell(usize),
    GridTooSmall,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RouteError::OutOfBounds { cell, area } => {
                write!(f, "cell {} is outside a grid of {} cells", cell, area)
            }
            RouteError::SameCell(cell) => write!(f, "route starts and ends at cell {}", cell),
            RouteError::GridTooSmall => write!(f, "a route needs a grid of at least two cells"),
        }
    }
}

impl Error for RouteError {}

impl Route {
    /// A route between two distinct cells of `grid`.
    pub fn new(start: usize, end: usize, grid: &Grid) -> Result<Route, RouteError> {
        let area = grid.size();
        if area < 2 {
            return Err(RouteError::GridTooSmall);
        }
        if let Some(&cell) = [start, end].iter().find(|&&cell| cell >= area) {
            return Err(RouteError::OutOfBounds { cell, area });
        }
        if start == end {
            return Err(RouteError::SameCell(start));
        }
        Ok(Route { start, end })
    }

    /// Pick random distinct start and end cells.
    pub fn random<R: Rng>(grid: &Grid, rng: &mut R) -> Result<Route, RouteError> {
        if grid.size() < 2 {
            return Err(RouteError::GridTooSmall);
        }
        let start = grid.random_cell(rng);
        let mut end = grid.random_cell(rng);
        while end == start {
            end = grid.random_cell(rng);
        }
        Ok(Route { start, end })
    }
}

/// Everything needed to set up a session.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct SessionConfig {
    pub columns: ColumnsCount,
    pub rows: RowsCount,
    pub geometry: CellGeometry,
    pub weights: WeightRange,
    /// Fixed seed for reproducible mazes, routes and weights. None seeds from entropy.
    pub seed: Option<u64>,
    pub astar_amplifier: u32,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            columns: ColumnsCount(32),
            rows: RowsCount(24),
            geometry: CellGeometry::default(),
            weights: WeightRange::default(),
            seed: None,
            astar_amplifier: 1,
        }
    }
}

impl SessionConfig {
    /// As many whole cells as fit into a pixel area, every other setting at its default.
    pub fn from_pixels(Width(width): Width,
                       Height(height): Height,
                       geometry: CellGeometry)
                       -> Result<SessionConfig, GridError> {
        let grid = Grid::from_pixels(Width(width), Height(height), geometry)?;
        Ok(SessionConfig {
            columns: grid.columns(),
            rows: grid.rows(),
            geometry,
            ..SessionConfig::default()
        })
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum BuildProgress {
    Building,
    Completed,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum SolveProgress {
    /// The builder has not finished, nothing can be searched yet.
    MazeIncomplete,
    /// The grid is too small to hold a route.
    NoRoute,
    Searching,
    Solved,
    /// The frontier ran dry without reaching the goal.
    Exhausted,
}

pub struct Session {
    config: SessionConfig,
    grid: Grid,
    builder: Option<MazeBuilder>,
    solver: Option<MazeSolver>,
    route: Option<Route>,
    rng: XorShiftRng,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Session, GridError> {
        let mut rng = match config.seed {
            Some(seed) => XorShiftRng::seed_from_u64(seed),
            None => XorShiftRng::seed_from_u64(rand::random()),
        };
        let grid = fresh_grid(&config, &mut rng)?;
        let route = Route::random(&grid, &mut rng).ok();
        debug!("session started on {:?} with route {:?}", grid, route);

        Ok(Session {
            config,
            grid,
            builder: None,
            solver: None,
            route,
            rng,
        })
    }

    /// Advance the maze by one step. The first call picks the algorithm; later calls keep using it
    /// whatever `kind` says, until `reset_maze`.
    pub fn step_builder(&mut self, kind: BuilderKind) -> BuildProgress {
        let grid = &mut self.grid;
        let rng = &mut self.rng;
        let builder = self.builder
            .get_or_insert_with(|| MazeBuilder::new(grid, kind, child_rng(rng)));

        if builder.is_completed() {
            return BuildProgress::Completed;
        }
        if grid.is_complete() {
            builder.on_completion();
            return BuildProgress::Completed;
        }
        builder.step(grid);
        BuildProgress::Building
    }

    /// Advance the search by one step. Like the builder, the first call picks the algorithm.
    pub fn step_solver(&mut self, kind: SolverKind) -> SolveProgress {
        if !self.is_maze_completed() {
            return SolveProgress::MazeIncomplete;
        }
        let route = match self.route {
            Some(route) => route,
            None => return SolveProgress::NoRoute,
        };

        let grid = &mut self.grid;
        let rng = &mut self.rng;
        let amplifier = self.config.astar_amplifier;
        let solver = self.solver.get_or_insert_with(|| {
            let rng = child_rng(rng);
            match kind {
                SolverKind::AStar => MazeSolver::astar(grid, route, amplifier, rng),
                _ => MazeSolver::new(grid, kind, route, rng),
            }
        });

        if solver.is_completed() {
            return SolveProgress::Solved;
        }
        if solver.is_goal_reached() {
            solver.finalize();
            return SolveProgress::Solved;
        }
        if solver.is_exhausted() {
            return SolveProgress::Exhausted;
        }
        solver.step(grid);
        SolveProgress::Searching
    }

    /// Throw the maze away and start again on a fresh grid with new weights and a new route.
    pub fn reset_maze(&mut self) -> Result<(), GridError> {
        self.grid = fresh_grid(&self.config, &mut self.rng)?;
        self.builder = None;
        self.solver = None;
        self.route = Route::random(&self.grid, &mut self.rng).ok();
        info!("maze reset");
        Ok(())
    }

    /// Forget the current search but keep the maze.
    pub fn reset_path(&mut self) {
        self.solver = None;
        self.grid.clear_searched();
    }

    /// Search along a different route. Resets the current search.
    pub fn set_route(&mut self, route: Route) -> Result<(), RouteError> {
        let route = Route::new(route.start, route.end, &self.grid)?;
        self.route = Some(route);
        self.reset_path();
        Ok(())
    }

    /// Pick a new random route. Resets the current search.
    pub fn reroll_route(&mut self) -> Result<Route, RouteError> {
        let route = Route::random(&self.grid, &mut self.rng)?;
        self.route = Some(route);
        self.reset_path();
        Ok(route)
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn route(&self) -> Option<Route> {
        self.route
    }

    #[inline]
    pub fn builder(&self) -> Option<&MazeBuilder> {
        self.builder.as_ref()
    }

    #[inline]
    pub fn solver(&self) -> Option<&MazeSolver> {
        self.solver.as_ref()
    }

    pub fn is_maze_completed(&self) -> bool {
        self.builder.as_ref().map_or(false, |b| b.is_completed())
    }

    /// The solved path, empty until a search has finished.
    pub fn path(&self) -> &[usize] {
        self.solver.as_ref().map_or(&[][..], |s| s.path())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Session :: {:?}, route: {:?}, builder: {:?}, solver: {:?}",
               self.grid,
               self.route,
               self.builder,
               self.solver)
    }
}

fn fresh_grid(config: &SessionConfig, rng: &mut XorShiftRng) -> Result<Grid, GridError> {
    let mut grid = Grid::with_geometry(config.columns, config.rows, config.geometry)?;
    grid.randomize_weights(rng, config.weights);
    Ok(grid)
}

/// Builders and solvers own their generator, seeded from the session one.
fn child_rng(rng: &mut XorShiftRng) -> XorShiftRng {
    XorShiftRng::seed_from_u64(rng.gen())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config(columns: usize, rows: usize, seed: u64) -> SessionConfig {
        SessionConfig {
            columns: ColumnsCount(columns),
            rows: RowsCount(rows),
            seed: Some(seed),
            ..SessionConfig::default()
        }
    }

    fn built_session(kind: BuilderKind, seed: u64) -> Session {
        let mut session = Session::new(seeded_config(6, 5, seed)).unwrap();
        while session.step_builder(kind) == BuildProgress::Building {}
        session
    }

    #[test]
    fn route_validation() {
        let g = Grid::new(ColumnsCount(2), RowsCount(2)).unwrap();
        assert_eq!(Route::new(0, 3, &g), Ok(Route { start: 0, end: 3 }));
        assert_eq!(Route::new(0, 4, &g), Err(RouteError::OutOfBounds { cell: 4, area: 4 }));
        assert_eq!(Route::new(7, 1, &g), Err(RouteError::OutOfBounds { cell: 7, area: 4 }));
        assert_eq!(Route::new(2, 2, &g), Err(RouteError::SameCell(2)));

        let single = Grid::new(ColumnsCount(1), RowsCount(1)).unwrap();
        assert_eq!(Route::new(0, 0, &single), Err(RouteError::GridTooSmall));
    }

    #[test]
    fn random_routes_are_distinct_and_in_bounds() {
        let g = Grid::new(ColumnsCount(2), RowsCount(1)).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(3);
        for _ in 0..100 {
            let route = Route::random(&g, &mut rng).unwrap();
            assert_ne!(route.start, route.end);
            assert!(route.start < 2 && route.end < 2);
        }
    }

    #[test]
    fn config_from_pixels() {
        let config = SessionConfig::from_pixels(Width(800), Height(600), CellGeometry::default())
            .unwrap();
        assert_eq!(config.columns, ColumnsCount(66));
        assert_eq!(config.rows, RowsCount(50));
        assert_eq!(config.astar_amplifier, 1);
        assert_eq!(config.weights, WeightRange::new(0, 10).unwrap());
    }

    #[test]
    fn solver_waits_for_the_maze() {
        let mut session = Session::new(seeded_config(4, 4, 1)).unwrap();
        assert_eq!(session.step_solver(SolverKind::BreadthFirst),
                   SolveProgress::MazeIncomplete);
        session.step_builder(BuilderKind::Prim);
        assert_eq!(session.step_solver(SolverKind::BreadthFirst),
                   SolveProgress::MazeIncomplete);
        assert!(session.solver().is_none());
    }

    #[test]
    fn builder_kind_is_fixed_by_the_first_step() {
        let mut session = Session::new(seeded_config(4, 4, 1)).unwrap();
        session.step_builder(BuilderKind::Wilson);
        session.step_builder(BuilderKind::Kruskal);
        assert_eq!(session.builder().map(|b| b.kind()), Some(BuilderKind::Wilson));
    }

    #[test]
    fn full_session_solves_the_route() {
        for &solver_kind in SolverKind::ALL.iter() {
            let mut session = built_session(BuilderKind::Kruskal, 17);
            assert!(session.grid().is_complete());
            assert!(session.is_maze_completed());

            let mut progress = SolveProgress::Searching;
            while progress == SolveProgress::Searching {
                progress = session.step_solver(solver_kind);
            }
            assert_eq!(progress, SolveProgress::Solved);

            let route = session.route().unwrap();
            let path = session.path();
            assert_eq!(path.first(), Some(&route.start));
            assert_eq!(path.last(), Some(&route.end));
        }
    }

    #[test]
    fn reset_path_keeps_the_maze() {
        let mut session = built_session(BuilderKind::RecursiveBacktracker, 5);
        while session.step_solver(SolverKind::DepthFirst) == SolveProgress::Searching {}
        let passages = session.grid().passages().collect::<Vec<_>>();

        session.reset_path();
        assert!(session.solver().is_none());
        assert!(session.path().is_empty());
        assert!((0..session.grid().size()).all(|cell| !session.grid().is_searched(cell)));
        assert_eq!(session.grid().passages().collect::<Vec<_>>(), passages);
        assert!(session.is_maze_completed());
    }

    #[test]
    fn reset_maze_starts_over() {
        let mut session = built_session(BuilderKind::Prim, 8);
        session.step_solver(SolverKind::Dijkstra);
        session.reset_maze().unwrap();
        assert!(session.builder().is_none());
        assert!(session.solver().is_none());
        assert_eq!(session.grid().visited_count(), 0);
        assert_eq!(session.grid().passages_count(), 0);
        assert!(session.route().is_some());
    }

    #[test]
    fn changing_the_route_drops_the_search() {
        let mut session = built_session(BuilderKind::Wilson, 2);
        session.step_solver(SolverKind::BreadthFirst);
        assert!(session.solver().is_some());

        assert_eq!(session.set_route(Route { start: 0, end: 0 }),
                   Err(RouteError::SameCell(0)));
        assert!(session.solver().is_some());

        session.set_route(Route { start: 0, end: 29 }).unwrap();
        assert!(session.solver().is_none());
        assert_eq!(session.route(), Some(Route { start: 0, end: 29 }));

        let rerolled = session.reroll_route().unwrap();
        assert_eq!(session.route(), Some(rerolled));
    }

    #[test]
    fn single_cell_session_has_no_route() {
        let mut session = Session::new(seeded_config(1, 1, 0)).unwrap();
        while session.step_builder(BuilderKind::Prim) == BuildProgress::Building {}
        assert_eq!(session.step_solver(SolverKind::AStar), SolveProgress::NoRoute);
        assert_eq!(session.reroll_route(), Err(RouteError::GridTooSmall));
    }

    #[test]
    fn same_seed_same_session() {
        let a = built_session(BuilderKind::Kruskal, 42);
        let b = built_session(BuilderKind::Kruskal, 42);
        assert_eq!(a.grid().cell_flags(), b.grid().cell_flags());
        assert_eq!(a.grid().weights(), b.grid().weights());
        assert_eq!(a.route(), b.route());
    }
}
