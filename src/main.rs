use std::fs::File;
use std::io;
use std::io::prelude::*;

use docopt::Docopt;
use error_chain::bail;
use log::{info, warn};
use serde_derive::Deserialize;

use stepmazes::{
    generators::BuilderKind,
    grid::{CellGeometry, WeightRange},
    grid_displays::{DistancesDisplay, GridDisplay, GridRender, PathDisplay, SearchedDisplay,
                    WeightsDisplay},
    pathing::SolverKind,
    renderers,
    session::{BuildProgress, Route, Session, SessionConfig, SolveProgress},
    units::{CellPixels, ColumnsCount, Height, RowsCount, WallPixels, Width},
};

const USAGE: &str = "Maze stepper

Builds a maze one step at a time, then solves it one step at a time.

Usage:
    maze_stepper -h | --help
    maze_stepper [(backtracker|kruskal|prim|wilson)] [(dfs|bfs|dijkstra|astar)] [options]

Options:
    -h --help               Show this screen.
    --columns=<n>           Number of cell columns [default: 20].
    --rows=<n>              Number of cell rows [default: 20].
    --pixel-width=<w>       Fit the maze into this many pixels across instead of using --columns.
    --pixel-height=<h>      Fit the maze into this many pixels down instead of using --rows.
    --cell-pixels=<n>       Pixel size of one cell [default: 10].
    --wall-pixels=<n>       Pixel size of the wall between cells [default: 2].
    --seed=<n>              Seed for the maze, the cell weights and the route.
    --start=<cell>          Cell index the search starts at. Random if not given.
    --end=<cell>            Cell index the search ends at. Random if not given.
    --min-weight=<n>        Lowest random cell weight, inclusive [default: 0].
    --max-weight=<n>        Highest random cell weight, exclusive [default: 10].
    --amplifier=<n>         Multiplier for the A* distance heuristic [default: 1].
    --show=<what>           Text cell contents: path, searched, distances, weights or none [default: path].
    --text-out=<path>       Write the text rendering to a file instead of standard output.
    --image-out=<path>      Write a PNG rendering of the maze.
    --show-searched         Colour the searched cells in the PNG rendering.
    --save-edges=<path>     Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_backtracker: bool,
    cmd_kruskal: bool,
    cmd_prim: bool,
    cmd_wilson: bool,
    cmd_dfs: bool,
    cmd_bfs: bool,
    cmd_dijkstra: bool,
    cmd_astar: bool,
    flag_columns: usize,
    flag_rows: usize,
    flag_pixel_width: Option<usize>,
    flag_pixel_height: Option<usize>,
    flag_cell_pixels: usize,
    flag_wall_pixels: usize,
    flag_seed: Option<u64>,
    flag_start: Option<usize>,
    flag_end: Option<usize>,
    flag_min_weight: u32,
    flag_max_weight: u32,
    flag_amplifier: u32,
    flag_show: String,
    flag_text_out: String,
    flag_image_out: String,
    flag_show_searched: bool,
    flag_save_edges: String,
}

impl MazeArgs {
    fn builder_kind(&self) -> BuilderKind {
        if self.cmd_kruskal {
            BuilderKind::Kruskal
        } else if self.cmd_prim {
            BuilderKind::Prim
        } else if self.cmd_wilson {
            BuilderKind::Wilson
        } else {
            BuilderKind::RecursiveBacktracker
        }
    }

    fn solver_kind(&self) -> SolverKind {
        if self.cmd_dfs {
            SolverKind::DepthFirst
        } else if self.cmd_dijkstra {
            SolverKind::Dijkstra
        } else if self.cmd_astar {
            SolverKind::AStar
        } else {
            SolverKind::BreadthFirst
        }
    }
}

mod errors {
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            ImageError(::image::ImageError);
            Io(::std::io::Error);
            Grid(::stepmazes::grid::GridError);
            Route(::stepmazes::session::RouteError);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;
    let config = session_config(&args)?;
    let mut session = Session::new(config)?;

    if args.flag_start.is_some() || args.flag_end.is_some() {
        let route = requested_route(args.flag_start, args.flag_end, session.route());
        session.set_route(route)?;
    }

    let builder_kind = args.builder_kind();
    while session.step_builder(builder_kind) == BuildProgress::Building {}

    let solver_kind = args.solver_kind();
    if !solver_kind.is_weighted() && args.flag_show == "weights" {
        warn!("{} ignores the cell weights it is shown with", solver_kind);
    }
    let progress = solve(&mut session, solver_kind);
    match progress {
        SolveProgress::Solved => {
            if let Some(solver) = session.solver() {
                info!("{} took {} steps", solver_kind, solver.steps());
            }
        }
        SolveProgress::NoRoute => warn!("the maze is too small to hold a route"),
        other => bail!("{} stopped without a path: {:?}", solver_kind, other),
    }

    write_text(&session, &args)?;

    if !args.flag_image_out.is_empty() {
        let mut options = renderers::RenderOptionsBuilder::new()
            .path(session.path())
            .show_searched(args.flag_show_searched);
        if let Some(route) = session.route() {
            options = options.route(route);
        }
        renderers::render_png(session.grid(), &options.build())
            .save(&args.flag_image_out)
            .chain_err(|| format!("Failed to write maze image {}", args.flag_image_out))?;
    }

    if !args.flag_save_edges.is_empty() {
        save_maze_graph(&session, &args.flag_save_edges)?;
    }

    Ok(())
}

fn session_config(args: &MazeArgs) -> Result<SessionConfig> {
    let geometry = CellGeometry::new(CellPixels(args.flag_cell_pixels),
                                     WallPixels(args.flag_wall_pixels));

    let mut config = match (args.flag_pixel_width, args.flag_pixel_height) {
        (Some(width), Some(height)) => {
            SessionConfig::from_pixels(Width(width), Height(height), geometry)?
        }
        (None, None) => {
            SessionConfig {
                columns: ColumnsCount(args.flag_columns),
                rows: RowsCount(args.flag_rows),
                geometry,
                ..SessionConfig::default()
            }
        }
        _ => bail!("--pixel-width and --pixel-height must be given together"),
    };

    config.weights = WeightRange::new(args.flag_min_weight, args.flag_max_weight)?;
    config.seed = args.flag_seed;
    config.astar_amplifier = args.flag_amplifier;
    Ok(config)
}

/// Fill in whichever endpoint was not asked for from the random route, taking its other end when
/// the matching one collides with the requested cell.
fn requested_route(start: Option<usize>, end: Option<usize>, random: Option<Route>) -> Route {
    let other_than = |cell: usize, preferred: usize, fallback: usize| {
        if preferred != cell { preferred } else { fallback }
    };
    match (start, end, random) {
        (Some(start), Some(end), _) => Route { start, end },
        (Some(start), None, Some(r)) => Route { start, end: other_than(start, r.end, r.start) },
        (None, Some(end), Some(r)) => Route { start: other_than(end, r.start, r.end), end },
        (start, end, None) => {
            Route {
                start: start.unwrap_or(0),
                end: end.unwrap_or(0),
            }
        }
        (None, None, Some(r)) => r,
    }
}

/// Step the solver until it stops making progress.
fn solve(session: &mut Session, kind: SolverKind) -> SolveProgress {
    loop {
        match session.step_solver(kind) {
            SolveProgress::Searching => {}
            other => return other,
        }
    }
}

fn write_text(session: &Session, args: &MazeArgs) -> Result<()> {
    let grid = session.grid();
    let display: Option<Box<dyn GridDisplay>> = match args.flag_show.as_str() {
        "path" => Some(Box::new(PathDisplay::new(session.path()))),
        "searched" => Some(Box::new(SearchedDisplay::new(grid))),
        "distances" => {
            session.solver().map(|s| Box::new(DistancesDisplay::new(s)) as Box<dyn GridDisplay>)
        }
        "weights" => Some(Box::new(WeightsDisplay::new(grid))),
        "none" => None,
        other => bail!("unknown --show value {}", other),
    };
    let text = GridRender::new(grid, display.as_ref().map(|d| &**d)).to_string();

    if args.flag_text_out.is_empty() {
        print!("{}", text);
    } else {
        write_text_to_file(&text, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }
    Ok(())
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(session: &Session, file_path: &str) -> Result<()> {
    let graph = session.grid().to_graph();

    let mut graph_data = format!("{} {}\n", graph.node_count(), graph.edge_count());
    for edge in graph.raw_edges() {
        let src_as_1_based_index = edge.source().index() + 1;
        let dst_as_1_based_index = edge.target().index() + 1;
        graph_data.push_str(&format!("{} {}\n", src_as_1_based_index, dst_as_1_based_index));
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_endpoint_never_repeats_the_given_one() {
        let random = Some(Route { start: 3, end: 8 });
        assert_eq!(requested_route(Some(8), None, random), Route { start: 8, end: 3 });
        assert_eq!(requested_route(Some(5), None, random), Route { start: 5, end: 8 });
        assert_eq!(requested_route(None, Some(3), random), Route { start: 8, end: 3 });
        assert_eq!(requested_route(None, Some(5), random), Route { start: 3, end: 5 });
        assert_eq!(requested_route(Some(1), Some(2), random), Route { start: 1, end: 2 });
    }

    #[test]
    fn start_given_alone_forms_a_valid_route() {
        let config = SessionConfig {
            columns: ColumnsCount(4),
            rows: RowsCount(4),
            seed: Some(17),
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).unwrap();
        let random = session.route().unwrap();
        let route = requested_route(Some(random.end), None, Some(random));
        assert!(session.set_route(route).is_ok());
        assert_eq!(session.route(), Some(Route { start: random.end, end: random.start }));
    }
}
