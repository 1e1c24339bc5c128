//! Box drawing text output for grids, with pluggable cell contents.

use std::fmt;

use fnv::FnvHashSet;
use itertools::Itertools;

use crate::cells::CompassPrimary;
use crate::grid::Grid;
use crate::pathing::MazeSolver;
use crate::units::{ColumnsCount, RowsCount};

const WALL_L: &str = "╴";
const WALL_R: &str = "╶";
const WALL_U: &str = "╵";
const WALL_D: &str = "╷";
const WALL_LR_3: &str = "───";
const WALL_LR: &str = "─";
const WALL_UD: &str = "│";
const WALL_LD: &str = "┐";
const WALL_RU: &str = "└";
const WALL_LU: &str = "┘";
const WALL_RD: &str = "┌";
const WALL_LRU: &str = "┴";
const WALL_LRD: &str = "┬";
const WALL_LRUD: &str = "┼";
const WALL_RUD: &str = "├";
const WALL_LUD: &str = "┤";

const EMPTY_BODY: &str = "   ";

pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _cell: usize) -> String {
        String::from(EMPTY_BODY)
    }
}

/// A grid paired with an optional cell content renderer.
pub struct GridRender<'a> {
    grid: &'a Grid,
    display: Option<&'a dyn GridDisplay>,
}

impl<'a> GridRender<'a> {
    pub fn new(grid: &'a Grid, display: Option<&'a dyn GridDisplay>) -> GridRender<'a> {
        GridRender { grid, display }
    }

    fn closed_east(&self, column: usize, row: usize) -> bool {
        !self.grid.is_open(self.cell(column, row), CompassPrimary::East)
    }

    fn closed_south(&self, column: usize, row: usize) -> bool {
        !self.grid.is_open(self.cell(column, row), CompassPrimary::South)
    }

    fn cell(&self, column: usize, row: usize) -> usize {
        let RowsCount(rows) = self.grid.rows();
        column * rows + row
    }

    /// The glyph where the corners of up to four cells meet. `(x, y)` is the north west corner of
    /// the cell at column x and row y; x and y may be one past the last column or row.
    fn corner(&self, x: usize, y: usize) -> &'static str {
        let ColumnsCount(columns) = self.grid.columns();
        let RowsCount(rows) = self.grid.rows();
        let outer_column = x == 0 || x == columns;
        let outer_row = y == 0 || y == rows;

        let up = y > 0 && (outer_column || self.closed_east(x - 1, y - 1));
        let down = y < rows && (outer_column || self.closed_east(x - 1, y));
        let left = x > 0 && (outer_row || self.closed_south(x - 1, y - 1));
        let right = x < columns && (outer_row || self.closed_south(x, y - 1));

        match (left, right, up, down) {
            (true, true, true, true) => WALL_LRUD,
            (true, true, true, false) => WALL_LRU,
            (true, true, false, true) => WALL_LRD,
            (true, false, true, true) => WALL_LUD,
            (false, true, true, true) => WALL_RUD,
            (true, true, false, false) => WALL_LR,
            (false, false, true, true) => WALL_UD,
            (false, true, true, false) => WALL_RU,
            (true, false, false, true) => WALL_LD,
            (true, false, true, false) => WALL_LU,
            (false, true, false, true) => WALL_RD,
            (true, false, false, false) => WALL_L,
            (false, true, false, false) => WALL_R,
            (false, false, true, false) => WALL_U,
            (false, false, false, true) => WALL_D,
            (false, false, false, false) => " ",
        }
    }

    /// The line of walls along the top of row `y`.
    fn wall_line(&self, y: usize) -> String {
        let ColumnsCount(columns) = self.grid.columns();
        let RowsCount(rows) = self.grid.rows();

        let mut line = String::from(self.corner(0, y));
        for x in 0..columns {
            let wall = y == 0 || y == rows || self.closed_south(x, y - 1);
            line.push_str(if wall { WALL_LR_3 } else { EMPTY_BODY });
            line.push_str(self.corner(x + 1, y));
        }
        line
    }

    fn cell_line(&self, y: usize) -> String {
        let ColumnsCount(columns) = self.grid.columns();
        let bodies = (0..columns)
            .map(|x| {
                let body = self.display
                    .map_or_else(|| String::from(EMPTY_BODY),
                                 |display| display.render_cell_body(self.cell(x, y)));
                let east = if x + 1 == columns || self.closed_east(x, y) { WALL_UD } else { " " };
                format!("{}{}", body, east)
            })
            .join("");
        format!("{}{}", WALL_UD, bodies)
    }
}

impl<'a> fmt::Display for GridRender<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let RowsCount(rows) = self.grid.rows();
        for y in 0..rows {
            writeln!(f, "{}", self.wall_line(y))?;
            writeln!(f, "{}", self.cell_line(y))?;
        }
        writeln!(f, "{}", self.wall_line(rows))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        GridRender::new(self, None).fmt(f)
    }
}

/// Marks the cells of a path, `S` and `E` at its ends.
#[derive(Debug)]
pub struct PathDisplay {
    on_path: FnvHashSet<usize>,
    start: Option<usize>,
    end: Option<usize>,
}

impl PathDisplay {
    pub fn new(path: &[usize]) -> PathDisplay {
        PathDisplay {
            on_path: path.iter().cloned().collect(),
            start: path.first().cloned(),
            end: path.last().cloned(),
        }
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, cell: usize) -> String {
        if self.start == Some(cell) {
            String::from(" S ")
        } else if self.end == Some(cell) {
            String::from(" E ")
        } else if self.on_path.contains(&cell) {
            String::from(" . ")
        } else {
            String::from(EMPTY_BODY)
        }
    }
}

/// Shows which cells a solver has searched.
#[derive(Debug)]
pub struct SearchedDisplay {
    searched: Vec<bool>,
}

impl SearchedDisplay {
    pub fn new(grid: &Grid) -> SearchedDisplay {
        SearchedDisplay { searched: (0..grid.size()).map(|cell| grid.is_searched(cell)).collect() }
    }
}

impl GridDisplay for SearchedDisplay {
    fn render_cell_body(&self, cell: usize) -> String {
        if self.searched.get(cell).cloned().unwrap_or(false) {
            String::from(" * ")
        } else {
            String::from(EMPTY_BODY)
        }
    }
}

/// Solver distances in hexadecimal. Anything wider than three digits shows as `+++`.
#[derive(Debug)]
pub struct DistancesDisplay {
    distances: Vec<Option<u32>>,
}

impl DistancesDisplay {
    pub fn new(solver: &MazeSolver) -> DistancesDisplay {
        DistancesDisplay { distances: solver.distances() }
    }
}

impl GridDisplay for DistancesDisplay {
    fn render_cell_body(&self, cell: usize) -> String {
        match self.distances.get(cell).cloned().unwrap_or(None) {
            // centre align, padding 3, lowercase hexadecimal
            Some(d) if d <= 0xfff => format!("{:^3x}", d),
            Some(_) => String::from("+++"),
            None => String::from(EMPTY_BODY),
        }
    }
}

/// Cell weights in decimal.
#[derive(Debug)]
pub struct WeightsDisplay {
    weights: Vec<u32>,
}

impl WeightsDisplay {
    pub fn new(grid: &Grid) -> WeightsDisplay {
        WeightsDisplay { weights: grid.weights().to_vec() }
    }
}

impl GridDisplay for WeightsDisplay {
    fn render_cell_body(&self, cell: usize) -> String {
        match self.weights.get(cell) {
            Some(&w) if w <= 999 => format!("{:^3}", w),
            Some(_) => String::from("+++"),
            None => String::from(EMPTY_BODY),
        }
    }
}
