use std::error::Error;
use std::fmt;

use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;
use smallvec::SmallVec;

use crate::cells::{CellFlags, CompassPrimary, GridCoordinate};
use crate::units::{CellPixels, ColumnsCount, Height, RowsCount, WallPixels, Width};

/// Up to four `(direction, neighbour cell)` pairs, always in North, East, South, West order.
pub type NeighbourSmallVec = SmallVec<[(CompassPrimary, usize); 4]>;

/// Pixel sizes of one cell and of the wall drawn between cells.
///
/// Purely geometric: the algorithms only ever look at cell counts.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct CellGeometry {
    pub cell_pixels: CellPixels,
    pub wall_pixels: WallPixels,
}

impl CellGeometry {
    pub fn new(cell_pixels: CellPixels, wall_pixels: WallPixels) -> CellGeometry {
        CellGeometry { cell_pixels, wall_pixels }
    }

    /// Distance in pixels from the origin of one cell to the origin of the next.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.cell_pixels.0 + self.wall_pixels.0
    }
}

impl Default for CellGeometry {
    fn default() -> CellGeometry {
        CellGeometry::new(CellPixels(10), WallPixels(2))
    }
}

/// Half open range `[low, high)` that random cell weights are drawn from.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct WeightRange {
    pub low: u32,
    pub high: u32,
}

impl WeightRange {
    pub fn new(low: u32, high: u32) -> Result<WeightRange, GridError> {
        if low > high {
            Err(GridError::InvalidWeightRange { low, high })
        } else {
            Ok(WeightRange { low, high })
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> u32 {
        if self.low == self.high {
            self.low
        } else {
            rng.gen_range(self.low..self.high)
        }
    }
}

impl Default for WeightRange {
    fn default() -> WeightRange {
        WeightRange { low: 0, high: 10 }
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GridError {
    EmptyDimensions,
    TooFewPixels { pixels: usize, pitch: usize },
    InvalidWeightRange { low: u32, high: u32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GridError::EmptyDimensions => write!(f, "a grid needs at least one column and one row"),
            GridError::TooFewPixels { pixels, pitch } => {
                write!(f, "{} pixels cannot hold a single cell of {} pixels", pixels, pitch)
            }
            GridError::InvalidWeightRange { low, high } => {
                write!(f, "invalid weight range [{}, {})", low, high)
            }
        }
    }
}

impl Error for GridError {}

/// Rectangular grid of cells addressed by a single index in column major order:
/// `index = column * rows + row`.
///
/// North of a cell is `index - 1`, south is `index + 1`, east is `index + rows` and west is
/// `index - rows`, each only where it stays inside the grid without wrapping onto another column.
#[derive(Clone)]
pub struct Grid {
    columns: usize,
    rows: usize,
    geometry: CellGeometry,
    cells: Vec<CellFlags>,
    weights: Vec<u32>,
    visited_cells_count: usize,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Grid :: columns: {}, rows: {}, visited: {}, passages: {}",
               self.columns,
               self.rows,
               self.visited_cells_count,
               self.passages_count())
    }
}

impl Grid {
    /// A grid where every wall is standing and every cell costs one to enter.
    pub fn new(columns: ColumnsCount, rows: RowsCount) -> Result<Grid, GridError> {
        Grid::with_geometry(columns, rows, CellGeometry::default())
    }

    pub fn with_geometry(ColumnsCount(columns): ColumnsCount,
                         RowsCount(rows): RowsCount,
                         geometry: CellGeometry)
                         -> Result<Grid, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::EmptyDimensions);
        }
        let size = columns * rows;
        Ok(Grid {
            columns,
            rows,
            geometry,
            cells: vec![CellFlags::empty(); size],
            weights: vec![1; size],
            visited_cells_count: 0,
        })
    }

    /// Fit as many whole cells as possible into a pixel area.
    pub fn from_pixels(Width(width): Width,
                       Height(height): Height,
                       geometry: CellGeometry)
                       -> Result<Grid, GridError> {
        let pitch = geometry.pitch();
        if pitch == 0 {
            return Err(GridError::EmptyDimensions);
        }
        let too_small = if width < pitch {
            Some(width)
        } else if height < pitch {
            Some(height)
        } else {
            None
        };
        if let Some(pixels) = too_small {
            return Err(GridError::TooFewPixels { pixels, pitch });
        }

        Grid::with_geometry(ColumnsCount(width / pitch), RowsCount(height / pitch), geometry)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        RowsCount(self.rows)
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        ColumnsCount(self.columns)
    }

    #[inline]
    pub fn geometry(&self) -> CellGeometry {
        self.geometry
    }

    #[inline]
    pub fn is_valid_cell(&self, cell: usize) -> bool {
        cell < self.size()
    }

    /// Convert a cell index to its column and row. None if the index is outside the grid.
    pub fn coordinate(&self, cell: usize) -> Option<GridCoordinate> {
        if self.is_valid_cell(cell) {
            Some(GridCoordinate::new(cell / self.rows, cell % self.rows))
        } else {
            None
        }
    }

    /// Convert a column and row to a cell index. None if the coordinate is outside the grid.
    pub fn index(&self, coord: GridCoordinate) -> Option<usize> {
        if coord.column < self.columns && coord.row < self.rows {
            Some(coord.column * self.rows + coord.row)
        } else {
            None
        }
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.size())
    }

    /// The cell one step away in `direction`, if it exists.
    pub fn neighbour_at_direction(&self, cell: usize, direction: CompassPrimary) -> Option<usize> {
        if !self.is_valid_cell(cell) {
            return None;
        }
        let row = cell % self.rows;
        match direction {
            CompassPrimary::North if row > 0 => Some(cell - 1),
            CompassPrimary::South if row + 1 < self.rows => Some(cell + 1),
            CompassPrimary::East if cell + self.rows < self.size() => Some(cell + self.rows),
            CompassPrimary::West if cell >= self.rows => Some(cell - self.rows),
            _ => None,
        }
    }

    /// Cells to the North, East, South or West, whether or not a passage leads there.
    pub fn neighbours(&self, cell: usize) -> NeighbourSmallVec {
        CompassPrimary::ALL
            .iter()
            .filter_map(|&dir| self.neighbour_at_direction(cell, dir).map(|n| (dir, n)))
            .collect()
    }

    /// Neighbouring cells reachable through a carved passage, in North, East, South, West order.
    pub fn open_neighbours(&self, cell: usize) -> NeighbourSmallVec {
        self.neighbours(cell)
            .into_iter()
            .filter(|&(dir, _)| self.is_open(cell, dir))
            .collect()
    }

    /// Which direction leads from `a` to the adjacent cell `b`. None if they are not adjacent.
    pub fn direction_between(&self, a: usize, b: usize) -> Option<CompassPrimary> {
        CompassPrimary::ALL
            .iter()
            .cloned()
            .find(|&dir| self.neighbour_at_direction(a, dir) == Some(b))
    }

    /// The full state bitmask of a cell. Cells outside the grid read as empty.
    #[inline]
    pub fn flags(&self, cell: usize) -> CellFlags {
        self.cells.get(cell).cloned().unwrap_or_default()
    }

    #[inline]
    pub fn cell_flags(&self) -> &[CellFlags] {
        &self.cells
    }

    #[inline]
    pub fn is_visited(&self, cell: usize) -> bool {
        self.flags(cell).contains(CellFlags::VISITED)
    }

    #[inline]
    pub fn is_searched(&self, cell: usize) -> bool {
        self.flags(cell).contains(CellFlags::SEARCHED)
    }

    /// Is there a carved passage leading out of `cell` in `direction`?
    #[inline]
    pub fn is_open(&self, cell: usize, direction: CompassPrimary) -> bool {
        self.flags(cell).is_open(direction)
    }

    /// Remove the wall between `cell` and its neighbour in `direction`, setting the wall-open bits on
    /// both sides together. Returns the neighbour, or None (and changes nothing) at the grid edge.
    pub fn carve_passage(&mut self, cell: usize, direction: CompassPrimary) -> Option<usize> {
        let neighbour = self.neighbour_at_direction(cell, direction)?;
        self.cells[cell].insert(direction.passage_flag());
        self.cells[neighbour].insert(direction.opposite().passage_flag());
        Some(neighbour)
    }

    /// Mark a cell as part of the maze. Returns true the first time only, when the cell also counts
    /// towards `visited_count`.
    pub fn mark_visited(&mut self, cell: usize) -> bool {
        if !self.is_valid_cell(cell) || self.is_visited(cell) {
            return false;
        }
        self.cells[cell].insert(CellFlags::VISITED);
        self.visited_cells_count += 1;
        true
    }

    /// Set the Visited bit without counting the cell. Builders whose visited cells do not form a
    /// single connected tree (Kruskal) use this and report completion with `complete_visits`.
    pub(crate) fn flag_visited(&mut self, cell: usize) {
        if let Some(flags) = self.cells.get_mut(cell) {
            flags.insert(CellFlags::VISITED);
        }
    }

    /// Flag every cell as visited and count them all.
    pub(crate) fn complete_visits(&mut self) {
        for flags in &mut self.cells {
            flags.insert(CellFlags::VISITED);
        }
        self.visited_cells_count = self.size();
    }

    pub fn mark_searched(&mut self, cell: usize) {
        if let Some(flags) = self.cells.get_mut(cell) {
            flags.insert(CellFlags::SEARCHED);
        }
    }

    /// Forget everything a solver did while keeping the maze itself.
    pub fn clear_searched(&mut self) {
        for flags in &mut self.cells {
            flags.remove(CellFlags::SEARCHED);
        }
    }

    #[inline]
    pub fn visited_count(&self) -> usize {
        self.visited_cells_count
    }

    /// The maze is complete once every cell has been counted as visited.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.visited_cells_count == self.size()
    }

    /// Cost of entering a cell. Cells outside the grid cost nothing.
    #[inline]
    pub fn weight(&self, cell: usize) -> u32 {
        self.weights.get(cell).cloned().unwrap_or(0)
    }

    #[inline]
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    pub fn set_weight(&mut self, cell: usize, weight: u32) {
        if let Some(w) = self.weights.get_mut(cell) {
            *w = weight;
        }
    }

    pub fn randomize_weights<R: Rng>(&mut self, rng: &mut R, range: WeightRange) {
        for w in &mut self.weights {
            *w = range.sample(rng);
        }
    }

    /// Every carved passage once, as `(cell, east or south neighbour)`.
    pub fn passages(&self) -> PassagesIter {
        PassagesIter {
            grid: self,
            cell: 0,
            pending_south: None,
        }
    }

    pub fn passages_count(&self) -> usize {
        self.passages().count()
    }

    /// The carved maze as an undirected graph whose node indices are the cell indices.
    pub fn to_graph(&self) -> UnGraph<(), ()> {
        let mut graph = UnGraph::with_capacity(self.size(), self.size());
        for _ in 0..self.size() {
            graph.add_node(());
        }
        for (a, b) in self.passages() {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }
        graph
    }
}

/// Iterator over the carved passages of a grid. Each passage is reported once, from the cell to
/// its east or south neighbour.
pub struct PassagesIter<'a> {
    grid: &'a Grid,
    cell: usize,
    pending_south: Option<(usize, usize)>,
}

impl<'a> Iterator for PassagesIter<'a> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(link) = self.pending_south.take() {
            return Some(link);
        }
        while self.cell < self.grid.size() {
            let cell = self.cell;
            self.cell += 1;

            let east = self.grid
                .neighbour_at_direction(cell, CompassPrimary::East)
                .filter(|_| self.grid.is_open(cell, CompassPrimary::East));
            let south = self.grid
                .neighbour_at_direction(cell, CompassPrimary::South)
                .filter(|_| self.grid.is_open(cell, CompassPrimary::South));

            match (east, south) {
                (Some(e), Some(s)) => {
                    self.pending_south = Some((cell, s));
                    return Some((cell, e));
                }
                (Some(e), None) => return Some((cell, e)),
                (None, Some(s)) => return Some((cell, s)),
                (None, None) => {}
            }
        }
        None
    }
}

impl<'a> fmt::Debug for PassagesIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PassagesIter :: next cell: {}", self.cell)
    }
}
