use smallvec::SmallVec;

use crate::cells::CompassPrimary;
use crate::grid::Grid;

/// One entry of the wall list: the wall on the `direction` side of `cell`. `neighbour` is None for
/// walls on the outer boundary of the grid, which can never be carved.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Wall {
    pub cell: usize,
    pub direction: CompassPrimary,
    pub neighbour: Option<usize>,
}

/// Static table of every wall in a grid, `2 * area` entries long.
///
/// Index `i < area` is the wall between cell `i` and cell `i - 1` (its North side). Index
/// `i >= area` is the wall between cell `i - area` and cell `i - area + rows` (its East side).
/// Every interior wall appears exactly once; the remaining entries are boundary walls.
#[derive(Debug, Clone)]
pub struct WallList {
    walls: Vec<Wall>,
    area: usize,
    rows: usize,
}

impl WallList {
    pub fn new(grid: &Grid) -> WallList {
        let area = grid.size();
        let rows = grid.rows().0;

        let north_walls = (0..area).map(|cell| {
            Wall {
                cell,
                direction: CompassPrimary::North,
                neighbour: grid.neighbour_at_direction(cell, CompassPrimary::North),
            }
        });
        let east_walls = (0..area).map(|cell| {
            Wall {
                cell,
                direction: CompassPrimary::East,
                neighbour: grid.neighbour_at_direction(cell, CompassPrimary::East),
            }
        });

        WallList {
            walls: north_walls.chain(east_walls).collect(),
            area,
            rows,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.walls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Wall> {
        self.walls.get(index).cloned()
    }

    /// Indices of the carvable (non boundary) walls around `cell`, in North, East, South, West order.
    pub fn incident_walls(&self, cell: usize) -> SmallVec<[usize; 4]> {
        let mut incident = SmallVec::new();
        if cell >= self.area {
            return incident;
        }
        let row = cell % self.rows;

        if row > 0 {
            incident.push(cell);
        }
        if cell + self.rows < self.area {
            incident.push(self.area + cell);
        }
        if row + 1 < self.rows {
            // the north wall of the cell below
            incident.push(cell + 1);
        }
        if cell >= self.rows {
            // the east wall of the cell to the west
            incident.push(self.area + cell - self.rows);
        }
        incident
    }
}
