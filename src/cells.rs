use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// The four passage directions out of a square cell.
///
/// Anything that checks neighbours does so in the order of `CompassPrimary::ALL`,
/// North, East, South then West.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

impl CompassPrimary {
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    /// The wall-open bit recording a carved passage in this direction.
    pub fn passage_flag(self) -> CellFlags {
        match self {
            CompassPrimary::North => CellFlags::NORTH,
            CompassPrimary::East => CellFlags::EAST,
            CompassPrimary::South => CellFlags::SOUTH,
            CompassPrimary::West => CellFlags::WEST,
        }
    }
}

/// Per cell state bitmask.
///
/// The low four bits are wall-open bits ("there is no wall towards that neighbour"), the next two
/// record whether a builder has visited the cell and whether a solver has searched it.
#[derive(Eq, PartialEq, Copy, Clone, Default, Hash)]
pub struct CellFlags(u8);

impl CellFlags {
    pub const NORTH: CellFlags = CellFlags(0x01);
    pub const EAST: CellFlags = CellFlags(0x02);
    pub const SOUTH: CellFlags = CellFlags(0x04);
    pub const WEST: CellFlags = CellFlags(0x08);
    pub const VISITED: CellFlags = CellFlags(0x10);
    pub const SEARCHED: CellFlags = CellFlags(0x20);

    const PASSAGES: u8 = 0x0F;

    #[inline]
    pub fn empty() -> CellFlags {
        CellFlags(0)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, other: CellFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: CellFlags) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: CellFlags) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn is_open(self, direction: CompassPrimary) -> bool {
        self.contains(direction.passage_flag())
    }

    /// How many passages lead out of this cell.
    #[inline]
    pub fn passages_count(self) -> u32 {
        (self.0 & CellFlags::PASSAGES).count_ones()
    }
}

impl BitOr for CellFlags {
    type Output = CellFlags;

    fn bitor(self, rhs: CellFlags) -> CellFlags {
        CellFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for CellFlags {
    fn bitor_assign(&mut self, rhs: CellFlags) {
        self.insert(rhs);
    }
}

impl fmt::Debug for CellFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = [(CellFlags::NORTH, "N"),
                     (CellFlags::EAST, "E"),
                     (CellFlags::SOUTH, "S"),
                     (CellFlags::WEST, "W"),
                     (CellFlags::VISITED, "visited"),
                     (CellFlags::SEARCHED, "searched")];
        let set = names.iter()
            .filter(|&&(flag, _)| self.contains(flag))
            .map(|&(_, name)| name)
            .collect::<Vec<_>>();
        write!(f, "CellFlags({:#04x} [{}])", self.0, set.join("|"))
    }
}

/// A cell position as a column (distance from the west edge) and a row (distance from the north
/// edge).
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct GridCoordinate {
    pub column: usize,
    pub row: usize,
}

impl GridCoordinate {
    pub fn new(column: usize, row: usize) -> GridCoordinate {
        GridCoordinate { column, row }
    }

    /// Straight line distance between two cells measured in cells.
    pub fn euclidean_distance(&self, other: GridCoordinate) -> f64 {
        let dx = self.column as f64 - other.column as f64;
        let dy = self.row as f64 - other.row as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(usize, usize)> for GridCoordinate {
    fn from(column_row_pair: (usize, usize)) -> GridCoordinate {
        GridCoordinate::new(column_row_pair.0, column_row_pair.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions() {
        for dir in CompassPrimary::ALL.iter() {
            assert_ne!(*dir, dir.opposite());
            assert_eq!(*dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn passage_flags_are_distinct_bits() {
        let all = CompassPrimary::ALL
            .iter()
            .fold(CellFlags::empty(), |acc, dir| acc | dir.passage_flag());
        assert_eq!(all.bits(), 0x0F);
        assert_eq!(all.passages_count(), 4);
        assert!(!all.contains(CellFlags::VISITED));
    }

    #[test]
    fn insert_and_remove_flags() {
        let mut flags = CellFlags::empty();
        flags.insert(CellFlags::VISITED | CellFlags::EAST);
        assert!(flags.contains(CellFlags::VISITED));
        assert!(flags.is_open(CompassPrimary::East));
        assert!(!flags.is_open(CompassPrimary::West));

        flags |= CellFlags::SEARCHED;
        flags.remove(CellFlags::SEARCHED);
        assert!(!flags.contains(CellFlags::SEARCHED));
        assert_eq!(flags.passages_count(), 1);
    }

    #[test]
    fn euclidean_distance() {
        let origin = GridCoordinate::new(0, 0);
        assert_eq!(origin.euclidean_distance(GridCoordinate::new(3, 4)), 5.0);
        assert_eq!(GridCoordinate::from((2, 2)).euclidean_distance(origin).floor(), 2.0);
    }
}
