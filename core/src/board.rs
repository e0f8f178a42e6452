use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Grid tile index relative to the global origin (lat 0, lng 0).
///
/// Serialized as its canonical key, `"i,j"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Cell {
    pub i: i32,
    pub j: i32,
}

impl Cell {
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// Chebyshev distance in tiles.
    #[cfg(test)]
    pub const fn grid_distance(self, other: Cell) -> u32 {
        let di = self.i.abs_diff(other.i);
        let dj = self.j.abs_diff(other.j);
        if di > dj { di } else { dj }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.i, self.j)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCellError;

impl fmt::Display for ParseCellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected a cell key of the form \"i,j\"")
    }
}

impl FromStr for Cell {
    type Err = ParseCellError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let (i, j) = s.split_once(',').ok_or(ParseCellError)?;
        let i = i.trim().parse().map_err(|_| ParseCellError)?;
        let j = j.trim().parse().map_err(|_| ParseCellError)?;
        Ok(Self::new(i, j))
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        cell.to_string()
    }
}

impl TryFrom<String> for Cell {
    type Error = ParseCellError;

    fn try_from(value: String) -> core::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Largest integer not greater than `value`, saturating at the `i32` range.
fn floor_index(value: f64) -> i32 {
    let truncated = value as i32;
    if f64::from(truncated) > value {
        truncated.saturating_sub(1)
    } else {
        truncated
    }
}

/// Maps between geographic points and grid cells.
#[derive(Clone, Debug)]
pub struct Board {
    tile_degrees: f64,
    neighborhood_size: u16,
    known_cells: HashMap<(i32, i32), Cell>,
}

impl Board {
    pub fn new(tile_degrees: f64, neighborhood_size: u16) -> Self {
        Self {
            tile_degrees,
            neighborhood_size,
            known_cells: HashMap::new(),
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.tile_degrees, config.neighborhood_size)
    }

    pub fn tile_degrees(&self) -> f64 {
        self.tile_degrees
    }

    pub fn neighborhood_size(&self) -> u16 {
        self.neighborhood_size
    }

    /// Number of distinct cells handed out so far.
    #[cfg(test)]
    pub fn known_cell_count(&self) -> usize {
        self.known_cells.len()
    }

    pub fn canonical_cell(&mut self, i: i32, j: i32) -> Cell {
        *self
            .known_cells
            .entry((i, j))
            .or_insert_with(|| Cell::new(i, j))
    }

    pub fn cell_for_point(&mut self, point: GeoPoint) -> Cell {
        let i = floor_index(point.lat / self.tile_degrees);
        let j = floor_index(point.lng / self.tile_degrees);
        self.canonical_cell(i, j)
    }

    pub fn cell_bounds(&self, cell: Cell) -> GeoBounds {
        let t = self.tile_degrees;
        GeoBounds {
            south_west: GeoPoint::new(f64::from(cell.i) * t, f64::from(cell.j) * t),
            north_east: GeoPoint::new(
                f64::from(cell.i.saturating_add(1)) * t,
                f64::from(cell.j.saturating_add(1)) * t,
            ),
        }
    }

    /// Every cell in the `2r x 2r` window around the cell containing `point`, row-major.
    pub fn cells_near_point(&mut self, point: GeoPoint) -> Vec<Cell> {
        let center = self.cell_for_point(point);
        let radius = i32::from(self.neighborhood_size);
        let side = 2 * self.neighborhood_size as usize;

        let mut cells = Vec::with_capacity(side * side);
        for di in -radius..radius {
            for dj in -radius..radius {
                cells.push(
                    self.canonical_cell(center.i.saturating_add(di), center.j.saturating_add(dj)),
                );
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;

    fn board() -> Board {
        Board::new(1e-4, 8)
    }

    #[test]
    fn cell_for_point_floors_toward_negative_infinity() {
        let mut board = Board::new(1.0, 1);

        assert_eq!(board.cell_for_point(GeoPoint::new(0.5, 1.5)), Cell::new(0, 1));
        assert_eq!(board.cell_for_point(GeoPoint::new(-0.5, -1.0)), Cell::new(-1, -1));
        assert_eq!(board.cell_for_point(GeoPoint::new(-2.0, 3.0)), Cell::new(-2, 3));
    }

    #[test]
    fn cell_bounds_span_one_tile_and_contain_their_points() {
        let mut board = Board::new(0.25, 1);
        let point = GeoPoint::new(1.1, -0.6);
        let cell = board.cell_for_point(point);
        let bounds = board.cell_bounds(cell);

        assert_eq!(cell, Cell::new(4, -3));
        assert_eq!(bounds.south_west, GeoPoint::new(1.0, -0.75));
        assert_eq!(bounds.north_east, GeoPoint::new(1.25, -0.5));
        assert!(bounds.contains(point));
    }

    #[test]
    fn cells_near_point_cover_square_window_once() {
        let mut board = board();
        let point = GameConfig::CLASSROOM;
        let center = board.cell_for_point(point);

        let cells = board.cells_near_point(point);
        let unique: BTreeSet<_> = cells.iter().copied().collect();

        assert_eq!(cells.len(), 256);
        assert_eq!(unique.len(), 256);
        assert!(unique.contains(&Cell::new(center.i - 8, center.j - 8)));
        assert!(unique.contains(&Cell::new(center.i + 7, center.j + 7)));
        assert!(!unique.contains(&Cell::new(center.i + 8, center.j)));
        assert!(cells.iter().all(|&cell| cell.grid_distance(center) <= 8));
    }

    #[test]
    fn cells_near_point_order_is_stable() {
        let mut board = board();
        let point = GeoPoint::new(-12.34567, 98.7654);

        assert_eq!(board.cells_near_point(point), board.cells_near_point(point));
    }

    #[test]
    fn canonical_cells_are_shared() {
        let mut board = board();

        let first = board.canonical_cell(3, -4);
        let second = board.canonical_cell(3, -4);
        board.canonical_cell(0, 0);

        assert_eq!(first, second);
        assert_eq!(board.known_cell_count(), 2);
    }

    #[test]
    fn cell_key_round_trips_through_string() {
        let cell = Cell::new(-3, 5);

        assert_eq!(cell.to_string(), "-3,5");
        assert_eq!("-3,5".parse::<Cell>(), Ok(cell));
        assert_eq!("3;5".parse::<Cell>(), Err(ParseCellError));
    }
}
