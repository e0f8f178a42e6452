#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use geocache::*;
pub use lifecycle::*;
pub use luck::*;
pub use player::*;
pub use session::*;
pub use surface::*;

mod board;
mod error;
mod geocache;
mod lifecycle;
mod luck;
mod player;
mod session;
mod surface;

/// A latitude/longitude pair in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Offsets the point by a whole number of tiles along each axis.
    pub fn offset_tiles(self, di: i32, dj: i32, tile_degrees: f64) -> Self {
        Self {
            lat: self.lat + f64::from(di) * tile_degrees,
            lng: self.lng + f64::from(dj) * tile_degrees,
        }
    }
}

/// Axis-aligned rectangle between two corners, south-west first.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    #[cfg(test)]
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat < self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng < self.north_east.lng
    }
}

/// Tunable gameplay parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Angular size of one grid tile, in degrees.
    pub tile_degrees: f64,
    /// How many tiles around the player are materialized in each direction.
    pub neighborhood_size: u16,
    /// Chance for any given cell to host a cache.
    pub cache_spawn_probability: f64,
    /// Exclusive upper bound on the number of coins a fresh cache starts with.
    pub initial_stock_bound: u32,
    /// Where a new (or reset) player starts.
    pub start: GeoPoint,
    pub zoom: u8,
}

impl GameConfig {
    /// Location of the classroom the game was designed around.
    pub const CLASSROOM: GeoPoint = GeoPoint::new(36.98949379578401, -122.06277128548504);

    pub const fn new_unchecked(
        tile_degrees: f64,
        neighborhood_size: u16,
        cache_spawn_probability: f64,
        initial_stock_bound: u32,
        start: GeoPoint,
    ) -> Self {
        Self {
            tile_degrees,
            neighborhood_size,
            cache_spawn_probability,
            initial_stock_bound,
            start,
            zoom: 19,
        }
    }

    pub fn new(
        tile_degrees: f64,
        neighborhood_size: u16,
        cache_spawn_probability: f64,
        initial_stock_bound: u32,
        start: GeoPoint,
    ) -> Self {
        let tile_degrees = if tile_degrees.is_finite() && tile_degrees > 0.0 {
            tile_degrees
        } else {
            log::warn!("Invalid tile size {}, using default", tile_degrees);
            Self::default().tile_degrees
        };
        let neighborhood_size = neighborhood_size.clamp(1, Self::MAX_NEIGHBORHOOD);
        let cache_spawn_probability = cache_spawn_probability.clamp(0.0, 1.0);
        let initial_stock_bound = initial_stock_bound.min(Self::MAX_STOCK_BOUND);
        Self::new_unchecked(
            tile_degrees,
            neighborhood_size,
            cache_spawn_probability,
            initial_stock_bound,
            start,
        )
    }

    /// Keeps the visible window (and the work done per move) bounded.
    pub const MAX_NEIGHBORHOOD: u16 = 64;

    /// Upper limit on the coins a fresh cache can start with.
    pub const MAX_STOCK_BOUND: u32 = 1_000;

    /// Number of cells inspected on every refresh.
    #[cfg(test)]
    pub const fn window_cells(&self) -> usize {
        let side = 2 * self.neighborhood_size as usize;
        side * side
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new_unchecked(1e-4, 8, 0.1, 10, Self::CLASSROOM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_clamps_out_of_range_parameters() {
        let config = GameConfig::new(-1.0, 0, 3.0, 10, GeoPoint::new(0.0, 0.0));

        assert_eq!(config.tile_degrees, 1e-4);
        assert_eq!(config.neighborhood_size, 1);
        assert_eq!(config.cache_spawn_probability, 1.0);
        assert_eq!(config.initial_stock_bound, 10);
    }

    #[test]
    fn new_caps_the_initial_stock_bound() {
        let config = GameConfig::new(1e-4, 8, 0.1, u32::MAX, GeoPoint::new(0.0, 0.0));

        assert_eq!(config.initial_stock_bound, GameConfig::MAX_STOCK_BOUND);
    }

    #[test]
    fn default_window_is_sixteen_by_sixteen() {
        assert_eq!(GameConfig::default().window_cells(), 256);
    }

    #[test]
    fn offset_tiles_moves_by_whole_tiles() {
        let moved = GeoPoint::new(1.0, 2.0).offset_tiles(1, -2, 0.5);

        assert_eq!(moved, GeoPoint::new(1.5, 1.0));
    }
}
