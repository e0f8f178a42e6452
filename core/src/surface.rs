use crate::*;

/// Whatever draws the game: the map, its overlays and the status panel.
///
/// The session only ever talks to the screen through this trait.
pub trait MapSurface {
    fn render_cache(&mut self, cache: &Geocache, bounds: GeoBounds);

    fn remove_all_cache_overlays(&mut self);

    /// Draws polyline number `index` of the trail, replacing it if it was drawn before.
    fn render_trail_segment(&mut self, index: usize, points: &[GeoPoint]);

    fn clear_trail(&mut self);

    fn set_status_text(&mut self, coin_count: usize);

    /// Follows the player: `point` is always the player's current position.
    fn center_map_on(&mut self, point: GeoPoint);

    /// Non-blocking message for the player.
    fn show_notice(&mut self, message: &str);
}

/// Surface that draws nothing, for running a session headless.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullSurface;

impl MapSurface for NullSurface {
    fn render_cache(&mut self, _cache: &Geocache, _bounds: GeoBounds) {}

    fn remove_all_cache_overlays(&mut self) {}

    fn render_trail_segment(&mut self, _index: usize, _points: &[GeoPoint]) {}

    fn clear_trail(&mut self) {}

    fn set_status_text(&mut self, _coin_count: usize) {}

    fn center_map_on(&mut self, _point: GeoPoint) {}

    fn show_notice(&mut self, message: &str) {
        log::info!("notice: {}", message);
    }
}
