use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything needed to resume a session, in the shape it is stored in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub player: GeoPoint,
    pub inventory: Inventory,
    pub mementos: BTreeMap<Cell, Memento>,
    pub auto_locate: bool,
    pub trail: Vec<Vec<GeoPoint>>,
}

impl SavedGame {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            player: config.start,
            inventory: Inventory::new(),
            mementos: BTreeMap::new(),
            auto_locate: false,
            trail: Vec::new(),
        }
    }
}

/// Input the session reacts to, one at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    PlayerMoved(GeoPoint),
    /// One tile step; `di` is north/south, `dj` east/west.
    DirectionalIntent { di: i32, dj: i32 },
    LocationFix(GeoPoint),
    LocationUnavailable(String),
    AutoLocateToggled(bool),
    CollectRequested(Cell),
    DepositRequested(Cell),
    ResetRequested,
}

impl GameEvent {
    pub const NORTH: Self = Self::DirectionalIntent { di: 1, dj: 0 };
    pub const SOUTH: Self = Self::DirectionalIntent { di: -1, dj: 0 };
    pub const EAST: Self = Self::DirectionalIntent { di: 0, dj: 1 };
    pub const WEST: Self = Self::DirectionalIntent { di: 0, dj: -1 };
}

/// The whole game: the player, their coins, and the world around them.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: GameConfig,
    board: Board,
    lifecycle: CacheLifecycle,
    inventory: Inventory,
    player: GeoPoint,
    auto_locate: bool,
    trail: Vec<Vec<GeoPoint>>,
    trail_break: bool,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let saved = SavedGame::new(&config);
        Self::from_saved(config, saved)
    }

    pub fn from_saved(config: GameConfig, saved: SavedGame) -> Self {
        let SavedGame {
            player,
            inventory,
            mementos,
            auto_locate,
            trail,
        } = saved;

        let mut session = Self {
            board: Board::from_config(&config),
            config,
            lifecycle: CacheLifecycle::with_mementos(mementos),
            inventory,
            player,
            auto_locate,
            trail,
            trail_break: auto_locate,
        };
        session.refresh();
        session
    }

    pub fn to_saved(&self) -> SavedGame {
        SavedGame {
            player: self.player,
            inventory: self.inventory.clone(),
            mementos: self.lifecycle.snapshot(),
            auto_locate: self.auto_locate,
            trail: self.trail.clone(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> GeoPoint {
        self.player
    }

    pub fn player_cell(&mut self) -> Cell {
        self.board.cell_for_point(self.player)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn auto_locate(&self) -> bool {
        self.auto_locate
    }

    pub fn trail(&self) -> &[Vec<GeoPoint>] {
        &self.trail
    }

    pub fn lifecycle(&self) -> &CacheLifecycle {
        &self.lifecycle
    }

    pub fn cache(&self, cell: Cell) -> Option<&Geocache> {
        self.lifecycle.cache(cell)
    }

    /// Draws the current state from scratch.
    pub fn render(&self, surface: &mut impl MapSurface) {
        self.render_caches(surface);
        surface.clear_trail();
        for (index, segment) in self.trail.iter().enumerate() {
            surface.render_trail_segment(index, segment);
        }
        surface.set_status_text(self.inventory.len());
        surface.center_map_on(self.player);
    }

    /// Applies one event; returns whether anything worth saving changed.
    pub fn handle(&mut self, event: GameEvent, surface: &mut impl MapSurface) -> Result<bool> {
        use GameEvent::*;

        log::debug!("event: {:?}", event);
        match event {
            PlayerMoved(point) => {
                self.move_player(point, surface);
                Ok(true)
            }
            DirectionalIntent { di, dj } => {
                if !matches!((di, dj), (1, 0) | (-1, 0) | (0, 1) | (0, -1)) {
                    return Err(GameError::InvalidDirection(di, dj));
                }
                let point = self.player.offset_tiles(di, dj, self.config.tile_degrees);
                self.move_player(point, surface);
                Ok(true)
            }
            LocationFix(point) if self.auto_locate => {
                // the first fix after enabling auto-locate opens a new polyline
                if core::mem::take(&mut self.trail_break) {
                    self.trail.push(Vec::new());
                }
                self.move_player(point, surface);
                Ok(true)
            }
            LocationFix(_) => {
                log::debug!("auto-locate is off, ignoring location fix");
                Ok(false)
            }
            LocationUnavailable(reason) => {
                surface.show_notice(&format!("Location unavailable: {}", reason));
                Ok(false)
            }
            AutoLocateToggled(enabled) => {
                if self.auto_locate == enabled {
                    return Ok(false);
                }
                self.auto_locate = enabled;
                self.trail_break = enabled;
                Ok(true)
            }
            CollectRequested(cell) => self.collect(cell, surface),
            DepositRequested(cell) => self.deposit(cell, surface),
            ResetRequested => {
                self.reset(surface);
                Ok(true)
            }
        }
    }

    fn collect(&mut self, cell: Cell, surface: &mut impl MapSurface) -> Result<bool> {
        let cache = self
            .lifecycle
            .cache_mut(cell)
            .ok_or(GameError::CacheNotVisible(cell))?;
        let outcome = trade(cache, &mut self.inventory);
        self.after_trade(cell, outcome, surface);
        Ok(outcome.has_update())
    }

    fn deposit(&mut self, cell: Cell, surface: &mut impl MapSurface) -> Result<bool> {
        let cache = self
            .lifecycle
            .cache_mut(cell)
            .ok_or(GameError::CacheNotVisible(cell))?;
        let outcome = trade(&mut self.inventory, cache);
        self.after_trade(cell, outcome, surface);
        Ok(outcome.has_update())
    }

    fn after_trade(&self, cell: Cell, outcome: TradeOutcome, surface: &mut impl MapSurface) {
        if !outcome.has_update() {
            return;
        }
        if let Some(cache) = self.lifecycle.cache(cell) {
            surface.render_cache(cache, self.board.cell_bounds(cell));
        }
        surface.set_status_text(self.inventory.len());
    }

    fn move_player(&mut self, to: GeoPoint, surface: &mut impl MapSurface) {
        let from = core::mem::replace(&mut self.player, to);
        match self.trail.last_mut() {
            Some(segment) => segment.push(to),
            None => self.trail.push(vec![from, to]),
        }

        self.refresh();
        self.render_caches(surface);
        if let Some(segment) = self.trail.last() {
            surface.render_trail_segment(self.trail.len() - 1, segment);
        }
        surface.center_map_on(to);
    }

    fn reset(&mut self, surface: &mut impl MapSurface) {
        log::info!("resetting game");
        self.lifecycle.clear();
        self.inventory = Inventory::new();
        self.player = self.config.start;
        self.auto_locate = false;
        self.trail.clear();
        self.trail_break = false;

        self.refresh();
        self.render(surface);
    }

    fn refresh(&mut self) -> RefreshOutcome {
        self.lifecycle
            .refresh(&mut self.board, &self.config, self.player)
    }

    fn render_caches(&self, surface: &mut impl MapSurface) {
        surface.remove_all_cache_overlays();
        for cache in self.lifecycle.visible() {
            surface.render_cache(cache, self.board.cell_bounds(cache.cell()));
        }
    }
}
