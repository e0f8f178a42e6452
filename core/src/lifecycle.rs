use alloc::collections::BTreeMap;

use crate::*;

/// What a single [`CacheLifecycle::refresh`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub evicted: usize,
    pub restored: usize,
    pub generated: usize,
    pub discarded_mementos: usize,
}

impl RefreshOutcome {
    pub const fn visible(&self) -> usize {
        self.restored + self.generated
    }
}

/// Keeps the caches around the player in memory and everything else as mementos.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheLifecycle {
    visible: BTreeMap<Cell, Geocache>,
    mementos: BTreeMap<Cell, Memento>,
}

impl CacheLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mementos(mementos: BTreeMap<Cell, Memento>) -> Self {
        Self {
            visible: BTreeMap::new(),
            mementos,
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Geocache> {
        self.visible.values()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn cache(&self, cell: Cell) -> Option<&Geocache> {
        self.visible.get(&cell)
    }

    pub fn cache_mut(&mut self, cell: Cell) -> Option<&mut Geocache> {
        self.visible.get_mut(&cell)
    }

    pub fn mementos(&self) -> &BTreeMap<Cell, Memento> {
        &self.mementos
    }

    /// Evicts every visible cache, then materializes the cache-bearing cells around `point`.
    pub fn refresh(
        &mut self,
        board: &mut Board,
        config: &GameConfig,
        point: GeoPoint,
    ) -> RefreshOutcome {
        let mut outcome = RefreshOutcome {
            evicted: self.visible.len(),
            ..Default::default()
        };

        for (cell, cache) in core::mem::take(&mut self.visible) {
            self.mementos.insert(cell, cache.to_memento());
        }

        for cell in board.cells_near_point(point) {
            let mut cache = Geocache::new(cell);

            let restored = match self.mementos.get(&cell) {
                Some(memento) => match cache.restore_memento(memento) {
                    Ok(()) => true,
                    Err(err) => {
                        log::warn!("Discarding memento for {}: {}", cell, err);
                        self.mementos.remove(&cell);
                        outcome.discarded_mementos += 1;
                        false
                    }
                },
                None => false,
            };

            if restored {
                outcome.restored += 1;
            } else if Geocache::is_present(cell, config) {
                cache.materialize_fresh(config);
                outcome.generated += 1;
            } else {
                continue;
            }

            self.visible.insert(cell, cache);
        }

        log::debug!(
            "refresh at ({}, {}): {:?}",
            point.lat,
            point.lng,
            outcome
        );
        outcome
    }

    /// Mementos for every cache touched so far, including the visible ones.
    pub fn snapshot(&self) -> BTreeMap<Cell, Memento> {
        let mut mementos = self.mementos.clone();
        for (&cell, cache) in &self.visible {
            mementos.insert(cell, cache.to_memento());
        }
        mementos
    }

    pub fn clear(&mut self) {
        self.visible.clear();
        self.mementos.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeSet;
    use alloc::vec::Vec;

    fn setup() -> (GameConfig, Board, CacheLifecycle) {
        let config = GameConfig::default();
        let board = Board::from_config(&config);
        (config, board, CacheLifecycle::new())
    }

    fn visible_cells(lifecycle: &CacheLifecycle) -> BTreeSet<Cell> {
        lifecycle.visible().map(Geocache::cell).collect()
    }

    fn all_coins(lifecycle: &CacheLifecycle) -> BTreeSet<Coin> {
        let mut coins: BTreeSet<Coin> = lifecycle
            .visible()
            .flat_map(|cache| cache.coins().iter().copied())
            .collect();
        for (&cell, memento) in lifecycle.mementos() {
            if lifecycle.cache(cell).is_none() {
                coins.extend(memento.decode(cell).unwrap());
            }
        }
        coins
    }

    #[test]
    fn visible_set_matches_cache_bearing_neighborhood() {
        let (config, mut board, mut lifecycle) = setup();
        let point = config.start;

        let outcome = lifecycle.refresh(&mut board, &config, point);

        let expected: BTreeSet<Cell> = board
            .cells_near_point(point)
            .into_iter()
            .filter(|&cell| Geocache::is_present(cell, &config))
            .collect();
        assert!(!expected.is_empty());
        assert_eq!(visible_cells(&lifecycle), expected);
        assert_eq!(outcome.generated, expected.len());
        assert_eq!(outcome.restored, 0);
    }

    #[test]
    fn second_refresh_restores_instead_of_generating() {
        let (config, mut board, mut lifecycle) = setup();
        let point = config.start;

        let first = lifecycle.refresh(&mut board, &config, point);
        let second = lifecycle.refresh(&mut board, &config, point);

        assert_eq!(second.evicted, first.visible());
        assert_eq!(second.restored, first.generated);
        assert_eq!(second.generated, 0);
        assert_eq!(lifecycle.mementos().len(), first.generated);
    }

    #[test]
    fn traded_stock_survives_eviction_and_restoration() {
        let (config, mut board, mut lifecycle) = setup();
        let start = config.start;
        lifecycle.refresh(&mut board, &config, start);

        let cell = lifecycle
            .visible()
            .find(|cache| !cache.is_empty())
            .map(Geocache::cell)
            .unwrap();
        let mut inventory = Inventory::new();
        let cache = lifecycle.cache_mut(cell).unwrap();
        trade(cache, &mut inventory);
        let after_trade: Vec<Coin> = cache.coins().iter().copied().collect();

        let far_away = start.offset_tiles(100, 100, config.tile_degrees);
        lifecycle.refresh(&mut board, &config, far_away);
        assert!(lifecycle.cache(cell).is_none());
        assert!(lifecycle.mementos().contains_key(&cell));

        lifecycle.refresh(&mut board, &config, start);
        let restored: Vec<Coin> = lifecycle.cache(cell).unwrap().coins().iter().copied().collect();
        assert_eq!(restored, after_trade);
    }

    #[test]
    fn refresh_round_trips_conserve_coins() {
        let (config, mut board, mut lifecycle) = setup();
        let start = config.start;
        lifecycle.refresh(&mut board, &config, start);
        let before = all_coins(&lifecycle);

        for step in [3, 9, 20, -5, 0] {
            let point = start.offset_tiles(step, -step, config.tile_degrees);
            lifecycle.refresh(&mut board, &config, point);
        }
        lifecycle.refresh(&mut board, &config, start);

        let after = all_coins(&lifecycle);
        assert!(after.is_superset(&before));
        assert_eq!(
            visible_cells(&lifecycle),
            board
                .cells_near_point(start)
                .into_iter()
                .filter(|&cell| Geocache::is_present(cell, &config))
                .collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn malformed_memento_is_regenerated_fresh() {
        let (config, mut board, _) = setup();
        let start = config.start;
        let cell = board
            .cells_near_point(start)
            .into_iter()
            .find(|&cell| Geocache::is_present(cell, &config))
            .unwrap();
        let mut mementos = BTreeMap::new();
        mementos.insert(cell, Memento::from("not,a memento"));
        let mut lifecycle = CacheLifecycle::with_mementos(mementos);

        let outcome = lifecycle.refresh(&mut board, &config, start);

        let mut fresh = Geocache::new(cell);
        fresh.materialize_fresh(&config);
        assert_eq!(outcome.discarded_mementos, 1);
        assert_eq!(lifecycle.cache(cell), Some(&fresh));
    }

    #[test]
    fn snapshot_includes_visible_caches() {
        let (config, mut board, mut lifecycle) = setup();
        let outcome = lifecycle.refresh(&mut board, &config, config.start);

        let snapshot = lifecycle.snapshot();

        assert!(lifecycle.mementos().is_empty());
        assert_eq!(snapshot.len(), outcome.visible());
        assert_eq!(lifecycle.visible_count(), outcome.visible());
        for cache in lifecycle.visible() {
            assert_eq!(snapshot.get(&cache.cell()), Some(&cache.to_memento()));
        }
    }
}
