use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::String;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// A uniquely identifiable coin, named after the cell it was minted in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coin {
    pub i: i32,
    pub j: i32,
    pub serial: u32,
}

impl Coin {
    pub const fn new(origin: Cell, serial: u32) -> Self {
        Self {
            i: origin.i,
            j: origin.j,
            serial,
        }
    }

    pub const fn origin(&self) -> Cell {
        Cell::new(self.i, self.j)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.i, self.j, self.serial)
    }
}

/// An ordered pile of coins that can only change one coin at a time.
pub trait Stock {
    fn coins(&self) -> &VecDeque<Coin>;

    /// Removes the front coin.
    fn withdraw_one(&mut self) -> Result<Coin>;

    /// Appends a coin at the back.
    fn deposit_one(&mut self, coin: Coin);

    fn len(&self) -> usize {
        self.coins().len()
    }

    fn is_empty(&self) -> bool {
        self.coins().is_empty()
    }
}

/// Serialized stock of an evicted cache.
///
/// Entries are comma separated. A coin minted in the owning cell is stored as its bare serial (`4`), any other coin as
/// `serial@i;j` (`2@-3;5`). An empty stock is the empty string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memento(String);

impl Memento {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the coins without needing a live cache.
    pub fn decode(&self, cell: Cell) -> Result<VecDeque<Coin>> {
        let mut coins = VecDeque::new();
        if self.0.is_empty() {
            return Ok(coins);
        }

        for (index, entry) in self.0.split(',').enumerate() {
            let malformed = || GameError::MalformedMemento(format!("{cell}: bad entry #{index} {entry:?}"));
            let coin = match entry.split_once('@') {
                None => Coin::new(cell, entry.parse().map_err(|_| malformed())?),
                Some((serial, origin)) => {
                    let serial = serial.parse().map_err(|_| malformed())?;
                    let (i, j) = origin.split_once(';').ok_or_else(malformed)?;
                    let i = i.parse().map_err(|_| malformed())?;
                    let j = j.parse().map_err(|_| malformed())?;
                    Coin::new(Cell::new(i, j), serial)
                }
            };
            coins.push_back(coin);
        }

        Ok(coins)
    }
}

impl From<String> for Memento {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Memento {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

/// The coins stashed in one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Geocache {
    cell: Cell,
    stock: VecDeque<Coin>,
}

impl Geocache {
    pub fn new(cell: Cell) -> Self {
        Self {
            cell,
            stock: VecDeque::new(),
        }
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// Whether the cell hosts a cache at all.
    pub fn is_present(cell: Cell, config: &GameConfig) -> bool {
        cell_luck(cell, None) < config.cache_spawn_probability
    }

    /// Number of coins a never-visited cache starts with.
    pub fn initial_stock_size(cell: Cell, config: &GameConfig) -> u32 {
        (cell_luck(cell, Some(INITIAL_VALUE)) * f64::from(config.initial_stock_bound)) as u32
    }

    /// Mints the initial coins for a never-visited cache.
    pub fn materialize_fresh(&mut self, config: &GameConfig) {
        let count = Self::initial_stock_size(self.cell, config);
        self.stock = (0..count).map(|serial| Coin::new(self.cell, serial)).collect();
    }

    pub fn to_memento(&self) -> Memento {
        let mut encoded = String::new();
        for (index, coin) in self.stock.iter().enumerate() {
            if index > 0 {
                encoded.push(',');
            }
            let entry = if coin.origin() == self.cell {
                format!("{}", coin.serial)
            } else {
                format!("{}@{};{}", coin.serial, coin.i, coin.j)
            };
            encoded.push_str(&entry);
        }
        Memento(encoded)
    }

    /// Replaces the stock with the coins in `memento`; on error the stock is left as it was.
    pub fn restore_memento(&mut self, memento: &Memento) -> Result<()> {
        self.stock = memento.decode(self.cell)?;
        Ok(())
    }

    pub fn from_memento(cell: Cell, memento: &Memento) -> Result<Self> {
        let mut cache = Self::new(cell);
        cache.restore_memento(memento)?;
        Ok(cache)
    }
}

impl Stock for Geocache {
    fn coins(&self) -> &VecDeque<Coin> {
        &self.stock
    }

    fn withdraw_one(&mut self) -> Result<Coin> {
        self.stock.pop_front().ok_or(GameError::EmptyStock)
    }

    fn deposit_one(&mut self, coin: Coin) {
        self.stock.push_back(coin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn serials(cache: &Geocache) -> Vec<u32> {
        cache.coins().iter().map(|coin| coin.serial).collect()
    }

    #[test]
    fn materialize_fresh_mints_sequential_serials() {
        let config = GameConfig::default();
        let cell = Cell::new(0, 0);
        let mut cache = Geocache::new(cell);

        cache.materialize_fresh(&config);

        let expected = (luck("0,0,initialValue") * 10.0) as u32;
        assert_eq!(cache.len(), expected as usize);
        assert_eq!(serials(&cache), (0..expected).collect::<Vec<_>>());
        assert!(cache.coins().iter().all(|coin| coin.origin() == cell));
    }

    #[test]
    fn new_cache_is_empty_until_materialized() {
        let cache = Geocache::new(Cell::new(4, 4));

        assert!(cache.is_empty());
        assert_eq!(cache.to_memento().as_str(), "");
    }

    #[test]
    fn memento_round_trip_keeps_order_and_foreign_coins() {
        let cell = Cell::new(2, -7);
        let mut cache = Geocache::new(cell);
        cache.deposit_one(Coin::new(cell, 3));
        cache.deposit_one(Coin::new(Cell::new(-3, 5), 2));
        cache.deposit_one(Coin::new(cell, 0));

        let memento = cache.to_memento();
        let restored = Geocache::from_memento(cell, &memento).unwrap();

        assert_eq!(memento.as_str(), "3,2@-3;5,0");
        assert_eq!(restored, cache);
    }

    #[test]
    fn memento_round_trip_after_withdrawals() {
        let config = GameConfig::new(1e-4, 8, 1.0, 10, GeoPoint::new(0.0, 0.0));
        let cell = (0..)
            .map(|i| Cell::new(i, 1))
            .find(|&cell| Geocache::initial_stock_size(cell, &config) >= 2)
            .unwrap();
        let mut cache = Geocache::new(cell);
        cache.materialize_fresh(&config);

        let first = cache.withdraw_one().unwrap();
        let mut restored = Geocache::new(cell);
        restored.restore_memento(&cache.to_memento()).unwrap();

        assert_eq!(first.serial, 0);
        assert_eq!(restored.coins(), cache.coins());
        assert_eq!(restored.coins().front().map(|coin| coin.serial), Some(1));
    }

    #[test]
    fn malformed_memento_leaves_stock_untouched() {
        let cell = Cell::new(0, 0);
        let mut cache = Geocache::new(cell);
        cache.deposit_one(Coin::new(cell, 9));

        for bad in ["x", "1,,2", "1@2", "1@a;b", "-1", "[0,1]"] {
            let result = cache.restore_memento(&Memento::from(bad));
            assert!(matches!(result, Err(GameError::MalformedMemento(_))), "{bad}");
        }
        assert_eq!(serials(&cache), [9]);
    }

    #[test]
    fn withdraw_from_empty_stock_fails() {
        let mut cache = Geocache::new(Cell::new(1, 1));

        assert_eq!(cache.withdraw_one(), Err(GameError::EmptyStock));
    }

    #[test]
    fn withdraw_takes_front_and_deposit_appends() {
        let cell = Cell::new(1, 1);
        let mut cache = Geocache::new(cell);
        cache.deposit_one(Coin::new(cell, 5));
        cache.deposit_one(Coin::new(cell, 6));

        assert_eq!(cache.withdraw_one().unwrap().serial, 5);
        cache.deposit_one(Coin::new(cell, 5));
        assert_eq!(serials(&cache), [6, 5]);
    }
}
