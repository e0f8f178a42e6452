use alloc::collections::VecDeque;
use serde::{Deserialize, Serialize};

use crate::*;

/// Coins carried by the player.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    coins: VecDeque<Coin>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FromIterator<Coin> for Inventory {
    fn from_iter<T: IntoIterator<Item = Coin>>(iter: T) -> Self {
        Self {
            coins: iter.into_iter().collect(),
        }
    }
}

impl Stock for Inventory {
    fn coins(&self) -> &VecDeque<Coin> {
        &self.coins
    }

    fn withdraw_one(&mut self) -> Result<Coin> {
        self.coins.pop_front().ok_or(GameError::EmptyStock)
    }

    fn deposit_one(&mut self, coin: Coin) {
        self.coins.push_back(coin);
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TradeOutcome {
    NoChange,
    Moved(Coin),
}

impl TradeOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Moved(_) => true,
        }
    }
}

/// Moves the front coin of `source` to the back of `destination`, doing nothing when `source` is empty.
pub fn trade<S, D>(source: &mut S, destination: &mut D) -> TradeOutcome
where
    S: Stock + ?Sized,
    D: Stock + ?Sized,
{
    match source.withdraw_one() {
        Ok(coin) => {
            log::trace!("trade: moved {}", coin);
            destination.deposit_one(coin);
            TradeOutcome::Moved(coin)
        }
        Err(_) => TradeOutcome::NoChange,
    }
}
