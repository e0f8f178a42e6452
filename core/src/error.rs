use alloc::string::String;
use thiserror::Error;

use crate::Cell;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Stock is empty")]
    EmptyStock,
    #[error("Malformed memento: {0}")]
    MalformedMemento(String),
    #[error("No visible cache at {0}")]
    CacheNotVisible(Cell),
    #[error("Not a cardinal direction: ({0}, {1})")]
    InvalidDirection(i32, i32),
}

pub type Result<T> = core::result::Result<T, GameError>;
