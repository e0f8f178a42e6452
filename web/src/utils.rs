use gloo::storage::{LocalStorage, Storage};
use serde::{Serialize, de::DeserializeOwned};

/// Values that live in local storage under a fixed key.
pub(crate) trait StorageKey: Serialize + DeserializeOwned {
    const KEY: &'static str;

    fn local_load() -> Option<Self> {
        match LocalStorage::get(Self::KEY) {
            Ok(value) => Some(value),
            Err(gloo::storage::errors::StorageError::KeyNotFound(_)) => None,
            Err(err) => {
                log::error!("Could not load {} from local storage: {:?}", Self::KEY, err);
                None
            }
        }
    }

    fn local_save(&self) {
        if let Err(err) = LocalStorage::set(Self::KEY, self) {
            log::error!("Could not save {} to local storage: {:?}", Self::KEY, err);
        }
    }
}

/// Text for the inventory panel.
pub(crate) fn format_coin_count(count: usize) -> String {
    match count {
        0 => "No coins yet...".to_string(),
        1 => "1 coin accumulated".to_string(),
        _ => format!("{} coins accumulated", count),
    }
}
