//! Local key-value persistence for the theme preference and a snapshot
//! of the data set.
//!
//! Nothing here is allowed to break the page: write failures are
//! reported to the caller, read failures are logged and treated as
//! "nothing stored".

use log::{info, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use thiserror::Error;

use crate::config::{DATA_KEY, THEME_KEY};
use crate::state::Theme;
use crate::PortfolioData;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,

    #[error("failed to write key '{0}'")]
    Write(String),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`.
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn open() -> Result<Self, StorageError> {
        let storage = gloo_utils::window()
            .local_storage()
            .ok()
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| StorageError::Write(key.to_string()))
    }
}

/// In-process store, used when local storage is blocked (and in tests).
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn load_theme(store: &dyn KeyValueStore) -> Theme {
    store
        .get(THEME_KEY)
        .map(|value| Theme::from_stored(&value))
        .unwrap_or_default()
}

pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) -> Result<(), StorageError> {
    store.set(THEME_KEY, theme.as_str())
}

pub fn cache_data(store: &dyn KeyValueStore, data: &PortfolioData) -> Result<(), StorageError> {
    let json = serde_json::to_string(data)?;
    store.set(DATA_KEY, &json)
}

pub fn cached_data(store: &dyn KeyValueStore) -> Option<PortfolioData> {
    let raw = store.get(DATA_KEY)?;
    match PortfolioData::from_json(&raw) {
        Ok(data) => Some(data),
        Err(e) => {
            warn!("Failed to retrieve cached data: {}", e);
            None
        }
    }
}

/// Which link of the fallback chain produced the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Fresh,
    Snapshot,
    Default,
}

/// Resolve the data set: fresh data (snapshotted for next time), else the
/// last snapshot, else the empty default.
pub fn load_data<E: Display>(
    fresh: Result<PortfolioData, E>,
    store: &dyn KeyValueStore,
) -> (PortfolioData, DataSource) {
    match fresh {
        Ok(data) => {
            if let Err(e) = cache_data(store, &data) {
                warn!("Failed to cache data: {}", e);
            }
            (data, DataSource::Fresh)
        }
        Err(e) => {
            warn!("Failed to load fresh data ({}), using cached version", e);
            match cached_data(store) {
                Some(data) => (data, DataSource::Snapshot),
                None => {
                    info!("No cached data available, starting empty");
                    (PortfolioData::default(), DataSource::Default)
                }
            }
        }
    }
}
