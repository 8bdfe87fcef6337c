//! Saving and restoring board state through a string key-value store.
//!
//! Records are JSON. Loading decodes each field on its own and falls back
//! to the compiled-in default for anything missing or malformed, so older
//! and newer records both load. The flat record layout (`eventName`,
//! `subtitle`, `sponsorUrlsText`, `allRuns`, `showLogo` at the top level) is
//! understood as well.

use crate::{defaults, BoardVariant, Entry, EventConfig, Leaderboard};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use web_sys::Storage;

#[derive(Debug)]
pub enum StorageError {
    /// No storage at all, e.g. site data blocked by the browser.
    Unavailable,
    Serialize(String),
    WriteRejected(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "Local storage is unavailable"),
            StorageError::Serialize(msg) => write!(f, "Failed to serialize board state: {}", msg),
            StorageError::WriteRejected(msg) => write!(f, "Storage rejected the write: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Durable string storage keyed by name.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Browser local storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStore;

// Accessing `window.localStorage` throws when site data is blocked.
fn local_storage() -> Option<Storage> {
    match gloo_utils::window().local_storage() {
        Ok(storage) => storage,
        Err(e) => {
            debug!("Local storage unavailable: {:?}", e);
            None
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()
            .ok_or(StorageError::Unavailable)?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }
}

/// In-memory store, optionally refusing writes like a full quota or
/// behaving like a browser with storage blocked.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    pub reject_writes: bool,
    pub unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_record(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        if self.unavailable {
            return None;
        }
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        if self.reject_writes {
            return Err(StorageError::WriteRejected("quota exceeded".to_string()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Everything written under a variant's storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub event_config: EventConfig,
    /// Retained runs: full history or top-N depending on the variant.
    pub leaderboard: Vec<Entry>,
    pub total_drivers_count: u64,
}

impl Default for PersistedState {
    fn default() -> Self {
        merge_with_defaults(PartialState::default())
    }
}

impl PersistedState {
    pub fn capture(config: &EventConfig, board: &Leaderboard) -> Self {
        Self {
            version: defaults::STATE_VERSION,
            event_config: config.clone(),
            leaderboard: board.runs().to_vec(),
            total_drivers_count: board.total_drivers(),
        }
    }

    pub fn into_parts(self, variant: BoardVariant) -> (EventConfig, Leaderboard) {
        let board = Leaderboard::from_parts(variant, self.leaderboard, self.total_drivers_count);
        (self.event_config, board)
    }
}

/// A stored record with every field optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialState {
    pub version: Option<u32>,
    pub event_name: Option<String>,
    pub subtitle: Option<String>,
    pub sponsor_urls_text: Option<String>,
    pub show_logo: Option<bool>,
    pub leaderboard: Option<Vec<Entry>>,
    pub total_drivers_count: Option<u64>,
}

fn field<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    value.and_then(|v| T::deserialize(v).ok())
}

// Keeps the well-formed entries of a run list and skips the rest.
fn entries(value: Option<&Value>) -> Option<Vec<Entry>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| Entry::deserialize(item).ok())
            .collect(),
    )
}

impl PartialState {
    /// Decode a stored record. `None` when it is not a JSON object at all.
    pub fn from_json(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let root = value.as_object()?;
        Some(Self::from_object(root))
    }

    fn from_object(root: &Map<String, Value>) -> Self {
        let nested = root.get("eventConfig").and_then(Value::as_object);
        let config_field =
            |key: &str| nested.and_then(|c| c.get(key)).or_else(|| root.get(key));

        let version = field(root.get("version"));
        if let Some(v) = version {
            if v > defaults::STATE_VERSION {
                debug!("Stored record has newer version {}, loading known fields", v);
            }
        }

        Self {
            version,
            event_name: field(config_field("eventName")),
            subtitle: field(config_field("subtitle")),
            sponsor_urls_text: field(config_field("sponsorUrlsText")),
            show_logo: field(config_field("showLogo")),
            leaderboard: entries(root.get("leaderboard")).or_else(|| entries(root.get("allRuns"))),
            total_drivers_count: field(root.get("totalDriversCount")),
        }
    }
}

/// Fill every missing field of a stored record with its default.
///
/// A record without a driver count is from before the count was stored;
/// every retained run was an accepted submission then, so the run count
/// stands in.
pub fn merge_with_defaults(partial: PartialState) -> PersistedState {
    let fallback = EventConfig::default();
    let leaderboard = partial.leaderboard.unwrap_or_default();
    let total_drivers_count = partial
        .total_drivers_count
        .unwrap_or(leaderboard.len() as u64);

    PersistedState {
        version: defaults::STATE_VERSION,
        event_config: EventConfig {
            event_name: partial.event_name.unwrap_or(fallback.event_name),
            subtitle: partial.subtitle.unwrap_or(fallback.subtitle),
            sponsor_urls_text: partial
                .sponsor_urls_text
                .unwrap_or(fallback.sponsor_urls_text),
            show_logo: partial.show_logo.unwrap_or(fallback.show_logo),
        },
        leaderboard,
        total_drivers_count,
    }
}

/// Read the variant's record once at startup. Never fails: anything
/// unreadable yields the defaults.
pub fn load_state(store: &impl KeyValueStore, variant: BoardVariant) -> (EventConfig, Leaderboard) {
    let state = match store.get(variant.storage_key) {
        Some(raw) => match PartialState::from_json(&raw) {
            Some(partial) => merge_with_defaults(partial),
            None => {
                debug!("Discarding unreadable record under '{}'", variant.storage_key);
                PersistedState::default()
            }
        },
        None => PersistedState::default(),
    };
    state.into_parts(variant)
}

pub fn try_save_state(
    store: &impl KeyValueStore,
    variant: BoardVariant,
    config: &EventConfig,
    board: &Leaderboard,
) -> Result<(), StorageError> {
    let state = PersistedState::capture(config, board);
    let json = serde_json::to_string(&state).map_err(|e| StorageError::Serialize(e.to_string()))?;
    store.set(variant.storage_key, &json)
}

/// Write the current state, logging and discarding any failure.
pub fn save_state(
    store: &impl KeyValueStore,
    variant: BoardVariant,
    config: &EventConfig,
    board: &Leaderboard,
) {
    if let Err(e) = try_save_state(store, variant, config, board) {
        warn!("Board state not saved: {}", e);
    }
}
