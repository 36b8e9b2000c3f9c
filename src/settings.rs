//! Game settings
//!
//! Timing and Corsi layout parameters. Every field is optional in the document;
//! anything missing keeps its default. Persisted next to the records file on
//! native, LocalStorage on the web.

use serde::{Deserialize, Serialize};

use crate::engine::Timing;
use crate::layout::BlockLayoutParams;
use crate::platform::{DocumentStorage, StorageError};

/// Tunable parameters shared by every session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Countdown, reveal and pause durations
    pub timing: Timing,
    /// Corsi block placement
    pub blocks: BlockLayoutParams,
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "memory_games_settings";

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read settings from a storage backend, falling back to defaults
    pub fn load_from(storage: &impl DocumentStorage) -> Self {
        match storage.read() {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read settings: {}", e);
                Self::default()
            }
        }
    }

    /// Write settings to a storage backend (failures are logged)
    pub fn save_to(&self, storage: &mut impl DocumentStorage) {
        let result = serde_json::to_string_pretty(self)
            .map_err(StorageError::from)
            .and_then(|json| storage.write(&json));
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Could not save settings: {}", e),
        }
    }

    /// Load from the per-user settings file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match crate::platform::settings_path() {
            Some(path) => Self::load_from(&crate::platform::FileStorage::new(path)),
            None => Self::default(),
        }
    }

    /// Load from LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::load_from(&crate::platform::LocalStorage::new(Self::STORAGE_KEY))
    }
}
