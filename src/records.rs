//! Best-level records
//!
//! One entry per game, persisted as a JSON object keyed by game name. The table
//! only grows: a score replaces the stored value when it is strictly higher, and
//! the only way back down is an explicit reset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::{DocumentStorage, StorageError};

/// The three games that keep a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameId {
    #[serde(rename = "Spatial Memory Game")]
    Spatial,
    #[serde(rename = "Corsi Block Test")]
    Corsi,
    #[serde(rename = "Memory Span")]
    MemorySpan,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::Spatial, GameId::Corsi, GameId::MemorySpan];

    /// Name used as the key in the persisted document
    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Spatial => "Spatial Memory Game",
            GameId::Corsi => "Corsi Block Test",
            GameId::MemorySpan => "Memory Span",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        GameId::ALL.into_iter().find(|g| g.as_str() == name)
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best level reached per game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct RecordTable {
    best: BTreeMap<GameId, u32>,
}

impl Default for RecordTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordTable {
    /// All known games at 0
    pub fn new() -> Self {
        Self {
            best: GameId::ALL.into_iter().map(|g| (g, 0)).collect(),
        }
    }

    /// Stored best for a game (0 if never set)
    pub fn get(&self, game: GameId) -> u32 {
        self.best.get(&game).copied().unwrap_or(0)
    }

    /// Replace the entry if `score` beats it. Returns true if the table changed.
    pub fn update_if_higher(&mut self, game: GameId, score: u32) -> bool {
        if score > self.get(game) {
            self.best.insert(game, score);
            true
        } else {
            false
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GameId, u32)> + '_ {
        self.best.iter().map(|(g, s)| (*g, *s))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Unknown names are skipped so the known records survive the next save.
/// Values that aren't non-negative integers fail before this point.
impl From<BTreeMap<String, u32>> for RecordTable {
    fn from(raw: BTreeMap<String, u32>) -> Self {
        let mut table = RecordTable::new();
        for (name, score) in raw {
            match GameId::from_name(&name) {
                Some(game) => {
                    table.best.insert(game, score);
                }
                None => log::warn!("Ignoring record for unknown game {:?}", name),
            }
        }
        table
    }
}

impl From<RecordTable> for BTreeMap<String, u32> {
    fn from(table: RecordTable) -> Self {
        table
            .best
            .into_iter()
            .map(|(g, s)| (g.as_str().to_string(), s))
            .collect()
    }
}

/// Record table bound to a storage backend
///
/// Keeps the current table in memory and flushes it on every accepted update and
/// on reset. Storage faults never reach the caller: reads degrade to the zeroed
/// table, writes are logged and dropped.
#[derive(Debug)]
pub struct RecordStore<S> {
    storage: S,
    table: RecordTable,
}

impl<S: DocumentStorage> RecordStore<S> {
    /// Open the store and load whatever the backend holds
    pub fn open(storage: S) -> Self {
        let table = Self::read_table(&storage);
        Self { storage, table }
    }

    /// Re-read the table from storage
    pub fn load(&mut self) -> RecordTable {
        self.table = Self::read_table(&self.storage);
        self.table.clone()
    }

    /// Persist `table` verbatim and make it the current table
    pub fn save(&mut self, table: &RecordTable) {
        self.table = table.clone();
        self.flush();
    }

    /// Raise a game's record if `score` beats it, persisting on change
    pub fn update_if_higher(&mut self, game: GameId, score: u32) -> bool {
        let changed = self.table.update_if_higher(game, score);
        if changed {
            log::info!("New record for {}: {}", game, score);
            self.flush();
        }
        changed
    }

    /// Zero every game and persist
    pub fn reset(&mut self) -> RecordTable {
        self.table = RecordTable::new();
        self.flush();
        log::info!("Records reset");
        self.table.clone()
    }

    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    pub fn best(&self, game: GameId) -> u32 {
        self.table.get(game)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read_table(storage: &S) -> RecordTable {
        match Self::try_read(storage) {
            Ok(Some(table)) => {
                log::info!("Loaded records");
                table
            }
            Ok(None) => {
                log::info!("No records found, starting fresh");
                RecordTable::new()
            }
            Err(e) => {
                log::warn!("Could not load records, starting fresh: {}", e);
                RecordTable::new()
            }
        }
    }

    fn try_read(storage: &S) -> Result<Option<RecordTable>, StorageError> {
        match storage.read()? {
            Some(json) => Ok(Some(RecordTable::from_json(&json)?)),
            None => Ok(None),
        }
    }

    fn flush(&mut self) {
        let result = self
            .table
            .to_json()
            .map_err(StorageError::from)
            .and_then(|json| self.storage.write(&json));
        if let Err(e) = result {
            log::warn!("Could not save records: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use proptest::prelude::*;

    fn table(spatial: u32, corsi: u32, span: u32) -> RecordTable {
        let mut t = RecordTable::new();
        t.update_if_higher(GameId::Spatial, spatial);
        t.update_if_higher(GameId::Corsi, corsi);
        t.update_if_higher(GameId::MemorySpan, span);
        t
    }

    #[test]
    fn test_load_missing_storage_is_zeroed() {
        let store = RecordStore::open(MemoryStorage::new());
        for game in GameId::ALL {
            assert_eq!(store.best(game), 0);
        }
    }

    #[test]
    fn test_load_garbage_is_zeroed() {
        let store = RecordStore::open(MemoryStorage::with_contents("not json {"));
        assert_eq!(store.table(), &RecordTable::new());
    }

    #[test]
    fn test_unknown_game_keeps_known_records() {
        let json = r#"{"Spatial Memory Game": 7, "Corsi Block Test": 5,
            "Memory Span": 9, "Other": 1}"#;
        let mut store = RecordStore::open(MemoryStorage::with_contents(json));
        assert_eq!(store.table(), &table(7, 5, 9));

        // A lower score doesn't touch the file, a higher one keeps the others
        assert!(!store.update_if_higher(GameId::Spatial, 1));
        assert!(store.update_if_higher(GameId::Spatial, 8));
        let reopened = RecordStore::open(store.storage().clone());
        assert_eq!(reopened.table(), &table(8, 5, 9));
        let raw = reopened.storage().contents().unwrap();
        assert!(!raw.contains("Other"));
    }

    #[test]
    fn test_load_fractional_score_is_zeroed() {
        let json = r#"{"Spatial Memory Game": 2.5, "Memory Span": 4}"#;
        let store = RecordStore::open(MemoryStorage::with_contents(json));
        assert_eq!(store.table(), &RecordTable::new());
    }

    #[test]
    fn test_load_negative_score_is_zeroed() {
        let json = r#"{"Spatial Memory Game": -1}"#;
        let store = RecordStore::open(MemoryStorage::with_contents(json));
        assert_eq!(store.best(GameId::Spatial), 0);
    }

    #[test]
    fn test_load_fills_missing_games() {
        let json = r#"{"Corsi Block Test": 6}"#;
        let store = RecordStore::open(MemoryStorage::with_contents(json));
        assert_eq!(store.best(GameId::Corsi), 6);
        assert_eq!(store.best(GameId::Spatial), 0);
        assert_eq!(store.best(GameId::MemorySpan), 0);
        assert_eq!(store.table().iter().count(), 3);
    }

    #[test]
    fn test_document_uses_game_names() {
        let json = table(1, 2, 3).to_json().unwrap();
        let raw: BTreeMap<String, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw["Spatial Memory Game"], 1);
        assert_eq!(raw["Corsi Block Test"], 2);
        assert_eq!(raw["Memory Span"], 3);
    }

    #[test]
    fn test_update_only_when_higher() {
        let mut store = RecordStore::open(MemoryStorage::new());
        assert!(store.update_if_higher(GameId::Spatial, 1));
        assert_eq!(store.storage().writes(), 1);

        assert!(!store.update_if_higher(GameId::Spatial, 1));
        assert!(!store.update_if_higher(GameId::Spatial, 0));
        assert_eq!(store.storage().writes(), 1);
        assert_eq!(store.best(GameId::Spatial), 1);

        assert!(store.update_if_higher(GameId::Spatial, 5));
        assert_eq!(store.best(GameId::Spatial), 5);
        assert_eq!(store.storage().writes(), 2);
    }

    #[test]
    fn test_update_persists() {
        let mut store = RecordStore::open(MemoryStorage::new());
        store.update_if_higher(GameId::MemorySpan, 7);

        let reopened = RecordStore::open(store.storage().clone());
        assert_eq!(reopened.best(GameId::MemorySpan), 7);
    }

    #[test]
    fn test_write_failure_is_swallowed() {
        let mut storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let mut store = RecordStore::open(storage);

        // The in-memory table still moves forward
        assert!(store.update_if_higher(GameId::Corsi, 3));
        assert_eq!(store.best(GameId::Corsi), 3);
        assert!(store.storage().contents().is_none());
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let json = table(4, 5, 6).to_json().unwrap();
        let mut store = RecordStore::open(MemoryStorage::with_contents(json));
        assert_eq!(store.best(GameId::Corsi), 5);

        let t = store.reset();
        assert_eq!(t, RecordTable::new());

        let reopened = RecordStore::open(store.storage().clone());
        for game in GameId::ALL {
            assert_eq!(reopened.best(game), 0);
        }
    }

    #[test]
    fn test_save_load_is_idempotent() {
        let json = table(2, 0, 9).to_json().unwrap();
        let mut store = RecordStore::open(MemoryStorage::with_contents(json));
        let first = store.load();
        store.save(&first);
        let second = store.load();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn prop_update_is_max(old in 0u32..1000, score in 0u32..1000) {
            let mut t = table(old, 0, 0);
            t.update_if_higher(GameId::Spatial, score);
            prop_assert_eq!(t.get(GameId::Spatial), old.max(score));
        }

        #[test]
        fn prop_save_then_load_round_trips(
            a in any::<u32>(),
            b in any::<u32>(),
            c in any::<u32>(),
        ) {
            let t = table(a, b, c);
            let mut store = RecordStore::open(MemoryStorage::new());
            store.save(&t);
            prop_assert_eq!(store.load(), t);
        }
    }
}
