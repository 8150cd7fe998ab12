//! Recent-search history and the places it is persisted.

use formats::SearchParams;
use serde::{Deserialize, Serialize};

/// Browser storage key the history lives under.
pub const HISTORY_KEY: &str = "skyPathHistory";

/// Most entries kept, newest first.
pub const MAX_HISTORY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub params: SearchParams,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    StorageUnavailable,
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::StorageUnavailable => write!(f, "browser storage unavailable"),
            HistoryError::Corrupt(msg) => write!(f, "search history corrupt: {msg}"),
            HistoryError::Io(msg) => write!(f, "search history storage error: {msg}"),
        }
    }
}

impl std::error::Error for HistoryError {}

/// Ordered, bounded list of past searches.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<HistoryEntry>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from stored entries, enforcing the route dedupe and
    /// size cap on data that may have been written by something else.
    pub fn from_entries(stored: Vec<HistoryEntry>) -> Self {
        let mut entries: Vec<HistoryEntry> = Vec::with_capacity(stored.len().min(MAX_HISTORY));
        for entry in stored {
            if entries.len() == MAX_HISTORY {
                break;
            }
            if entries.iter().any(|e| e.params.same_route(&entry.params)) {
                continue;
            }
            entries.push(entry);
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Puts `params` at the front, replacing any earlier search for the same
    /// route, and drops the oldest entries past [`MAX_HISTORY`].
    pub fn record(&mut self, params: SearchParams, timestamp: u64) {
        self.entries.retain(|e| !e.params.same_route(&params));
        self.entries.insert(0, HistoryEntry { params, timestamp });
        self.entries.truncate(MAX_HISTORY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub trait HistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError>;
    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryError>;
}

/// Loads history from `store`, treating unreadable data as empty.
pub fn load_history(store: &dyn HistoryStore) -> SearchHistory {
    match store.load() {
        Ok(entries) => SearchHistory::from_entries(entries),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable search history");
            SearchHistory::new()
        }
    }
}

pub fn encode_entries(entries: &[HistoryEntry]) -> Result<String, HistoryError> {
    serde_json::to_string(entries).map_err(|e| HistoryError::Io(e.to_string()))
}

pub fn decode_entries(raw: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).map_err(|e| HistoryError::Corrupt(e.to_string()))
}

#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    raw: Option<String>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an already-serialized payload.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        match &self.raw {
            Some(raw) => decode_entries(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        self.raw = Some(encode_entries(entries)?);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{HistoryEntry, HistoryError, HistoryStore, decode_entries, encode_entries};

    /// History kept as one JSON array under a single `localStorage` key.
    #[derive(Debug)]
    pub struct LocalStorageHistoryStore {
        key: String,
    }

    impl LocalStorageHistoryStore {
        pub fn new(key: impl Into<String>) -> Result<Self, HistoryError> {
            // Fail early when storage is disabled.
            window_local_storage()?;
            Ok(Self { key: key.into() })
        }
    }

    impl HistoryStore for LocalStorageHistoryStore {
        fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(&self.key)
                .map_err(|e| HistoryError::Io(format!("get_item failed: {:?}", e)))?;
            match raw {
                Some(raw) => decode_entries(&raw),
                None => Ok(Vec::new()),
            }
        }

        fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
            let storage = window_local_storage()?;
            let raw = encode_entries(entries)?;
            storage
                .set_item(&self.key, &raw)
                .map_err(|e| HistoryError::Io(format!("set_item failed: {:?}", e)))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, HistoryError> {
        let win = web_sys::window().ok_or(HistoryError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| HistoryError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(HistoryError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageHistoryStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageHistoryStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageHistoryStore {
    pub fn new(_key: impl Into<String>) -> Result<Self, HistoryError> {
        Err(HistoryError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HistoryStore for LocalStorageHistoryStore {
    fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        Err(HistoryError::StorageUnavailable)
    }

    fn save(&mut self, _entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        Err(HistoryError::StorageUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::{CabinClass, Currency};
    use pretty_assertions::assert_eq;

    fn params(origin: &str, destination: &str) -> SearchParams {
        SearchParams {
            origin: origin.to_string(),
            destination: destination.to_string(),
            ..SearchParams::default()
        }
    }

    fn routes(h: &SearchHistory) -> Vec<(String, String)> {
        h.entries()
            .iter()
            .map(|e| (e.params.origin.clone(), e.params.destination.clone()))
            .collect()
    }

    #[test]
    fn newest_first_and_capped() {
        let mut h = SearchHistory::new();
        for (i, dest) in ["A", "B", "C", "D", "E", "F"].into_iter().enumerate() {
            h.record(params("X", dest), i as u64);
        }
        assert_eq!(h.len(), MAX_HISTORY);
        assert_eq!(h.get(0).unwrap().params.destination, "F");
        assert_eq!(h.get(4).unwrap().params.destination, "B");
    }

    #[test]
    fn repeated_route_moves_to_front() {
        let mut h = SearchHistory::new();
        h.record(params("Paris", "Tokyo"), 1);
        h.record(params("Lima", "Quito"), 2);
        let mut again = params("Paris", "Tokyo");
        again.passengers = 2;
        h.record(again, 3);
        assert_eq!(
            routes(&h),
            vec![
                ("Paris".to_string(), "Tokyo".to_string()),
                ("Lima".to_string(), "Quito".to_string()),
            ]
        );
        assert_eq!(h.get(0).unwrap().params.passengers, 2);
        assert_eq!(h.get(0).unwrap().timestamp, 3);
    }

    #[test]
    fn entries_serialize_flat_camel_case() {
        let entry = HistoryEntry {
            params: SearchParams {
                cabin_class: CabinClass::First,
                currency: Currency::Eur,
                ..params("Paris", "Tokyo")
            },
            timestamp: 1_700_000_000_000,
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["origin"], "Paris");
        assert_eq!(v["cabinClass"], "First");
        assert_eq!(v["timestamp"], 1_700_000_000_000u64);
        assert!(v.get("params").is_none());
    }

    #[test]
    fn in_memory_store_round_trips() {
        let mut store = InMemoryHistoryStore::new();
        assert!(load_history(&store).is_empty());

        let mut h = SearchHistory::new();
        h.record(params("Oslo", "Rome"), 10);
        store.save(h.entries()).unwrap();
        assert_eq!(load_history(&store), h);
    }

    #[test]
    fn corrupt_storage_is_treated_as_empty() {
        let store = InMemoryHistoryStore::with_raw("{not an array");
        assert!(matches!(store.load(), Err(HistoryError::Corrupt(_))));
        assert!(load_history(&store).is_empty());
    }

    #[test]
    fn stored_duplicates_are_collapsed() {
        let raw = r#"[
            {"origin":"A","destination":"B","timestamp":3},
            {"origin":"A","destination":"B","timestamp":2},
            {"origin":"C","destination":"D","timestamp":1}
        ]"#;
        let h = load_history(&InMemoryHistoryStore::with_raw(raw));
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(0).unwrap().timestamp, 3);
        assert_eq!(h.get(1).unwrap().params.passengers, 1);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn local_storage_unavailable_natively() {
        assert_eq!(
            LocalStorageHistoryStore::new(HISTORY_KEY).unwrap_err(),
            HistoryError::StorageUnavailable
        );
    }
}
