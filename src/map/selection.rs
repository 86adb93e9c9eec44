// src/map/selection.rs

use crate::domain::Listing;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

pub const FAVORITES_KEY: &str = "favorites";
pub const COMPARE_KEY: &str = "compareList";
pub const COMPARE_CAPACITY: usize = 4;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// String key/value persistence that outlives one session.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read-modify-write of one key. `edit` receives the stored value and
    /// returns the value to write, or `None` to leave it untouched. Backends
    /// shared between sessions must run this as one atomic step.
    fn update(
        &mut self,
        key: &str,
        edit: &mut dyn FnMut(Option<String>) -> Option<String>,
    ) -> Result<(), StorageError> {
        let current = self.get(key)?;
        if let Some(next) = edit(current) {
            self.set(key, &next)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Favorites and the compare list, kept in insertion order.
pub struct Selections<S: Storage> {
    storage: S,
    favorites: Vec<String>,
    compare: Vec<String>,
}

impl<S: Storage> Selections<S> {
    /// Restore both lists. Anything unreadable is logged and treated as empty.
    pub fn load(storage: S) -> Self {
        let favorites = read_ids(&storage, FAVORITES_KEY);
        let mut compare = read_ids(&storage, COMPARE_KEY);
        compare.truncate(COMPARE_CAPACITY);

        debug!(favorites = favorites.len(), compare = compare.len(), "selections restored");

        Self {
            storage,
            favorites,
            compare,
        }
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn compare(&self) -> &[String] {
        &self.compare
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    pub fn is_compared(&self, id: &str) -> bool {
        self.compare.iter().any(|c| c == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read-only view handed to markup builders at render time.
    pub fn snapshot(&self) -> SelectionSnapshot<'_> {
        SelectionSnapshot::new(&self.favorites, &self.compare)
    }

    /// Add if absent, remove if present.
    pub fn toggle_favorite(&mut self, id: &str) {
        let in_memory = self.favorites.clone();
        self.favorites = self.edit(FAVORITES_KEY, in_memory, |ids| {
            if let Some(pos) = ids.iter().position(|f| f == id) {
                ids.remove(pos);
            } else {
                ids.push(id.to_string());
            }
            true
        });
    }

    /// Add if absent and there's room, remove if present. A full list ignores adds.
    pub fn toggle_compare(&mut self, id: &str) {
        let in_memory = self.compare.clone();
        self.compare = self.edit(COMPARE_KEY, in_memory, |ids| {
            ids.truncate(COMPARE_CAPACITY);
            if let Some(pos) = ids.iter().position(|c| c == id) {
                ids.remove(pos);
                true
            } else if ids.len() < COMPARE_CAPACITY {
                ids.push(id.to_string());
                true
            } else {
                debug!(id, "compare list full, ignoring");
                false
            }
        });
    }

    /// Apply `change` to the list as currently stored, so toggles made by
    /// other sessions since `load` survive. `change` returns whether there is
    /// anything to write. When storage is unreachable the change is applied
    /// to `in_memory` instead.
    fn edit(
        &mut self,
        key: &str,
        in_memory: Vec<String>,
        mut change: impl FnMut(&mut Vec<String>) -> bool,
    ) -> Vec<String> {
        let mut updated = None;
        let result = self.storage.update(key, &mut |raw| {
            let mut ids = raw.map(|raw| decode_ids(key, &raw)).unwrap_or_default();
            let encoded = if change(&mut ids) {
                encode_ids(key, &ids)
            } else {
                None
            };
            updated = Some(ids);
            encoded
        });
        if let Err(e) = result {
            warn!(key, error = %e, "could not persist selection");
        }

        updated.unwrap_or_else(|| {
            let mut ids = in_memory;
            change(&mut ids);
            ids
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectionSnapshot<'a> {
    favorites: &'a [String],
    compare: &'a [String],
}

impl<'a> SelectionSnapshot<'a> {
    pub fn new(favorites: &'a [String], compare: &'a [String]) -> Self {
        Self { favorites, compare }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|f| f == id)
    }

    pub fn is_compared(&self, id: &str) -> bool {
        self.compare.iter().any(|c| c == id)
    }
}

fn read_ids<S: Storage>(storage: &S, key: &str) -> Vec<String> {
    match storage.get(key) {
        Ok(Some(raw)) => decode_ids(key, &raw),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "could not read selection");
            Vec::new()
        }
    }
}

/// A stored JSON array as distinct string ids. Non-string entries are
/// coerced to their JSON text (`12`, `true`, `null`).
fn decode_ids(key: &str, raw: &str) -> Vec<String> {
    let values: Vec<Value> = match serde_json::from_str(raw) {
        Ok(values) => values,
        Err(e) => {
            warn!(key, error = %e, "corrupt selection in storage, starting empty");
            return Vec::new();
        }
    };

    let mut ids: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let id = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn encode_ids(key: &str, ids: &[String]) -> Option<String> {
    match serde_json::to_string(ids) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            warn!(key, error = %e, "could not encode selection");
            None
        }
    }
}

/// Resolve stored ids against the current listing array. Ids with no listing
/// are skipped here but stay in storage.
pub fn resolve<'a>(ids: &[String], listings: &'a [Listing]) -> Vec<&'a Listing> {
    ids.iter()
        .filter_map(|id| listings.iter().find(|l| &l.id == id))
        .collect()
}
