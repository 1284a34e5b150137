//! Key/value persistence for settings and the last-run record
//!
//! Values are JSON strings under versioned keys. The backing store belongs to
//! the host: LocalStorage on the web, an in-memory map elsewhere.

mod last_run;

pub use last_run::LastRun;

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// String key/value store owned by the host
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store (native builds and tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - nothing will be persisted");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: String) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, &value).is_err() {
                log::warn!("Failed to write {}", key);
            }
        }
    }
}

/// Read and decode a JSON value; missing or corrupt entries yield `None`
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value, returning whether it was written
pub fn save_json<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => {
            storage.set(key, json);
            true
        }
        Err(e) => {
            log::warn!("Failed to encode {}: {}", key, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_entry_is_ignored() {
        let mut storage = MemoryStorage::default();
        storage.set("k", "{not json".to_string());
        assert_eq!(load_json::<Vec<u32>>(&storage, "k"), None);
        assert_eq!(load_json::<Vec<u32>>(&storage, "missing"), None);
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::default();
        assert!(save_json(&mut storage, "k", &vec![1u32, 2, 3]));
        assert_eq!(load_json::<Vec<u32>>(&storage, "k"), Some(vec![1, 2, 3]));
    }
}
