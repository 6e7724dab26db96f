//! Persisted preferences (string key → string value).
//!
//! The core only needs a handful of keys: the server port and the macro
//! icon pool. Values are stored as strings; structured values go through
//! [`get_json`] / [`set_json`].

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Server port
pub const KEY_PORT: &str = "remote.port";
/// Pool of unassigned generic macro icons (JSON array of ints)
pub const KEY_ICONS_AVAILABLE: &str = "remote.icons.macros.available";
/// Macro stem → icon reference (JSON object)
pub const KEY_ICONS_ASSIGNED: &str = "remote.icons.macros.assigned";

/// Preference store supplied by the host.
pub trait Preferences: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// Read a JSON-encoded preference. Malformed values read as `None`.
pub fn get_json<T: DeserializeOwned>(prefs: &dyn Preferences, key: &str) -> Option<T> {
    let raw = prefs.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring malformed preference {}: {}", key, e);
            None
        }
    }
}

/// Write a JSON-encoded preference.
pub fn set_json<T: Serialize>(prefs: &dyn Preferences, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => prefs.set(key, raw),
        Err(e) => warn!("Failed to encode preference {}: {}", key, e),
    }
}

/// In-memory store (tests, embedding without persistence).
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPrefs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value);
    }
}

/// JSON file store, written through on every `set`.
#[derive(Debug)]
pub struct JsonPrefs {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonPrefs {
    /// Load from `path`. A missing file starts empty; a corrupt one is
    /// reported and replaced on the next write.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences: {}", path.display()))?;
            match serde_json::from_str(&text) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Preferences file {} is corrupt ({}), starting empty", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            debug!("No preferences file at {}", path.display());
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let text = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))
    }
}

impl Preferences for JsonPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap_or_else(|e| e.into_inner()).get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        if let Err(e) = self.save(&values) {
            warn!("{:#}", e);
        }
    }
}
