//! Persistent key-value settings store
//!
//! A flat JSON object on disk. Every write replaces the file through a
//! uniquely named sibling temp file and a rename, so an abrupt exit leaves
//! either the old or the new contents, never a torn file.

use crate::{types::WindowState, Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Key holding the main window geometry
pub const WINDOW_STATE_KEY: &str = "windowState";

/// Key holding the last selected stream URL
pub const LAST_STATION_KEY: &str = "lastStation";

/// Default file name inside the app data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// File-backed settings map
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    /// Backing file, `None` for a memory-only store
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl SettingsStore {
    /// Memory-only store, nothing is written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`, falling back to an empty map when the file
    /// is missing or unreadable. Startup never fails because of settings.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(&path) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, code = e.error_code(), "Settings unreadable, using defaults");
                Self {
                    path: Some(path),
                    values: Map::new(),
                }
            }
        }
    }

    /// Strict variant of [`SettingsStore::open`]; a missing file is still an
    /// empty store, but parse and IO failures are returned.
    pub fn load(path: &Path) -> Result<Self> {
        let values = match fs::read(path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Map::new(),
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
                Value::Object(map) => map,
                _ => {
                    return Err(Error::SettingsShape {
                        key: "<root>".to_string(),
                    })
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = values.len(), "Settings loaded");

        Ok(Self {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    /// Backing file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Typed read. A value of the wrong shape reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "Ignoring malformed setting");
                None
            }
        }
    }

    /// Write a value and flush to disk.
    ///
    /// The in-memory value is updated even when the flush fails, so readers
    /// in this process always see the latest value.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    /// Stored window geometry, or the first-run default
    pub fn window_state(&self) -> WindowState {
        self.get(WINDOW_STATE_KEY).unwrap_or_default()
    }

    pub fn set_window_state(&mut self, state: &WindowState) -> Result<()> {
        self.set(WINDOW_STATE_KEY, state)
    }

    /// Stored station URL, if any
    pub fn last_station(&self) -> Option<String> {
        self.get(LAST_STATION_KEY)
    }

    pub fn set_last_station(&mut self, url: &str) -> Result<()> {
        self.set(LAST_STATION_KEY, &url)
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| SETTINGS_FILE_NAME.to_string());
        let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let bytes = serde_json::to_vec_pretty(&self.values)?;
        fs::write(&tmp, bytes)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(path = %path.display(), "Settings flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json"));
        assert_eq!(store.window_state(), WindowState::default());
        assert_eq!(store.last_station(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = SettingsStore::open(&path);
        let state = WindowState {
            x: Some(-40),
            y: Some(120),
            width: 320,
            height: 480,
        };
        store.set_window_state(&state).unwrap();
        store.set_last_station("https://example.test/stream").unwrap();

        let reopened = SettingsStore::open(&path);
        assert_eq!(reopened.window_state(), state);
        assert_eq!(
            reopened.last_station().as_deref(),
            Some("https://example.test/stream")
        );
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{ not json").unwrap();

        assert!(SettingsStore::load(&path).is_err());

        let store = SettingsStore::open(&path);
        assert_eq!(store.window_state(), WindowState::default());
    }

    #[test]
    fn test_malformed_key_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, br#"{ "windowState": "wide", "lastStation": 7 }"#).unwrap();

        let store = SettingsStore::open(&path);
        assert_eq!(store.window_state(), WindowState::default());
        assert_eq!(store.last_station(), None);
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::open(&path);
        for i in 0..5 {
            store.set_window_state(&WindowState::default().moved_to(i, i)).unwrap();
        }

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_in_memory_store_never_touches_disk() {
        let mut store = SettingsStore::in_memory();
        store.set_last_station("https://example.test/a").unwrap();
        assert_eq!(store.path(), None);
        assert_eq!(store.last_station().as_deref(), Some("https://example.test/a"));
    }
}
