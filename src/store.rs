//! Key-value settings store backed by SQLite
//!
//! All persisted user state lives in one `app_settings` table in
//! `settings.db`. Each call opens its own connection; writes replace the
//! whole value for a key.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Persisted keys. Everything the app stores goes through one of these.
pub const KEY_LANGUAGE: &str = "language";
pub const KEY_THEME: &str = "theme";
pub const KEY_HIGHLIGHTS: &str = "highlights";
pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_UNDERLINES: &str = "underlines";
pub const KEY_STREAK: &str = "userStreakData";
pub const KEY_DAILY_BREAD: &str = "dailyBreadLastRead";

pub struct SettingsStore {
    db_path: PathBuf,
}

impl SettingsStore {
    /// Open (creating if needed) the settings database.
    pub fn open(db_path: &Path) -> Result<Self> {
        let store = Self { db_path: db_path.to_path_buf() };
        store.init()?;
        Ok(store)
    }

    fn connection(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open settings.db at {:?}", self.db_path))
    }

    fn init(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(
            r#"
            -- App settings (key-value store)
            CREATE TABLE IF NOT EXISTS app_settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connection()?;
        let value = conn
            .query_row(
                "SELECT value FROM app_settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO app_settings (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// Read and decode a JSON value; a missing key is `None`, a corrupt
    /// value is an error for the caller to absorb.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Corrupt JSON under settings key {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn open_temp() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let (_dir, store) = open_temp();
        assert_eq!(store.get("language").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let (_dir, store) = open_temp();
        store.set(KEY_LANGUAGE, "te").unwrap();
        assert_eq!(store.get(KEY_LANGUAGE).unwrap().as_deref(), Some("te"));

        store.set(KEY_LANGUAGE, "en").unwrap();
        assert_eq!(store.get(KEY_LANGUAGE).unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn json_round_trip() {
        let (_dir, store) = open_temp();
        let mut highlights = HashMap::new();
        highlights.insert("1001".to_string(), "yellow".to_string());
        store.set_json(KEY_HIGHLIGHTS, &highlights).unwrap();

        let loaded: HashMap<String, String> = store.get_json(KEY_HIGHLIGHTS).unwrap().unwrap();
        assert_eq!(loaded, highlights);
    }

    #[test]
    fn corrupt_json_is_an_error_not_a_panic() {
        let (_dir, store) = open_temp();
        store.set(KEY_FAVORITES, "not json").unwrap();
        let result: Result<Option<Vec<String>>> = store.get_json(KEY_FAVORITES);
        assert!(result.is_err());
    }
}
