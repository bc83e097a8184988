//! Key/value settings kept next to the conversation history

use super::types::StoredValue;
use super::ConversationStore;
use crate::error::{AssisError, Result};
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

impl ConversationStore {
    /// Store `value` as JSON under `key`, replacing any previous value
    pub fn save_setting<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let stored = StoredValue::encode(value).map_err(AssisError::from)?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, stored.as_str()],
        )
        .map_err(|e| AssisError::storage("Failed to save setting", e))?;

        tracing::debug!(key, "Saved setting");
        Ok(())
    }

    /// Raw stored value for `key`, without decoding it
    pub fn get_setting_value(&self, key: &str) -> Result<Option<StoredValue>> {
        let conn = self.connect()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AssisError::storage("Failed to query setting", e))?;
        Ok(raw.map(StoredValue::from_raw))
    }

    /// Decoded value for `key`, or `default` when the key is absent
    ///
    /// # Errors
    ///
    /// Returns `AssisError::CorruptSetting` when a value exists but does not
    /// decode as `T`.
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        match self.get_setting_value(key)? {
            Some(stored) => decode_setting(key, &stored),
            None => Ok(default),
        }
    }

    /// Every stored setting, ordered by key
    pub fn list_settings(&self) -> Result<Vec<(String, StoredValue)>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT key, value FROM settings ORDER BY key ASC")
            .map_err(|e| AssisError::storage("Failed to prepare statement", e))?;

        let rows = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                let raw: String = row.get(1)?;
                Ok((key, StoredValue::from_raw(raw)))
            })
            .map_err(|e| AssisError::storage("Failed to query settings", e))?;

        let mut settings = Vec::new();
        for row in rows {
            settings.push(row.map_err(|e| AssisError::storage("Failed to read setting", e))?);
        }
        Ok(settings)
    }

    /// Remove `key`. Removing a missing key is not an error.
    pub fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM settings WHERE key = ?1", params![key])
            .map_err(|e| AssisError::storage("Failed to delete setting", e))?;
        Ok(())
    }
}

/// Decode a stored setting, reporting failures as `CorruptSetting`
pub fn decode_setting<T: DeserializeOwned>(key: &str, stored: &StoredValue) -> Result<T> {
    stored.decode().map_err(|e| {
        tracing::warn!(key, "Stored setting failed to decode");
        AssisError::CorruptSetting {
            key: key.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}
