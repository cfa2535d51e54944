//! Preference storage backends

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, info, warn};

use super::{PreferenceError, PreferenceKey, PreferenceStore, PreferenceValue};

/// Preferences held only for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<BTreeMap<PreferenceKey, PreferenceValue>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: PreferenceKey) -> Option<PreferenceValue> {
        self.values.read().ok()?.get(&key).cloned()
    }

    fn set(&self, key: PreferenceKey, value: PreferenceValue) -> Result<(), PreferenceError> {
        self.values
            .write()
            .map_err(|_| PreferenceError::Poisoned)?
            .insert(key, value);
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object keyed by preference identifier.
///
/// The whole file is rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    values: RwLock<BTreeMap<PreferenceKey, PreferenceValue>>,
}

impl JsonFilePreferences {
    /// Load preferences from `path`. A missing file starts empty.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&data)?;
            parse_entries(raw)
        } else {
            debug!("No preference file at {}, using defaults", path.display());
            BTreeMap::new()
        };

        info!("Loaded {} stored preferences from {}", values.len(), path.display());
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(
        &self,
        values: &BTreeMap<PreferenceKey, PreferenceValue>,
    ) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw: BTreeMap<&str, &PreferenceValue> =
            values.iter().map(|(key, value)| (key.as_str(), value)).collect();
        let data = serde_json::to_string_pretty(&raw)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Keep every entry that names a known key and holds a valid value
fn parse_entries(
    raw: BTreeMap<String, serde_json::Value>,
) -> BTreeMap<PreferenceKey, PreferenceValue> {
    let mut values = BTreeMap::new();
    for (name, raw_value) in raw {
        let key = match name.parse::<PreferenceKey>() {
            Ok(key) => key,
            Err(_) => {
                warn!("Ignoring unknown preference {:?}", name);
                continue;
            }
        };
        let value = match serde_json::from_value::<PreferenceValue>(raw_value) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring stored preference {}: {}", key, e);
                continue;
            }
        };
        if let Err(e) = key.validate(&value) {
            warn!("Ignoring stored preference: {}", e);
            continue;
        }
        values.insert(key, value);
    }
    values
}

impl PreferenceStore for JsonFilePreferences {
    fn get(&self, key: PreferenceKey) -> Option<PreferenceValue> {
        self.values.read().ok()?.get(&key).cloned()
    }

    fn set(&self, key: PreferenceKey, value: PreferenceValue) -> Result<(), PreferenceError> {
        let mut values = self.values.write().map_err(|_| PreferenceError::Poisoned)?;
        let mut updated = values.clone();
        updated.insert(key, value);
        self.save(&updated)?;
        *values = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::Preferences;
    use std::sync::Arc;

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePreferences::load(dir.path().join("nope.json")).unwrap();
        assert_eq!(store.get(PreferenceKey::TimerHours), None);
    }

    #[test]
    fn values_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let prefs = Preferences::new(Arc::new(JsonFilePreferences::load(&path).unwrap()));
        prefs.set(PreferenceKey::TimerMinutes, 5i64).unwrap();
        prefs.set(PreferenceKey::AnnounceExpiration, true).unwrap();
        prefs.set(PreferenceKey::AnnouncementText, "Stretch").unwrap();

        let reloaded = Preferences::new(Arc::new(JsonFilePreferences::load(&path).unwrap()));
        assert_eq!(reloaded.integer(PreferenceKey::TimerMinutes), 5);
        assert!(reloaded.bool(PreferenceKey::AnnounceExpiration));
        assert_eq!(reloaded.announcement_text(), "Stretch");

        let data = std::fs::read_to_string(&path).unwrap();
        assert!(data.contains("\"timer-minutes\""));
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(
            &path,
            r#"{"timer-hours": 3, "timer-minutes": 75,
                "colour": "red", "show-alert-window": "yes"}"#,
        )
        .unwrap();

        let store = JsonFilePreferences::load(&path).unwrap();
        assert_eq!(store.get(PreferenceKey::TimerHours), Some(PreferenceValue::Integer(3)));
        assert_eq!(store.get(PreferenceKey::TimerMinutes), None);
        assert_eq!(store.get(PreferenceKey::ShowAlertWindow), None);
    }

    #[test]
    fn values_of_unsupported_json_types_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(
            &path,
            r#"{"timer-hours": 3, "timer-minutes": 1.5,
                "announcement-text": null, "timer-seconds": [1]}"#,
        )
        .unwrap();

        let store = JsonFilePreferences::load(&path).unwrap();
        assert_eq!(store.get(PreferenceKey::TimerHours), Some(PreferenceValue::Integer(3)));
        assert_eq!(store.get(PreferenceKey::TimerMinutes), None);
        assert_eq!(store.get(PreferenceKey::AnnouncementText), None);
        assert_eq!(store.get(PreferenceKey::TimerSeconds), None);
    }

    #[test]
    fn failed_save_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("preferences.json");

        let prefs = Preferences::new(Arc::new(JsonFilePreferences::load(&path).unwrap()));
        assert!(matches!(
            prefs.set(PreferenceKey::TimerMinutes, 5i64),
            Err(PreferenceError::Io(_))
        ));
        assert_eq!(prefs.integer(PreferenceKey::TimerMinutes), 25);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFilePreferences::load(&path),
            Err(PreferenceError::Format(_))
        ));
    }
}
