//! Typed persistence for courses, scales and preferences.
//!
//! # Responsibility
//! - Encode app values into key-value entries (JSON for lists).
//! - Decode stored entries back into domain types.
//!
//! # Invariants
//! - Every write replaces the whole value under its key.
//! - Writes touching several keys go through one `write_batch`.
//! - Malformed list JSON is reported as `InvalidData`, never silently dropped.
//! - Malformed preference entries degrade to defaults with a warning.

use crate::model::course::Course;
use crate::model::preferences::{parse_decimal_places, Preferences};
use crate::model::scale::GradeScaleConfig;
use crate::model::theme::ThemeName;
use crate::repo::kv_store::{keys, KeyValueStore, KvWrite, StoreError};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for typed app values.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    InvalidData { key: &'static str, message: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData { key, message } => {
                write!(f, "invalid stored value under `{key}`: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Typed view over a `KeyValueStore`.
pub struct AppRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> AppRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load_courses(&self) -> RepoResult<Vec<Course>> {
        self.load_json_list(keys::COURSES)
    }

    pub fn save_courses(&self, courses: &[Course]) -> RepoResult<()> {
        self.save_json(keys::COURSES, courses)
    }

    pub fn load_custom_scales(&self) -> RepoResult<Vec<GradeScaleConfig>> {
        self.load_json_list(keys::CUSTOM_SCALES)
    }

    /// Stores the custom scale list and, when given, the selected scale name
    /// in one batch.
    pub fn save_custom_scales(
        &self,
        scales: &[GradeScaleConfig],
        selected: Option<&str>,
    ) -> RepoResult<()> {
        let mut writes = vec![KvWrite::Set {
            key: keys::CUSTOM_SCALES,
            value: encode_json(keys::CUSTOM_SCALES, scales)?,
        }];
        writes.extend(selected.map(select_write));
        Ok(self.store.write_batch(&writes)?)
    }

    pub fn load_selected_scale(&self) -> RepoResult<Option<String>> {
        Ok(self
            .store
            .get(keys::SELECTED_SCALE)?
            .filter(|name| !name.is_empty()))
    }

    pub fn save_selected_scale(&self, name: &str) -> RepoResult<()> {
        Ok(self.store.set(keys::SELECTED_SCALE, name)?)
    }

    /// Loads preferences; unset or unreadable entries keep their defaults.
    pub fn load_preferences(&self) -> RepoResult<Preferences> {
        let mut preferences = Preferences::default();

        if let Some(raw) = self.store.get(keys::THEME)? {
            match ThemeName::parse(&raw) {
                Some(theme) => preferences.theme = theme,
                None => warn!("event=prefs_load module=repo status=degraded field=theme"),
            }
        }

        if let Some(raw) = self.store.get(keys::DARK_MODE)? {
            preferences.dark_mode = raw == "true";
        }

        if let Some(raw) = self.store.get(keys::DECIMAL_PLACES)? {
            match parse_decimal_places(&raw) {
                Ok(places) => preferences.decimal_places = places,
                Err(_) => {
                    warn!("event=prefs_load module=repo status=degraded field=decimal_places");
                }
            }
        }

        Ok(preferences)
    }

    pub fn save_theme(&self, theme: ThemeName) -> RepoResult<()> {
        Ok(self.store.set(keys::THEME, theme.as_str())?)
    }

    pub fn save_dark_mode(&self, dark_mode: bool) -> RepoResult<()> {
        Ok(self.store.set(keys::DARK_MODE, &dark_mode.to_string())?)
    }

    pub fn save_decimal_places(&self, places: u8) -> RepoResult<()> {
        Ok(self.store.set(keys::DECIMAL_PLACES, &places.to_string())?)
    }

    pub fn reset_courses(&self) -> RepoResult<()> {
        Ok(self.store.remove(keys::COURSES)?)
    }

    /// Removes custom scales and, when given, stores the fallback selection
    /// in the same batch.
    pub fn reset_custom_scales(&self, selected: Option<&str>) -> RepoResult<()> {
        let mut writes = vec![KvWrite::Remove {
            key: keys::CUSTOM_SCALES,
        }];
        writes.extend(selected.map(select_write));
        Ok(self.store.write_batch(&writes)?)
    }

    pub fn reset_preferences(&self) -> RepoResult<()> {
        let writes = keys::PREFERENCES.map(|key| KvWrite::Remove { key });
        Ok(self.store.write_batch(&writes)?)
    }

    /// Clears the whole store.
    pub fn reset_all(&self) -> RepoResult<()> {
        Ok(self.store.clear()?)
    }

    fn load_json_list<T: DeserializeOwned>(&self, key: &'static str) -> RepoResult<Vec<T>> {
        match self.store.get(key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|err| RepoError::InvalidData {
                key,
                message: err.to_string(),
            }),
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> RepoResult<()> {
        let encoded = encode_json(key, value)?;
        Ok(self.store.set(key, &encoded)?)
    }
}

fn encode_json<T: Serialize + ?Sized>(key: &'static str, value: &T) -> RepoResult<String> {
    serde_json::to_string(value).map_err(|err| RepoError::InvalidData {
        key,
        message: err.to_string(),
    })
}

fn select_write(name: &str) -> KvWrite {
    KvWrite::Set {
        key: keys::SELECTED_SCALE,
        value: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppRepository, RepoError};
    use crate::model::theme::ThemeName;
    use crate::repo::kv_store::{keys, KeyValueStore, MemoryKvStore};

    #[test]
    fn unset_values_load_as_defaults() {
        let repo = AppRepository::new(MemoryKvStore::new());
        assert!(repo.load_courses().expect("courses").is_empty());
        assert!(repo.load_custom_scales().expect("scales").is_empty());
        assert_eq!(repo.load_selected_scale().expect("selected"), None);
        assert_eq!(repo.load_preferences().expect("prefs").decimal_places, 2);
    }

    #[test]
    fn malformed_course_json_is_invalid_data() {
        let store = MemoryKvStore::new();
        store.set(keys::COURSES, "{not json").expect("seed");
        let repo = AppRepository::new(&store);

        let err = repo.load_courses().unwrap_err();
        assert!(matches!(err, RepoError::InvalidData { key, .. } if key == keys::COURSES));
    }

    #[test]
    fn preferences_are_stored_as_plain_strings() {
        let store = MemoryKvStore::new();
        let repo = AppRepository::new(&store);
        repo.save_theme(ThemeName::Green).expect("theme");
        repo.save_dark_mode(true).expect("dark mode");
        repo.save_decimal_places(3).expect("places");

        assert_eq!(store.get(keys::THEME).expect("get").as_deref(), Some("green"));
        assert_eq!(store.get(keys::DARK_MODE).expect("get").as_deref(), Some("true"));
        assert_eq!(store.get(keys::DECIMAL_PLACES).expect("get").as_deref(), Some("3"));

        let prefs = repo.load_preferences().expect("prefs");
        assert_eq!(prefs.theme, ThemeName::Green);
        assert!(prefs.dark_mode);
        assert_eq!(prefs.decimal_places, 3);
    }

    #[test]
    fn unreadable_preferences_degrade_to_defaults() {
        let store = MemoryKvStore::new();
        store.set(keys::THEME, "teal").expect("seed theme");
        store.set(keys::DECIMAL_PLACES, "9").expect("seed places");
        let repo = AppRepository::new(&store);

        let prefs = repo.load_preferences().expect("prefs");
        assert_eq!(prefs.theme, ThemeName::Blue);
        assert_eq!(prefs.decimal_places, 2);
    }

    #[test]
    fn reset_preferences_keeps_courses() {
        let store = MemoryKvStore::new();
        store.set(keys::COURSES, "[]").expect("seed courses");
        let repo = AppRepository::new(&store);
        repo.save_theme(ThemeName::Orange).expect("theme");

        repo.reset_preferences().expect("reset");
        assert_eq!(store.get(keys::THEME).expect("get"), None);
        assert_eq!(store.get(keys::COURSES).expect("get").as_deref(), Some("[]"));
    }
}
