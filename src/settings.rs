//! Typed key/value settings persisted to one JSON document per user.
//!
//! Settings are best effort: I/O problems are logged and the store keeps
//! working in memory. The whole file is read when the store is opened and
//! rewritten on [`Settings::flush`] and when the store is dropped.

use crate::config::PlatformConfig;
use anyhow::{Context, Result};
use serde_json::{Map, Number, Value};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub type SettingsRef = Arc<Settings>;

#[derive(Debug)]
pub struct Settings {
    path: Option<PathBuf>,
    values: Mutex<Map<String, Value>>,
}

impl Settings {
    /// Open the per-user store described by `config`.
    ///
    /// If no configuration directory can be resolved or created the store
    /// still works but nothing is written to disk.
    pub fn open(config: &PlatformConfig) -> SettingsRef {
        let path = config_home(
            std::env::var_os(&config.config_env_var),
            dirs_next::home_dir(),
        )
        .and_then(|home| prepare_settings_dir(&home, &config.app_name));

        match path {
            Some(path) => Arc::new(Self::with_path(path)),
            None => {
                tracing::warn!("settings will not be saved");
                Arc::new(Self::in_memory())
            }
        }
    }

    /// Open a store backed by an explicit file.
    pub fn with_path(path: PathBuf) -> Self {
        let values = load_values(&path);
        Self {
            path: Some(path),
            values: Mutex::new(values),
        }
    }

    /// A store that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(Map::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn values(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn freeze(&self, key: &str, value: Value) {
        self.values().insert(key.to_owned(), value);
    }

    fn thaw<T>(&self, key: &str, default: T, convert: impl FnOnce(&Value) -> Option<T>) -> T {
        self.values().get(key).and_then(convert).unwrap_or(default)
    }

    pub fn freeze_int(&self, key: &str, value: i32) {
        self.freeze(key, Value::from(value));
    }

    pub fn thaw_int(&self, key: &str, default: i32) -> i32 {
        self.thaw(key, default, |v| v.as_i64().and_then(|n| i32::try_from(n).ok()))
    }

    pub fn freeze_bool(&self, key: &str, value: bool) {
        self.freeze(key, Value::Bool(value));
    }

    pub fn thaw_bool(&self, key: &str, default: bool) -> bool {
        self.thaw(key, default, Value::as_bool)
    }

    pub fn freeze_float(&self, key: &str, value: f64) {
        match Number::from_f64(value) {
            Some(number) => self.freeze(key, Value::Number(number)),
            None => {
                // JSON has no representation for NaN or infinities.
                tracing::warn!(key, value, "cannot store non-finite setting");
                self.values().remove(key);
            }
        }
    }

    pub fn thaw_float(&self, key: &str, default: f64) -> f64 {
        self.thaw(key, default, Value::as_f64)
    }

    pub fn freeze_string(&self, key: &str, value: &str) {
        self.freeze(key, Value::String(value.to_owned()));
    }

    pub fn thaw_string(&self, key: &str, default: &str) -> String {
        self.thaw(key, default.to_owned(), |v| v.as_str().map(str::to_owned))
    }

    /// Write the whole store to disk. A store without a path succeeds
    /// without doing anything.
    pub fn flush(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&*self.values()).context("serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("write settings file {}", path.display()))
    }
}

impl Drop for Settings {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            tracing::warn!(?err, "cannot save settings");
        }
    }
}

/// Resolve the base configuration directory: an explicit override first,
/// then `<home>/.config`.
pub fn config_home(env_override: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(dir) = env_override.filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if let Some(home) = home {
        return Some(home.join(".config"));
    }
    tracing::warn!("no configuration directory: neither an override nor a home directory is set");
    None
}

/// Make sure `<config_home>/<app_name>` exists and return the settings file
/// path inside it.
pub fn prepare_settings_dir(config_home: &Path, app_name: &str) -> Option<PathBuf> {
    let dir = config_home.join(app_name.to_lowercase());
    match std::fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            tracing::warn!(path = %dir.display(), "settings location is not a directory");
            return None;
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if let Err(err) = std::fs::create_dir_all(&dir) {
                tracing::warn!(path = %dir.display(), ?err, "cannot create settings directory");
                return None;
            }
        }
        Err(err) => {
            tracing::warn!(path = %dir.display(), ?err, "cannot stat settings directory");
            return None;
        }
    }
    Some(dir.join(SETTINGS_FILE_NAME))
}

fn load_values(path: &Path) -> Map<String, Value> {
    match read_values(path) {
        Ok(values) => values,
        Err(err) => {
            tracing::warn!(path = %path.display(), ?err, "cannot load settings");
            Map::new()
        }
    }
}

fn read_values(path: &Path) -> Result<Map<String, Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("read settings file {}", path.display()))
        }
    };
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("deserialize settings file {}", path.display()))?
    {
        Value::Object(values) => Ok(values),
        other => anyhow::bail!("settings root is not an object but {}", json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_type_round_trips() {
        let settings = Settings::in_memory();
        settings.freeze_int("i", -42);
        settings.freeze_bool("b", true);
        settings.freeze_float("f", 2.5);
        settings.freeze_string("s", "hello");

        assert_eq!(settings.thaw_int("i", 7), -42);
        assert!(settings.thaw_bool("b", false));
        assert_eq!(settings.thaw_float("f", 0.0), 2.5);
        assert_eq!(settings.thaw_string("s", "x"), "hello");
    }

    #[test]
    fn missing_keys_fall_back_to_default() {
        let settings = Settings::in_memory();
        assert_eq!(settings.thaw_int("nope", 3), 3);
        assert!(!settings.thaw_bool("nope", false));
        assert_eq!(settings.thaw_float("nope", 1.5), 1.5);
        assert_eq!(settings.thaw_string("nope", "dflt"), "dflt");
    }

    #[test]
    fn overwriting_replaces_the_type() {
        let settings = Settings::in_memory();
        settings.freeze_int("k", 5);
        settings.freeze_string("k", "five");
        assert_eq!(settings.thaw_int("k", -1), -1);
        assert_eq!(settings.thaw_string("k", ""), "five");
    }

    #[test]
    fn integers_widen_to_floats() {
        let settings = Settings::in_memory();
        settings.freeze_int("k", 3);
        assert_eq!(settings.thaw_float("k", 0.0), 3.0);
        settings.freeze_float("k", 3.5);
        assert_eq!(settings.thaw_int("k", 9), 9);
    }

    #[test]
    fn non_finite_floats_are_not_stored() {
        let settings = Settings::in_memory();
        settings.freeze_float("k", 1.0);
        settings.freeze_float("k", f64::NAN);
        assert_eq!(settings.thaw_float("k", 4.0), 4.0);
    }

    #[test]
    fn override_wins_over_home() {
        let home = PathBuf::from("/home/u");
        assert_eq!(
            config_home(Some("/cfg".into()), Some(home.clone())),
            Some(PathBuf::from("/cfg"))
        );
        assert_eq!(config_home(None, Some(home)), Some(PathBuf::from("/home/u/.config")));
        assert_eq!(config_home(Some("".into()), None), None);
    }

    #[test]
    fn settings_dir_is_created() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = prepare_settings_dir(dir.path(), "SolveSpace").expect("settings path");
        assert_eq!(path, dir.path().join("solvespace").join(SETTINGS_FILE_NAME));
        assert!(dir.path().join("solvespace").is_dir());
    }

    #[test]
    fn file_in_place_of_directory_disables_persistence() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("solvespace"), "not a dir").expect("write");
        assert_eq!(prepare_settings_dir(dir.path(), "solvespace"), None);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").expect("write");
        let settings = Settings::with_path(path);
        assert_eq!(settings.thaw_int("k", 11), 11);
    }

    #[test]
    fn non_object_root_starts_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(SETTINGS_FILE_NAME);
        std::fs::write(&path, "[1, 2]").expect("write");
        let settings = Settings::with_path(path);
        assert_eq!(settings.thaw_string("k", "d"), "d");
    }
}
