//! The persisted settings record and its logical-key bindings.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::paths::DirectorySet;
use super::ConfigError;

/// Application settings, stored as `config.json`.
///
/// Each field is addressed by the logical key it is serialized under; see
/// [`Settings::get`] and [`Settings::set`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "configPath", default, skip_serializing_if = "String::is_empty")]
    pub config_path: String,

    #[serde(rename = "userHomeDir", default, skip_serializing_if = "String::is_empty")]
    pub user_home_dir: String,

    #[serde(rename = "rootDir", default, skip_serializing_if = "String::is_empty")]
    pub root_dir: String,

    #[serde(rename = "cacheDir", default, skip_serializing_if = "String::is_empty")]
    pub cache_dir: String,

    #[serde(rename = "configDir", default, skip_serializing_if = "String::is_empty")]
    pub config_dir: String,

    #[serde(rename = "dataDir", default, skip_serializing_if = "String::is_empty")]
    pub data_dir: String,

    #[serde(rename = "workspaceDir", default, skip_serializing_if = "String::is_empty")]
    pub workspace_dir: String,

    #[serde(rename = "default_route")]
    pub default_route: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,

    pub language: String,
}

impl Settings {
    /// Built-in defaults for a fresh install living in `dirs`.
    pub fn defaults(dirs: &DirectorySet, file_name: &str) -> Self {
        Self {
            config_path: path_text(&dirs.config.join(file_name)),
            user_home_dir: path_text(&dirs.user_home),
            root_dir: path_text(&dirs.root),
            cache_dir: path_text(&dirs.cache),
            config_dir: path_text(&dirs.config),
            data_dir: path_text(&dirs.data),
            workspace_dir: path_text(&dirs.workspace),
            default_route: "/".to_string(),
            features: Vec::new(),
            language: "en".to_string(),
        }
    }

    /// Returns the value bound to `key` (case-insensitive).
    pub fn get(&self, key: &str) -> Result<SettingValue, ConfigError> {
        let binding = binding(key)?;
        Ok((binding.get)(self))
    }

    /// Replaces the value bound to `key` (case-insensitive).
    ///
    /// The value must be of the field's kind; nothing changes on error.
    pub fn set(&mut self, key: &str, value: SettingValue) -> Result<(), ConfigError> {
        let binding = binding(key)?;
        if value.kind() != binding.kind {
            return Err(ConfigError::TypeMismatch {
                key: key.to_string(),
                expected: binding.kind,
                found: value.kind(),
            });
        }
        (binding.set)(self, value);
        Ok(())
    }

    /// Logical keys of every bound field, in declaration order.
    pub fn keys() -> impl Iterator<Item = &'static str> {
        BINDINGS.iter().map(|b| b.key)
    }
}

/// The shape of a settings value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Text => f.write_str("string"),
            ValueKind::List => f.write_str("list of strings"),
        }
    }
}

/// A settings value moving in or out of the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Text(String),
    List(Vec<String>),
}

impl SettingValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            SettingValue::Text(_) => ValueKind::Text,
            SettingValue::List(_) => ValueKind::List,
        }
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

impl From<Vec<&str>> for SettingValue {
    fn from(value: Vec<&str>) -> Self {
        SettingValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Rust types a settings value can be read into.
pub trait SettingType: Sized {
    const KIND: ValueKind;

    fn from_value(value: SettingValue) -> Option<Self>;
}

impl SettingType for String {
    const KIND: ValueKind = ValueKind::Text;

    fn from_value(value: SettingValue) -> Option<Self> {
        match value {
            SettingValue::Text(s) => Some(s),
            SettingValue::List(_) => None,
        }
    }
}

impl SettingType for Vec<String> {
    const KIND: ValueKind = ValueKind::List;

    fn from_value(value: SettingValue) -> Option<Self> {
        match value {
            SettingValue::List(items) => Some(items),
            SettingValue::Text(_) => None,
        }
    }
}

struct Binding {
    key: &'static str,
    kind: ValueKind,
    get: fn(&Settings) -> SettingValue,
    set: fn(&mut Settings, SettingValue),
}

macro_rules! text_field {
    ($key:literal, $field:ident) => {
        Binding {
            key: $key,
            kind: ValueKind::Text,
            get: |s| SettingValue::Text(s.$field.clone()),
            set: |s, v| {
                if let SettingValue::Text(text) = v {
                    s.$field = text;
                }
            },
        }
    };
}

// Keys must match the serde names on `Settings`.
static BINDINGS: &[Binding] = &[
    text_field!("configPath", config_path),
    text_field!("userHomeDir", user_home_dir),
    text_field!("rootDir", root_dir),
    text_field!("cacheDir", cache_dir),
    text_field!("configDir", config_dir),
    text_field!("dataDir", data_dir),
    text_field!("workspaceDir", workspace_dir),
    text_field!("default_route", default_route),
    Binding {
        key: "features",
        kind: ValueKind::List,
        get: |s| SettingValue::List(s.features.clone()),
        set: |s, v| {
            if let SettingValue::List(items) = v {
                s.features = items;
            }
        },
    },
    text_field!("language", language),
];

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn binding(key: &str) -> Result<&'static Binding, ConfigError> {
    BINDINGS
        .iter()
        .find(|b| b.key.eq_ignore_ascii_case(key))
        .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample() -> Settings {
        let dirs = DirectorySet::from_bases("app", "/h", "/h/share", "/h/cache");
        Settings::defaults(&dirs, "config.json")
    }

    #[test]
    fn test_defaults() {
        let settings = sample();

        assert_eq!(settings.language, "en");
        assert_eq!(settings.default_route, "/");
        assert!(settings.features.is_empty());
        assert!(settings.config_path.ends_with("config.json"));
        assert!(settings.config_path.starts_with(&settings.config_dir));
    }

    #[test]
    fn test_keys_are_unique_ignoring_case() {
        let keys: HashSet<String> = Settings::keys().map(str::to_lowercase).collect();

        assert_eq!(keys.len(), BINDINGS.len());
    }

    #[test]
    fn test_keys_match_serialized_names() {
        let mut settings = sample();
        settings.features = vec!["x".to_string()];
        let value = serde_json::to_value(&settings).unwrap();
        let object = value.as_object().unwrap();

        for key in Settings::keys() {
            assert!(object.contains_key(key), "{key} is not a serialized field");
        }
        assert_eq!(object.len(), BINDINGS.len());
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let settings = sample();

        assert_eq!(settings.get("LANGUAGE").unwrap(), SettingValue::from("en"));
        assert_eq!(settings.get("Default_Route").unwrap(), SettingValue::from("/"));
    }

    #[test]
    fn test_set_replaces_field() {
        let mut settings = sample();

        settings.set("language", "fr".into()).unwrap();
        settings.set("features", vec!["beta"].into()).unwrap();

        assert_eq!(settings.language, "fr");
        assert_eq!(settings.features, vec!["beta".to_string()]);
    }

    #[test]
    fn test_unknown_key() {
        let mut settings = sample();

        assert!(matches!(settings.get("nonexistent"), Err(ConfigError::KeyNotFound(_))));
        assert!(matches!(
            settings.set("nonexistent", "x".into()),
            Err(ConfigError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let mut settings = sample();

        let result = settings.set("language", vec!["fr"].into());

        assert!(matches!(
            result,
            Err(ConfigError::TypeMismatch {
                expected: ValueKind::Text,
                found: ValueKind::List,
                ..
            })
        ));
        assert_eq!(settings.language, "en");
    }

    #[test]
    fn test_setting_type_conversion() {
        assert_eq!(String::from_value("a".into()), Some("a".to_string()));
        assert_eq!(String::from_value(vec!["a"].into()), None);
        assert_eq!(Vec::<String>::from_value(vec!["a"].into()), Some(vec!["a".to_string()]));
        assert_eq!(Vec::<String>::from_value("a".into()), None);
    }
}
