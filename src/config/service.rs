use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::format::{self, Format, KeyValues};
use super::paths::DirectorySet;
use super::settings::{SettingType, SettingValue, Settings};
use super::ConfigError;
use crate::context::{AppContextBuilder, SettingsService};

/// Application name used for directory layout when none is given.
pub const DEFAULT_APP_NAME: &str = "lethean";

/// File name of the settings document inside the config directory.
pub const DEFAULT_FILE_NAME: &str = "config.json";

/// Loads, mutates and persists the application [`Settings`].
///
/// On construction the settings file is loaded if present, otherwise it is
/// created with defaults. Every successful [`set`](Self::set) rewrites the
/// whole file.
///
/// Access to the record is serialized by an internal lock, so a `Service` can
/// be shared between threads. Writes are not atomic: a crash mid-write can
/// leave a truncated file behind.
///
/// ## Example
///
/// ```no_run
/// use settings_store::Service;
///
/// let config = Service::new()?;
/// config.set("language", "fr")?;
///
/// let mut language = String::new();
/// config.get("language", &mut language)?;
/// assert_eq!(language, "fr");
/// # Ok::<(), settings_store::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct Service {
    directories: DirectorySet,
    settings: Mutex<Settings>,
}

impl Service {
    /// Creates a service with the default application layout.
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    /// Creates a new service builder.
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::default()
    }

    /// Creates a service with the default layout and installs it as the
    /// context's configuration.
    pub fn register(
        context: AppContextBuilder<()>,
    ) -> Result<AppContextBuilder<Service>, ConfigError> {
        Self::builder().register(context)
    }

    /// The directories resolved at construction.
    pub fn directories(&self) -> &DirectorySet {
        &self.directories
    }

    /// A snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.lock().clone()
    }

    /// Location of the settings document.
    pub fn config_path(&self) -> PathBuf {
        PathBuf::from(&self.lock().config_path)
    }

    /// Directory holding the settings document and all auxiliary files.
    pub fn config_dir(&self) -> PathBuf {
        PathBuf::from(&self.lock().config_dir)
    }

    /// Writes the full settings record to the settings file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let settings = self.lock();
        write_settings(Path::new(&settings.config_path), &settings)
    }

    /// Copies the value bound to `key` into `out`.
    ///
    /// Fails if no field is bound to `key` or the field is not a `T`.
    pub fn get<T: SettingType>(&self, key: &str, out: &mut T) -> Result<(), ConfigError> {
        let value = self.lock().get(key)?;
        let field_kind = value.kind();
        *out = T::from_value(value).ok_or_else(|| ConfigError::TypeMismatch {
            key: key.to_string(),
            expected: field_kind,
            found: T::KIND,
        })?;
        Ok(())
    }

    /// Replaces the value bound to `key` and saves the settings file.
    ///
    /// If saving fails, the in-memory value keeps the new value while the
    /// file does not.
    pub fn set(&self, key: &str, value: impl Into<SettingValue>) -> Result<(), ConfigError> {
        let mut settings = self.lock();
        settings.set(key, value.into())?;
        write_settings(Path::new(&settings.config_path), &settings)?;
        tracing::debug!(key, "setting updated");
        Ok(())
    }

    /// Writes `value` as indented JSON to `<configDir>/<name>.json`.
    ///
    /// Values serde cannot represent as JSON fail with
    /// [`ConfigError::SerializeError`].
    pub fn save_struct<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), ConfigError> {
        let path = self.struct_path(name);
        let contents =
            serde_json::to_vec_pretty(value).map_err(|e| ConfigError::SerializeError {
                name: name.to_string(),
                source: e,
            })?;
        write_file(&path, contents)
    }

    /// Reads `<configDir>/<name>.json` into `out`.
    ///
    /// A missing file is not an error and leaves `out` untouched, as does a
    /// document that is just `null`.
    pub fn load_struct<T: DeserializeOwned>(&self, name: &str, out: &mut T) -> Result<(), ConfigError> {
        let path = self.struct_path(name);
        let contents = match std::fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(ConfigError::ReadError { path, source: e }),
        };

        let value: Option<T> =
            serde_json::from_slice(&contents).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
        if let Some(value) = value {
            *out = value;
        }
        Ok(())
    }

    /// Writes `data` to `<configDir>/<name>` in the format named by its
    /// extension.
    pub fn save_key_values(&self, name: &str, data: &KeyValues) -> Result<(), ConfigError> {
        let format = format::resolve(name)?;
        format.save(&self.config_dir().join(name), data)?;
        Ok(())
    }

    /// Reads `<configDir>/<name>` in the format named by its extension.
    pub fn load_key_values(&self, name: &str) -> Result<KeyValues, ConfigError> {
        let format = format::resolve(name)?;
        Ok(format.load(&self.config_dir().join(name))?)
    }

    fn struct_path(&self, name: &str) -> PathBuf {
        self.config_dir().join(format!("{name}.json"))
    }

    fn lock(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsService for Service {
    fn save(&self) -> Result<(), ConfigError> {
        Service::save(self)
    }

    fn get<T: SettingType>(&self, key: &str, out: &mut T) -> Result<(), ConfigError> {
        Service::get(self, key, out)
    }

    fn set<V: Into<SettingValue>>(&self, key: &str, value: V) -> Result<(), ConfigError> {
        Service::set(self, key, value)
    }

    fn save_struct<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), ConfigError> {
        Service::save_struct(self, name, value)
    }

    fn load_struct<T: DeserializeOwned>(&self, name: &str, out: &mut T) -> Result<(), ConfigError> {
        Service::load_struct(self, name, out)
    }
}

/// Builder for a [`Service`].
///
/// Without explicit [`directories`](Self::directories) the layout is resolved
/// from the user's home, data and cache locations.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct ServiceBuilder {
    app_name: String,
    file_name: String,
    directories: Option<DirectorySet>,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            directories: None,
        }
    }
}

impl ServiceBuilder {
    /// Sets the application name the directory layout is derived from.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Sets the settings file name inside the config directory.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Uses an explicit directory layout instead of resolving one.
    pub fn directories(mut self, directories: DirectorySet) -> Self {
        self.directories = Some(directories);
        self
    }

    /// Ensures the directories exist, then loads the settings file or
    /// creates it with defaults.
    pub fn build(self) -> Result<Service, ConfigError> {
        let directories = match self.directories {
            Some(directories) => directories,
            None => DirectorySet::resolve(&self.app_name)?,
        };
        directories.ensure()?;

        let defaults = Settings::defaults(&directories, &self.file_name);
        let path = PathBuf::from(&defaults.config_path);
        let settings = match load_settings(&path, &defaults)? {
            Some(settings) => {
                tracing::debug!(path = %path.display(), "loaded settings");
                settings
            }
            None => {
                write_settings(&path, &defaults)?;
                tracing::debug!(path = %path.display(), "created default settings");
                defaults
            }
        };

        Ok(Service {
            directories,
            settings: Mutex::new(settings),
        })
    }

    /// Builds the service and installs it as the context's configuration.
    pub fn register(
        self,
        context: AppContextBuilder<()>,
    ) -> Result<AppContextBuilder<Service>, ConfigError> {
        Ok(context.with_config(self.build()?))
    }
}

/// Loads the settings document, overlaying its keys on `defaults`.
///
/// Returns `Ok(None)` if the file doesn't exist.
fn load_settings(path: &Path, defaults: &Settings) -> Result<Option<Settings>, ConfigError> {
    let contents = match std::fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let parse_error = |e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    };
    let overlay: Option<Map<String, Value>> =
        serde_json::from_slice(&contents).map_err(parse_error)?;

    let mut merged = match serde_json::to_value(defaults) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            return Err(ConfigError::SerializeError {
                name: path.display().to_string(),
                source: e,
            })
        }
    };
    merged.extend(overlay.unwrap_or_default());

    let settings = serde_json::from_value(Value::Object(merged)).map_err(parse_error)?;
    Ok(Some(settings))
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let contents =
        serde_json::to_vec_pretty(settings).map_err(|e| ConfigError::SerializeError {
            name: path.display().to_string(),
            source: e,
        })?;
    write_file(path, contents)
}

fn write_file(path: &Path, contents: Vec<u8>) -> Result<(), ConfigError> {
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::trace!(path = %path.display(), "wrote config file");
    Ok(())
}
