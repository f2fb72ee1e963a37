//! Settings persistence: the settings store, its directory layout and the
//! key-value format adapters.

mod error;
pub mod format;
mod paths;
mod service;
mod settings;

pub use error::ConfigError;
pub use format::{FormatError, FormatKind, KeyValues};
pub use paths::DirectorySet;
pub use service::{Service, ServiceBuilder, DEFAULT_APP_NAME, DEFAULT_FILE_NAME};
pub use settings::{SettingType, SettingValue, Settings, ValueKind};
