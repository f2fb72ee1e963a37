pub mod config;
pub mod context;
mod error;

pub use config::{ConfigError, Service, SettingValue, Settings};
pub use context::{AppContext, SettingsService};
pub use error::Error;
