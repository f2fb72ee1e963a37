//! Application context for sharing the settings service with other components.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ConfigError, SettingType, SettingValue};
use crate::Error;

/// What components need from the registered configuration.
///
/// Implemented by [`Service`](crate::Service); hosts can substitute their own
/// implementation when building an [`AppContext`].
pub trait SettingsService {
    fn save(&self) -> Result<(), ConfigError>;

    fn get<T: SettingType>(&self, key: &str, out: &mut T) -> Result<(), ConfigError>;

    fn set<V: Into<SettingValue>>(&self, key: &str, value: V) -> Result<(), ConfigError>;

    fn save_struct<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), ConfigError>;

    fn load_struct<T: DeserializeOwned>(&self, name: &str, out: &mut T) -> Result<(), ConfigError>;
}

/// Central application context holding the configuration service.
///
/// The configuration is installed once while building and exposed by
/// reference afterwards.
///
/// ## Example
///
/// ```no_run
/// use settings_store::{AppContext, Service, SettingsService};
///
/// let ctx = Service::register(AppContext::builder())?.build()?;
///
/// let mut route = String::new();
/// ctx.config().get("default_route", &mut route)?;
/// # Ok::<(), settings_store::Error>(())
/// ```
#[derive(Debug)]
pub struct AppContext<C> {
    config: C,
}

impl<C> AppContext<C> {
    /// Returns a reference to the configuration service.
    pub fn config(&self) -> &C {
        &self.config
    }
}

impl AppContext<()> {
    /// Creates a new builder for constructing an `AppContext`.
    pub fn builder() -> AppContextBuilder<()> {
        AppContextBuilder { config: None }
    }
}

/// Builder for constructing an [`AppContext`].
///
/// The builder starts with no config (`AppContextBuilder<()>`) and transitions
/// to `AppContextBuilder<C>` when [`with_config`](Self::with_config) is called.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct AppContextBuilder<C> {
    config: Option<C>,
}

impl AppContextBuilder<()> {
    /// Attaches a configuration service to the application context.
    pub fn with_config<C: SettingsService>(self, config: C) -> AppContextBuilder<C> {
        AppContextBuilder {
            config: Some(config),
        }
    }
}

impl<C> AppContextBuilder<C> {
    /// Builds the `AppContext`.
    ///
    /// Returns an error if no configuration was provided.
    pub fn build(self) -> Result<AppContext<C>, Error> {
        Ok(AppContext {
            config: self.config.ok_or(Error::MissingConfig)?,
        })
    }
}
