//! Standard directories used by the settings store.

use std::path::{Path, PathBuf};

use super::ConfigError;

/// The six directories a [`Service`](super::Service) works in.
///
/// `user_home` is `<home>/<app>` and holds the `config`, `data` and
/// `workspace` subdirectories. `root` and `cache` live under the platform
/// data and cache locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySet {
    pub root: PathBuf,
    pub cache: PathBuf,
    pub config: PathBuf,
    pub data: PathBuf,
    pub workspace: PathBuf,
    pub user_home: PathBuf,
}

impl DirectorySet {
    /// Resolves the layout for `app_name` from the current user's environment.
    pub fn resolve(app_name: &str) -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirUnavailable)?;
        let data = dirs::data_dir().ok_or(ConfigError::PlatformDirUnavailable("data"))?;
        let cache = dirs::cache_dir().ok_or(ConfigError::PlatformDirUnavailable("cache"))?;
        Ok(Self::from_bases(app_name, home, data, cache))
    }

    /// Computes the layout for `app_name` under explicit base directories.
    pub fn from_bases(
        app_name: &str,
        home: impl AsRef<Path>,
        data: impl AsRef<Path>,
        cache: impl AsRef<Path>,
    ) -> Self {
        let user_home = home.as_ref().join(app_name);
        Self {
            root: data.as_ref().join(app_name),
            cache: cache.as_ref().join(app_name),
            config: user_home.join("config"),
            data: user_home.join("data"),
            workspace: user_home.join("workspace"),
            user_home,
        }
    }

    /// Lays out every directory under a single `base`, for portable installs.
    pub fn portable(app_name: &str, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self::from_bases(
            app_name,
            base,
            base.join(".local").join("share"),
            base.join(".cache"),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [
            &self.root,
            &self.config,
            &self.data,
            &self.cache,
            &self.workspace,
            &self.user_home,
        ]
        .into_iter()
        .map(PathBuf::as_path)
    }

    /// Creates every directory that does not exist yet.
    pub fn ensure(&self) -> Result<(), ConfigError> {
        for dir in self.iter() {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        tracing::debug!(root = %self.root.display(), config = %self.config.display(), "directories ready");
        Ok(())
    }
}
