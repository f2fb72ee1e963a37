use std::path::PathBuf;
use thiserror::Error;

use super::format::FormatError;
use super::settings::ValueKind;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("could not resolve user home directory")]
    HomeDirUnavailable,

    #[error("could not resolve platform {0} directory")]
    PlatformDirUnavailable(&'static str),

    #[error("could not create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize '{name}': {source}")]
    SerializeError {
        name: String,
        source: serde_json::Error,
    },

    #[error("key '{0}' not found in config")]
    KeyNotFound(String),

    #[error("type mismatch for key '{key}': expected {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error(transparent)]
    Format(#[from] FormatError),
}
