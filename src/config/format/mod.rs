//! Pluggable on-disk syntaxes for schema-less key-value data.
//!
//! Every adapter reads and writes a flat [`KeyValues`] mapping. Only JSON and
//! YAML keep scalar types; INI and XML store every value in its string form:
//!
//! | format | loaded values                                             |
//! |--------|-----------------------------------------------------------|
//! | JSON   | numbers always come back as floats                        |
//! | YAML   | whole numbers come back as integers                       |
//! | INI    | strings; section-less keys come back as `DEFAULT.<key>`   |
//! | XML    | strings                                                   |

mod ini;
mod json;
mod xml;
mod yaml;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

pub use self::ini::IniFormat;
pub use self::json::JsonFormat;
pub use self::xml::XmlFormat;
pub use self::yaml::YamlFormat;

/// An open-ended mapping from string key to untyped value.
pub type KeyValues = BTreeMap<String, Value>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid YAML in '{path}': {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid INI in '{path}': {source}")]
    Ini {
        path: PathBuf,
        source: ::ini::ParseError,
    },

    #[error("invalid XML in '{path}': {source}")]
    XmlDecode {
        path: PathBuf,
        source: quick_xml::de::DeError,
    },

    #[error("failed to encode XML for '{path}': {source}")]
    XmlEncode {
        path: PathBuf,
        source: quick_xml::se::SeError,
    },
}

/// Loads and saves a [`KeyValues`] mapping in one on-disk syntax.
pub trait Format: Send + Sync + fmt::Debug {
    fn load(&self, path: &Path) -> Result<KeyValues, FormatError>;

    fn save(&self, path: &Path, data: &KeyValues) -> Result<(), FormatError>;
}

/// The supported syntaxes, as chosen by [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Json,
    Yaml,
    Ini,
    Xml,
}

impl Format for FormatKind {
    fn load(&self, path: &Path) -> Result<KeyValues, FormatError> {
        match self {
            FormatKind::Json => JsonFormat.load(path),
            FormatKind::Yaml => YamlFormat.load(path),
            FormatKind::Ini => IniFormat.load(path),
            FormatKind::Xml => XmlFormat.load(path),
        }
    }

    fn save(&self, path: &Path, data: &KeyValues) -> Result<(), FormatError> {
        match self {
            FormatKind::Json => JsonFormat.save(path, data),
            FormatKind::Yaml => YamlFormat.save(path, data),
            FormatKind::Ini => IniFormat.save(path, data),
            FormatKind::Xml => XmlFormat.save(path, data),
        }
    }
}

/// Picks the format for `file_name` from its extension, ignoring case.
///
/// The extension starts at the last `.` of the final path component, so a
/// bare dotfile such as `.json` counts as JSON.
pub fn resolve(file_name: impl AsRef<Path>) -> Result<FormatKind, FormatError> {
    let ext = file_name
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rfind('.').map(|dot| name[dot..].to_lowercase()))
        .unwrap_or_default();

    match ext.as_str() {
        ".json" => Ok(FormatKind::Json),
        ".yaml" | ".yml" => Ok(FormatKind::Yaml),
        ".ini" => Ok(FormatKind::Ini),
        ".xml" => Ok(FormatKind::Xml),
        _ => Err(FormatError::UnsupportedFormat(ext)),
    }
}

fn read_file(path: &Path) -> Result<String, FormatError> {
    std::fs::read_to_string(path).map_err(|e| FormatError::Read {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), FormatError> {
    std::fs::write(path, contents).map_err(|e| FormatError::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::trace!(path = %path.display(), "wrote key-value file");
    Ok(())
}

/// Renders a value the way the string-only formats store it.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_known_extensions() {
        assert_eq!(resolve("config.json").unwrap(), FormatKind::Json);
        assert_eq!(resolve("config.yaml").unwrap(), FormatKind::Yaml);
        assert_eq!(resolve("config.yml").unwrap(), FormatKind::Yaml);
        assert_eq!(resolve("config.ini").unwrap(), FormatKind::Ini);
        assert_eq!(resolve("config.xml").unwrap(), FormatKind::Xml);
    }

    #[test]
    fn test_resolve_ignores_case() {
        assert_eq!(resolve("DB.JSON").unwrap(), FormatKind::Json);
        assert_eq!(resolve("db.YmL").unwrap(), FormatKind::Yaml);
        assert_eq!(resolve("nested/dir/app.Ini").unwrap(), FormatKind::Ini);
        assert_eq!(resolve("feed.XML").unwrap(), FormatKind::Xml);
    }

    #[test]
    fn test_resolve_dotfiles() {
        assert_eq!(resolve(".json").unwrap(), FormatKind::Json);
        assert_eq!(resolve("conf/.YML").unwrap(), FormatKind::Yaml);
        assert!(matches!(&resolve("config.").unwrap_err(), FormatError::UnsupportedFormat(ext) if ext == "."));
    }

    #[test]
    fn test_resolve_rejects_unknown_extensions() {
        let err = resolve("config.txt").unwrap_err();
        assert!(matches!(&err, FormatError::UnsupportedFormat(ext) if ext == ".txt"));
        assert_eq!(err.to_string(), "unsupported config format: .txt");

        assert!(matches!(resolve("config.toml"), Err(FormatError::UnsupportedFormat(_))));
        assert!(matches!(resolve("config"), Err(FormatError::UnsupportedFormat(_))));
        assert!(matches!(resolve(""), Err(FormatError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("value1")), "value1");
        assert_eq!(stringify(&json!(123.0)), "123");
        assert_eq!(stringify(&json!(1.5)), "1.5");
        assert_eq!(stringify(&json!(-7)), "-7");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&Value::Null), "");
        assert_eq!(stringify(&json!(["a", 1])), r#"["a",1]"#);
    }

    #[test]
    fn test_format_kind_dispatches_to_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.yml");
        let data = KeyValues::from([("port".to_string(), json!(8080))]);

        let kind = resolve(&path).unwrap();
        kind.save(&path, &data).unwrap();

        assert_eq!(kind.load(&path).unwrap(), data);
    }
}
