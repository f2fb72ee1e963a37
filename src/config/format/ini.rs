use std::path::Path;

use ::ini::{EscapePolicy, Ini};
use serde_json::Value;

use super::{read_file, stringify, Format, FormatError, KeyValues};

/// Name reported for keys that live outside any `[section]`.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// INI file where `section.key` maps to `key` under `[section]`.
///
/// Keys without a dot are written before the first section header and load
/// back as `DEFAULT.<key>`. All values are stored as strings.
///
/// Reserved characters (`=`, `:`, `;`, `#` and backslash) are escaped on save.
/// Loading trims whitespace around values and strips one pair of surrounding
/// quotes, so `"  sp  "` comes back as `sp` and `"\"q\""` as `q`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniFormat;

impl Format for IniFormat {
    fn load(&self, path: &Path) -> Result<KeyValues, FormatError> {
        let contents = read_file(path)?;
        let ini = Ini::load_from_str(&contents).map_err(|e| FormatError::Ini {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut result = KeyValues::new();
        for (section, properties) in &ini {
            let section = section.unwrap_or(DEFAULT_SECTION);
            for (name, value) in properties.iter() {
                result.insert(format!("{section}.{name}"), Value::String(value.to_string()));
            }
        }
        Ok(result)
    }

    fn save(&self, path: &Path, data: &KeyValues) -> Result<(), FormatError> {
        let mut ini = Ini::new();
        for (key, value) in data {
            let value = stringify(value);
            match key.split_once('.') {
                Some((section, name)) if section != DEFAULT_SECTION => {
                    ini.with_section(Some(section)).set(name, value);
                }
                Some((_, name)) => {
                    ini.with_general_section().set(name, value);
                }
                None => {
                    ini.with_general_section().set(key.as_str(), value);
                }
            }
        }

        ini.write_to_file_policy(path, EscapePolicy::Reserved)
            .map_err(|e| FormatError::Write {
                path: path.to_path_buf(),
                source: e,
            })?;
        tracing::trace!(path = %path.display(), "wrote key-value file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sectionless_keys_gain_default_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.ini");
        let data = KeyValues::from([
            ("key1".to_string(), json!("value1")),
            ("key2".to_string(), json!(123.0)),
            ("key3".to_string(), json!(true)),
        ]);

        IniFormat.save(&path, &data).unwrap();

        let expected = KeyValues::from([
            ("DEFAULT.key1".to_string(), json!("value1")),
            ("DEFAULT.key2".to_string(), json!("123")),
            ("DEFAULT.key3".to_string(), json!("true")),
        ]);
        assert_eq!(IniFormat.load(&path).unwrap(), expected);
    }

    #[test]
    fn test_dotted_keys_become_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.ini");
        let data = KeyValues::from([
            ("database.host".to_string(), json!("localhost")),
            ("database.port".to_string(), json!(5432)),
            ("cache.ttl.seconds".to_string(), json!(60)),
        ]);

        IniFormat.save(&path, &data).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[database]"));
        assert!(contents.contains("[cache]"));

        let loaded = IniFormat.load(&path).unwrap();
        assert_eq!(loaded["database.host"], json!("localhost"));
        assert_eq!(loaded["database.port"], json!("5432"));
        assert_eq!(loaded["cache.ttl.seconds"], json!("60"));
    }

    #[test]
    fn test_reserved_characters_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reserved.ini");
        let data = KeyValues::from([
            ("s.k=x".to_string(), json!("v")),
            ("s.url".to_string(), json!("http://host:80/#top")),
            ("note".to_string(), json!("a;b#c")),
        ]);

        IniFormat.save(&path, &data).unwrap();

        let expected = KeyValues::from([
            ("s.k=x".to_string(), json!("v")),
            ("s.url".to_string(), json!("http://host:80/#top")),
            ("DEFAULT.note".to_string(), json!("a;b#c")),
        ]);
        assert_eq!(IniFormat.load(&path).unwrap(), expected);
    }

    #[test]
    fn test_explicit_default_section_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("again.ini");
        let data = KeyValues::from([("DEFAULT.name".to_string(), json!("demo"))]);

        IniFormat.save(&path, &data).unwrap();

        assert_eq!(IniFormat.load(&path).unwrap(), data);
    }
}
