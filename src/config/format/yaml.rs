use std::path::Path;

use super::{read_file, write_file, Format, FormatError, KeyValues};

/// Plain YAML mapping. Whole numbers load back as integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFormat;

impl Format for YamlFormat {
    fn load(&self, path: &Path) -> Result<KeyValues, FormatError> {
        let contents = read_file(path)?;
        let data: Option<KeyValues> =
            serde_yaml::from_str(&contents).map_err(|e| FormatError::Yaml {
                path: path.to_path_buf(),
                source: e,
            })?;
        Ok(data.unwrap_or_default())
    }

    fn save(&self, path: &Path, data: &KeyValues) -> Result<(), FormatError> {
        let contents = serde_yaml::to_string(data).map_err(|e| FormatError::Yaml {
            path: path.to_path_buf(),
            source: e,
        })?;
        write_file(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.yaml");
        let data = KeyValues::from([
            ("key1".to_string(), json!("value1")),
            ("key2".to_string(), json!(123.5)),
            ("key3".to_string(), json!(true)),
            ("hosts".to_string(), json!(["a", "b"])),
        ]);

        YamlFormat.save(&path, &data).unwrap();

        assert_eq!(YamlFormat.load(&path).unwrap(), data);
    }

    #[test]
    fn test_whole_numbers_load_as_integers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.yml");
        std::fs::write(&path, "host: localhost\nport: 8080\n").unwrap();

        let loaded = YamlFormat.load(&path).unwrap();

        assert_eq!(loaded["host"], json!("localhost"));
        assert_eq!(loaded["port"], json!(8080));
        assert!(loaded["port"].is_i64());
    }

    #[test]
    fn test_malformed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "key: [unclosed").unwrap();

        assert!(matches!(YamlFormat.load(&path), Err(FormatError::Yaml { .. })));
    }
}
