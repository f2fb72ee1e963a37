use std::path::Path;

use serde_json::{Number, Value};

use super::{read_file, write_file, Format, FormatError, KeyValues};

/// Indented JSON object. Numbers load back as floats.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn load(&self, path: &Path) -> Result<KeyValues, FormatError> {
        let contents = read_file(path)?;
        let data: Option<KeyValues> =
            serde_json::from_str(&contents).map_err(|e| FormatError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, floats_only(value)))
            .collect())
    }

    fn save(&self, path: &Path, data: &KeyValues) -> Result<(), FormatError> {
        let contents = serde_json::to_string_pretty(data).map_err(|e| FormatError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        write_file(path, contents)
    }
}

fn floats_only(value: Value) -> Value {
    match value {
        Value::Number(n) => match n.as_f64().and_then(Number::from_f64) {
            Some(f) => Value::Number(f),
            None => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(floats_only).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, floats_only(value)))
                .collect(),
        ),
        other => other,
    }
}
