use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{read_file, stringify, write_file, Format, FormatError, KeyValues};

/// `<config>` root holding one `<entry>` per key. All values are stored as
/// strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormat;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "config")]
struct XmlDocument {
    #[serde(rename = "entry", default)]
    entries: Vec<XmlEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlEntry {
    key: String,
    #[serde(default)]
    value: String,
}

impl Format for XmlFormat {
    fn load(&self, path: &Path) -> Result<KeyValues, FormatError> {
        let contents = read_file(path)?;
        let document: XmlDocument =
            quick_xml::de::from_str(&contents).map_err(|e| FormatError::XmlDecode {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(document
            .entries
            .into_iter()
            .map(|entry| (entry.key, Value::String(entry.value)))
            .collect())
    }

    fn save(&self, path: &Path, data: &KeyValues) -> Result<(), FormatError> {
        let document = XmlDocument {
            entries: data
                .iter()
                .map(|(key, value)| XmlEntry {
                    key: key.clone(),
                    value: stringify(value),
                })
                .collect(),
        };

        let encode_error = |e| FormatError::XmlEncode {
            path: path.to_path_buf(),
            source: e,
        };
        let mut contents = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut contents);
        serializer.indent(' ', 2);
        document.serialize(serializer).map_err(encode_error)?;

        write_file(path, contents)
    }
}
