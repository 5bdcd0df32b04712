//! Property file formats and format dispatch
//!
//! Every reader turns the raw bytes of one file into a flat
//! `ConfigProperties` map. Hierarchical formats are only meaningful at
//! their top level.

use std::collections::HashMap;
use std::path::Path;

use crate::config::SeedConfig;
use crate::error::{ConfigSeedError, Result};
use crate::seed::properties;

/// Flat key/value pairs read from one file.
pub type ConfigProperties = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Properties,
    Yaml,
    Toml,
}

/// Extension of `path` including the leading dot, or `""` when it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Maps file extensions to formats using the configured extension lists.
#[derive(Debug, Clone)]
pub struct FormatResolver {
    acceptable: Vec<String>,
    yaml: Vec<String>,
    toml: Vec<String>,
}

impl FormatResolver {
    pub fn new(acceptable: Vec<String>, yaml: Vec<String>, toml: Vec<String>) -> Self {
        Self {
            acceptable,
            yaml,
            toml,
        }
    }

    pub fn from_config(config: &SeedConfig) -> Self {
        Self::new(
            config.acceptable_property_extensions.clone(),
            config.yaml_extensions.clone(),
            config.toml_extensions.clone(),
        )
    }

    /// Whether files with this extension are imported at all.
    pub fn is_acceptable(&self, path: &Path) -> bool {
        let ext = extension_of(path);
        self.acceptable.iter().any(|v| *v == ext)
    }

    /// TOML wins over YAML; anything else is read as properties.
    pub fn resolve(&self, path: &Path) -> FileFormat {
        let ext = extension_of(path);
        if self.toml.iter().any(|v| *v == ext) {
            FileFormat::Toml
        } else if self.yaml.iter().any(|v| *v == ext) {
            FileFormat::Yaml
        } else {
            FileFormat::Properties
        }
    }

    /// Read `path` and parse it with the reader its extension selects.
    pub async fn read_file(&self, path: &Path) -> Result<ConfigProperties> {
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| ConfigSeedError::missing_file(path, e))?;

        read_bytes(self.resolve(path), &contents)
            .map_err(|message| ConfigSeedError::parse(path, message))
    }
}

pub fn read_bytes(
    format: FileFormat,
    contents: &[u8],
) -> std::result::Result<ConfigProperties, String> {
    match format {
        FileFormat::Properties => read_properties(contents),
        FileFormat::Yaml => read_yaml(contents),
        FileFormat::Toml => read_toml(contents),
    }
}

pub fn read_properties(contents: &[u8]) -> std::result::Result<ConfigProperties, String> {
    let text = std::str::from_utf8(contents).map_err(|e| format!("invalid UTF-8: {}", e))?;
    properties::parse(text).map_err(|e| e.to_string())
}

pub fn read_yaml(contents: &[u8]) -> std::result::Result<ConfigProperties, String> {
    let document: serde_yaml::Value =
        serde_yaml::from_slice(contents).map_err(|e| e.to_string())?;

    let mapping = match document {
        serde_yaml::Value::Null => return Ok(ConfigProperties::new()),
        serde_yaml::Value::Mapping(mapping) => mapping,
        other => {
            return Err(format!(
                "expected a mapping at the top level, found {}",
                yaml_type_name(&other)
            ))
        }
    };

    let mut props = ConfigProperties::with_capacity(mapping.len());
    for (key, value) in mapping {
        props.insert(yaml_to_string(&key), yaml_to_string(&value));
    }
    Ok(props)
}

fn yaml_type_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

fn yaml_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Tagged(tagged) => yaml_to_string(&tagged.value),
        // nested structures are flattened to JSON text
        nested => serde_json::to_string(nested).unwrap_or_default(),
    }
}

// Works only while the TOML stays simple key/value; nested tables are rejected.
pub fn read_toml(contents: &[u8]) -> std::result::Result<ConfigProperties, String> {
    let text = std::str::from_utf8(contents).map_err(|e| format!("invalid UTF-8: {}", e))?;
    let table: toml::Table = text.parse().map_err(|e: toml::de::Error| e.to_string())?;

    let mut props = ConfigProperties::with_capacity(table.len());
    for (key, value) in table {
        let value = match value {
            toml::Value::String(s) => s,
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Datetime(dt) => dt.to_string(),
            array @ toml::Value::Array(_) => array.to_string(),
            toml::Value::Table(_) => {
                return Err(format!(
                    "key '{}' holds a table; only flat key/value TOML is supported",
                    key
                ))
            }
        };
        props.insert(key, value);
    }
    Ok(props)
}
