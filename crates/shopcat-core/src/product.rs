//! Product records
//!
//! Storage-layer product documents reduced to the four fields the classifier
//! reads. Documents arrive as loosely typed JSON, so every field is resolved
//! through an ordered alias list and anything absent or non-string collapses
//! to an empty string.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ShopcatError};

pub const DEFAULT_ID_FIELDS: &[&str] = &["_id", "id"];
pub const DEFAULT_NAME_FIELDS: &[&str] = &["name", "Name", "title"];
pub const DEFAULT_BRAND_FIELDS: &[&str] = &["brand"];
pub const DEFAULT_CATEGORY_FIELDS: &[&str] = &["category"];

/// Keys that carry the record list inside a pagination envelope
const ENVELOPE_KEYS: &[&str] = &["items", "products", "data"];

/// Ordered candidate keys for each product field.
///
/// The first key holding a non-empty string wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases {
    pub id: Vec<String>,
    pub name: Vec<String>,
    pub brand: Vec<String>,
    pub category: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            id: to_owned_list(DEFAULT_ID_FIELDS),
            name: to_owned_list(DEFAULT_NAME_FIELDS),
            brand: to_owned_list(DEFAULT_BRAND_FIELDS),
            category: to_owned_list(DEFAULT_CATEGORY_FIELDS),
        }
    }
}

impl FieldAliases {
    /// First non-empty string value among `keys`
    pub fn resolve<'a>(keys: &[String], value: &'a Value) -> Option<&'a str> {
        keys.iter()
            .filter_map(|key| value.get(key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }

    /// Identity is opaque: strings, numbers and `{"$oid": ...}` are accepted.
    fn resolve_id(&self, value: &Value) -> Option<String> {
        self.id.iter().find_map(|key| match value.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(map) => map
                .get("$oid")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
    }

    /// Build a record from an arbitrary JSON value.
    ///
    /// Non-object values produce an empty record.
    pub fn record(&self, value: &Value) -> ProductRecord {
        let field = |keys: &[String]| Self::resolve(keys, value).unwrap_or_default().to_string();

        ProductRecord {
            id: self.resolve_id(value),
            name: field(self.name.as_slice()),
            brand: field(self.brand.as_slice()),
            category: field(self.category.as_slice()),
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A product as seen by the classifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ProductRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub brand: String,
    /// Stored category, possibly wrong or misspelled
    pub category: String,
}

impl From<Value> for ProductRecord {
    fn from(value: Value) -> Self {
        FieldAliases::default().record(&value)
    }
}

impl ProductRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn has_category(&self) -> bool {
        !self.category.is_empty()
    }
}

/// Layout of a product export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// A JSON array, or an object wrapping one under `items`/`products`/`data`
    #[default]
    Json,
    /// One JSON document per line
    JsonLines,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") | Some("ndjson") => Self::JsonLines,
            _ => Self::Json,
        }
    }
}

/// Load products from a file, picking the format from its extension.
pub fn load_products(path: &Path, aliases: &FieldAliases) -> Result<Vec<ProductRecord>> {
    if !path.exists() {
        return Err(ShopcatError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = fs::File::open(path)?;
    read_products(file, path, InputFormat::from_path(path), aliases)
}

/// Read products from any reader. `source` only labels errors.
pub fn read_products<R: Read>(
    mut reader: R,
    source: &Path,
    format: InputFormat,
    aliases: &FieldAliases,
) -> Result<Vec<ProductRecord>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    parse_products(&content, format, aliases).map_err(|message| ShopcatError::InvalidInput {
        path: source.to_path_buf(),
        message,
    })
}

fn parse_products(
    content: &str,
    format: InputFormat,
    aliases: &FieldAliases,
) -> std::result::Result<Vec<ProductRecord>, String> {
    match format {
        InputFormat::Json => {
            let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
            let items = match &value {
                Value::Array(items) => items,
                Value::Object(map) => ENVELOPE_KEYS
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_array))
                    .ok_or_else(|| {
                        format!(
                            "expected an array or an object with one of: {}",
                            ENVELOPE_KEYS.join(", ")
                        )
                    })?,
                _ => return Err("expected a JSON array or object".to_string()),
            };
            Ok(items.iter().map(|item| aliases.record(item)).collect())
        }
        InputFormat::JsonLines => content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<Value>(line)
                    .map(|value| aliases.record(&value))
                    .map_err(|e| format!("line {}: {}", idx + 1, e))
            })
            .collect(),
    }
}
