// Schema model loader: raw JSON document -> SchemaDocument
use crate::error::{SchemaError, SchemagenError, SchemagenResult};
use crate::schema_loader::type_parser::{parse_column_type, parse_options};
use crate::types::{ColumnDefinition, IndexDefinition, SchemaDocument, TableDefinition};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, warn};

const HEADER_KEYS: [&str; 5] = ["package", "prefix", "database", "version", "tables"];
const TABLE_KEYS: [&str; 2] = ["columns", "indexes"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawColumn {
    name: String,
    #[serde(rename = "type")]
    column_type: String,
    #[serde(default)]
    options: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIndex {
    columns: Vec<String>,
    unique: bool,
}

/// Turns an already-parsed document into a [`SchemaDocument`], reporting every
/// structural problem at once
pub struct SchemaLoader {
    default_version: u32,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self { default_version: 1 }
    }

    /// Load a document, returning all structural errors if any are found
    pub fn load(&self, raw: &Value) -> SchemagenResult<SchemaDocument> {
        let mut errors = Vec::new();
        let document = self.load_collecting(raw, &mut errors);

        match document {
            Some(document) if errors.is_empty() => {
                info!(
                    "Loaded schema '{}' with {} table(s)",
                    document.package,
                    document.tables.len()
                );
                Ok(document)
            }
            _ => {
                warn!("Schema document rejected with {} problem(s)", errors.len());
                Err(SchemagenError::Schema(errors))
            }
        }
    }

    fn load_collecting(&self, raw: &Value, errors: &mut Vec<SchemaError>) -> Option<SchemaDocument> {
        let Some(root) = raw.as_object() else {
            errors.push(SchemaError::NotAnObject {
                path: "$".to_string(),
            });
            return None;
        };

        let package = string_field(root, "package", errors);
        let prefix = string_field(root, "prefix", errors);
        if let Some(name) = prefix.as_deref() {
            // An empty prefix is allowed
            if !name.is_empty() && !is_identifier(name) {
                errors.push(SchemaError::InvalidIdentifier {
                    path: "prefix".to_string(),
                    name: name.to_string(),
                });
            }
        }
        let database = string_field(root, "database", errors);
        let version = self.version_field(root, errors);
        let table_names = self.table_list(root, errors);

        for key in root.keys() {
            let listed = table_names
                .as_ref()
                .map_or(false, |names| names.iter().any(|n| n == key));
            if !HEADER_KEYS.contains(&key.as_str()) && !listed {
                errors.push(SchemaError::UnknownKey { path: key.clone() });
            }
        }

        let mut tables = Vec::new();
        for name in table_names.iter().flatten() {
            match root.get(name) {
                Some(value) => {
                    if let Some(table) = self.load_table(name, value, errors) {
                        tables.push(table);
                    }
                }
                None => errors.push(SchemaError::MissingTable {
                    table: name.clone(),
                }),
            }
        }

        Some(SchemaDocument {
            package: package?,
            prefix: prefix?,
            database: database?,
            version: version?,
            tables,
        })
    }

    fn version_field(&self, root: &Map<String, Value>, errors: &mut Vec<SchemaError>) -> Option<u32> {
        match root.get("version") {
            None => Some(self.default_version),
            Some(value) => match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
                Some(version) if version > 0 => Some(version),
                _ => {
                    errors.push(SchemaError::WrongType {
                        path: "version".to_string(),
                        expected: "a positive integer",
                    });
                    None
                }
            },
        }
    }

    fn table_list(&self, root: &Map<String, Value>, errors: &mut Vec<SchemaError>) -> Option<Vec<String>> {
        let Some(value) = root.get("tables") else {
            errors.push(SchemaError::MissingField {
                path: "tables".to_string(),
            });
            return None;
        };
        let Some(items) = value.as_array() else {
            errors.push(SchemaError::WrongType {
                path: "tables".to_string(),
                expected: "an array of table names",
            });
            return None;
        };

        let mut names = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        for (i, item) in items.iter().enumerate() {
            let path = format!("tables[{}]", i);
            let Some(name) = item.as_str() else {
                errors.push(SchemaError::WrongType {
                    path,
                    expected: "a string",
                });
                continue;
            };
            if HEADER_KEYS.contains(&name) || !is_identifier(name) {
                errors.push(SchemaError::InvalidIdentifier {
                    path,
                    name: name.to_string(),
                });
                continue;
            }
            if !seen.insert(name) {
                errors.push(SchemaError::DuplicateTable {
                    table: name.to_string(),
                });
                continue;
            }
            names.push(name.to_string());
        }
        Some(names)
    }

    fn load_table(&self, name: &str, value: &Value, errors: &mut Vec<SchemaError>) -> Option<TableDefinition> {
        let Some(object) = value.as_object() else {
            errors.push(SchemaError::WrongType {
                path: name.to_string(),
                expected: "a table definition object",
            });
            return None;
        };

        for key in object.keys() {
            if !TABLE_KEYS.contains(&key.as_str()) {
                errors.push(SchemaError::UnknownKey {
                    path: format!("{}.{}", name, key),
                });
            }
        }

        let columns = match object.get("columns") {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| self.load_column(name, i, item, errors))
                .collect(),
            Some(_) => {
                errors.push(SchemaError::WrongType {
                    path: format!("{}.columns", name),
                    expected: "an array of columns",
                });
                Vec::new()
            }
            None => {
                errors.push(SchemaError::MissingField {
                    path: format!("{}.columns", name),
                });
                Vec::new()
            }
        };

        let indexes = match object.get("indexes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    let path = format!("{}.indexes[{}]", name, i);
                    deserialize_at::<RawIndex>(&path, item, errors).map(|raw| IndexDefinition {
                        columns: raw.columns,
                        unique: raw.unique,
                    })
                })
                .collect(),
            Some(_) => {
                errors.push(SchemaError::WrongType {
                    path: format!("{}.indexes", name),
                    expected: "an array of indexes",
                });
                Vec::new()
            }
        };

        debug!(
            "Table '{}': {} column(s), {} index(es)",
            name,
            columns.len(),
            indexes.len()
        );

        Some(TableDefinition {
            name: name.to_string(),
            columns,
            indexes,
        })
    }

    fn load_column(
        &self,
        table: &str,
        position: usize,
        value: &Value,
        errors: &mut Vec<SchemaError>,
    ) -> Option<ColumnDefinition> {
        let path = format!("{}.columns[{}]", table, position);
        let raw = deserialize_at::<RawColumn>(&path, value, errors)?;

        let mut valid = true;
        if !is_identifier(&raw.name) {
            errors.push(SchemaError::InvalidIdentifier {
                path: format!("{}.name", path),
                name: raw.name.clone(),
            });
            valid = false;
        }

        let column_type = match parse_column_type(&raw.column_type) {
            Ok(column_type) => Some(column_type),
            Err(reason) => {
                errors.push(SchemaError::MalformedType {
                    table: table.to_string(),
                    column: raw.name.clone(),
                    declared: raw.column_type.clone(),
                    reason,
                });
                None
            }
        };

        let modifiers = match raw.options.as_deref().map(parse_options).transpose() {
            Ok(modifiers) => Some(modifiers.unwrap_or_default()),
            Err(reason) => {
                errors.push(SchemaError::MalformedOptions {
                    table: table.to_string(),
                    column: raw.name.clone(),
                    options: raw.options.clone().unwrap_or_default(),
                    reason,
                });
                None
            }
        };

        if !valid {
            return None;
        }
        Some(ColumnDefinition {
            name: raw.name,
            column_type: column_type?,
            declared_type: raw.column_type,
            modifiers: modifiers?,
        })
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn string_field(root: &Map<String, Value>, key: &str, errors: &mut Vec<SchemaError>) -> Option<String> {
    match root.get(key) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            errors.push(SchemaError::WrongType {
                path: key.to_string(),
                expected: "a string",
            });
            None
        }
        None => {
            errors.push(SchemaError::MissingField {
                path: key.to_string(),
            });
            None
        }
    }
}

fn deserialize_at<T: for<'de> Deserialize<'de>>(
    path: &str,
    value: &Value,
    errors: &mut Vec<SchemaError>,
) -> Option<T> {
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(SchemaError::Malformed {
                path: path.to_string(),
                message: e.to_string(),
            });
            None
        }
    }
}

/// Plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
