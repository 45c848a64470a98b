// Cross-reference and naming checks over a loaded schema
use crate::bindings::naming;
use crate::error::{SchemagenError, SchemagenResult, ValidationError};
use crate::types::{
    ColumnDefinition, ColumnType, DefaultValue, IndexDefinition, SchemaDocument, TableDefinition,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Validates a [`SchemaDocument`] before any artifact is emitted
pub struct SchemaValidator {
    /// Column the emitter adds to every table, which documents may not declare
    row_id_column: Option<String>,
    /// Suffix of generated column-constants types, checked for name clashes
    columns_suffix: String,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self {
            row_id_column: None,
            columns_suffix: "Columns".to_string(),
        }
    }

    /// Reserve `name` for the implicit row-id column
    pub fn with_row_id_column(name: impl Into<String>) -> Self {
        Self {
            row_id_column: Some(name.into()),
            ..Self::new()
        }
    }

    pub fn with_columns_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.columns_suffix = suffix.into();
        self
    }

    /// Run every check, failing with the complete list of violations
    pub fn validate(&self, document: &SchemaDocument) -> SchemagenResult<()> {
        let violations = self.collect_violations(document);
        if violations.is_empty() {
            info!("Schema '{}' passed validation", document.package);
            Ok(())
        } else {
            warn!(
                "Schema '{}' failed validation with {} violation(s)",
                document.package,
                violations.len()
            );
            Err(SchemagenError::Validation(violations))
        }
    }

    pub fn collect_violations(&self, document: &SchemaDocument) -> Vec<ValidationError> {
        let mut violations = Vec::new();
        for table in &document.tables {
            debug!("Validating table '{}'", table.name);
            self.check_columns(table, &mut violations);
            self.check_indexes(table, &mut violations);
            check_field_names(table, &mut violations);
            for column in &table.columns {
                check_default(table, column, &mut violations);
            }
        }
        self.check_table_names(document, &mut violations);
        violations
    }

    /// Generated type names and route constants must be unique per document
    fn check_table_names(&self, document: &SchemaDocument, violations: &mut Vec<ValidationError>) {
        let mut types = NameClaims::new("tables", "type name");
        let mut routes = NameClaims::new("tables", "route constant");
        for table in &document.tables {
            let name = table.name.as_str();
            types.claim(naming::type_name(&document.prefix, name), name, violations);
            types.claim(
                naming::columns_type_name(&document.prefix, name, &self.columns_suffix),
                name,
                violations,
            );
            routes.claim(naming::collection_constant(name), name, violations);
            routes.claim(naming::item_constant(name), name, violations);
        }
    }

    fn check_columns(&self, table: &TableDefinition, violations: &mut Vec<ValidationError>) {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for column in &table.columns {
            if self.row_id_column.as_deref() == Some(column.name.as_str()) {
                violations.push(ValidationError::ReservedColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                });
            }
            if !seen.insert(column.name.as_str()) && reported.insert(column.name.as_str()) {
                violations.push(ValidationError::DuplicateColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                });
            }
        }
    }

    fn check_indexes(&self, table: &TableDefinition, violations: &mut Vec<ValidationError>) {
        let columns: HashSet<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        let mut by_shape: HashMap<&IndexDefinition, usize> = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (position, index) in table.indexes.iter().enumerate() {
            if index.columns.is_empty() {
                violations.push(ValidationError::EmptyIndex {
                    table: table.name.clone(),
                    position,
                });
                continue;
            }

            let mut in_index = HashSet::new();
            for column in &index.columns {
                if !columns.contains(column.as_str()) {
                    violations.push(ValidationError::UnknownIndexColumn {
                        table: table.name.clone(),
                        position,
                        column: column.clone(),
                    });
                }
                if !in_index.insert(column.as_str()) {
                    violations.push(ValidationError::RepeatedIndexColumn {
                        table: table.name.clone(),
                        position,
                        column: column.clone(),
                    });
                }
            }

            if let Some(&first) = by_shape.get(index) {
                violations.push(ValidationError::DuplicateIndex {
                    table: table.name.clone(),
                    position,
                    first,
                    columns: index.columns.join(", "),
                });
                continue;
            }
            by_shape.insert(index, position);

            let name = table.index_name(index);
            if let Some(&first) = by_name.get(&name) {
                violations.push(ValidationError::IndexNameCollision {
                    table: table.name.clone(),
                    position,
                    first,
                    name,
                });
            } else {
                by_name.insert(name, position);
            }
        }
    }
}

/// Constants and accessors must be unique within a table
fn check_field_names(table: &TableDefinition, violations: &mut Vec<ValidationError>) {
    let mut constants = NameClaims::new(&table.name, "constant");
    let mut accessors = NameClaims::new(&table.name, "accessor");
    for column in &table.columns {
        let name = column.name.as_str();
        constants.claim(naming::constant_name(name), name, violations);
        accessors.claim(naming::accessor_name(name), name, violations);
    }
}

/// First owner of each derived name within one namespace
struct NameClaims<'a> {
    scope: &'a str,
    kind: &'static str,
    owners: HashMap<String, &'a str>,
}

impl<'a> NameClaims<'a> {
    fn new(scope: &'a str, kind: &'static str) -> Self {
        Self {
            scope,
            kind,
            owners: HashMap::new(),
        }
    }

    fn claim(&mut self, name: String, owner: &'a str, violations: &mut Vec<ValidationError>) {
        match self.owners.get(&name) {
            // Repeated declarations are reported as duplicates elsewhere
            Some(&first) if first == owner => {}
            Some(&first) => violations.push(ValidationError::BindingNameCollision {
                scope: self.scope.to_string(),
                kind: self.kind,
                name,
                first: first.to_string(),
                second: owner.to_string(),
            }),
            None => {
                self.owners.insert(name, owner);
            }
        }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_default(table: &TableDefinition, column: &ColumnDefinition, violations: &mut Vec<ValidationError>) {
    let Some(default) = column.default_value() else {
        return;
    };
    if !default_fits(&column.column_type, default) {
        violations.push(ValidationError::IncompatibleDefault {
            table: table.name.clone(),
            column: column.name.clone(),
            declared: column.declared_type.clone(),
            default: default.to_sql(),
        });
    }
}

/// Whether `default` is a well-formed default for a column of `column_type`
pub fn default_fits(column_type: &ColumnType, default: &DefaultValue) -> bool {
    if matches!(default, DefaultValue::Null) {
        return true;
    }
    match column_type {
        ColumnType::Timestamp => match default {
            DefaultValue::CurrentTimestamp | DefaultValue::CurrentDate => true,
            DefaultValue::Text(text) => is_timestamp_literal(text),
            _ => false,
        },
        ColumnType::Integer => matches!(default, DefaultValue::Integer(_) | DefaultValue::Boolean(_)),
        ColumnType::Real => matches!(default, DefaultValue::Integer(_) | DefaultValue::Decimal(_)),
        ColumnType::Boolean => matches!(
            default,
            DefaultValue::Boolean(_) | DefaultValue::Integer(0) | DefaultValue::Integer(1)
        ),
        ColumnType::Text => matches!(default, DefaultValue::Text(_)) || clock_text_len(default).is_some(),
        ColumnType::Varchar(limit) => {
            let len = match default {
                DefaultValue::Text(text) => text.chars().count(),
                _ => match clock_text_len(default) {
                    Some(len) => len,
                    None => return false,
                },
            };
            limit.map_or(true, |max| len <= max as usize)
        }
        // The type itself is reported by the emitters
        ColumnType::Unrecognized(_) => true,
    }
}

/// Length of the text SQLite stores for a `CURRENT_*` default
fn clock_text_len(default: &DefaultValue) -> Option<usize> {
    match default {
        DefaultValue::CurrentTimestamp => Some("YYYY-MM-DD HH:MM:SS".len()),
        DefaultValue::CurrentDate => Some("YYYY-MM-DD".len()),
        DefaultValue::CurrentTime => Some("HH:MM:SS".len()),
        _ => None,
    }
}

fn is_timestamp_literal(text: &str) -> bool {
    TIMESTAMP_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
        || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}
