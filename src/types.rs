use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated in-memory model of a schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDocument {
    /// Package identifier the bindings belong to
    pub package: String,
    /// Prefix applied to generated binding type names
    pub prefix: String,
    /// Database file name
    pub database: String,
    /// Database schema version
    pub version: u32,
    /// Table definitions in the order listed by `tables`
    pub tables: Vec<TableDefinition>,
}

/// A single table and its columns and indexes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
}

/// A column as declared in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Parsed storage type
    pub column_type: ColumnType,
    /// Type string exactly as written
    pub declared_type: String,
    /// Modifiers parsed from the options clause, in written order
    pub modifiers: Vec<ColumnModifier>,
}

/// Index over one or more columns of the owning table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IndexDefinition {
    pub columns: Vec<String>,
    pub unique: bool,
}

/// Storage types a column can declare
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    /// Variable character with optional length
    Varchar(Option<u32>),
    Text,
    Integer,
    Real,
    Boolean,
    Timestamp,
    /// Well-formed type string whose base name is not known
    Unrecognized(String),
}

/// Closed set of modifiers accepted in an options clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColumnModifier {
    Unique,
    NotNull,
    Default(DefaultValue),
}

/// Classified default-value expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DefaultValue {
    CurrentTimestamp,
    CurrentDate,
    CurrentTime,
    Null,
    Integer(i64),
    /// Non-integer numeric literal, kept as written
    Decimal(String),
    Text(String),
    Boolean(bool),
    /// Well-formed expression that is none of the above
    Expression(String),
}

/// Language-neutral type a binding field carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Text,
    Integer,
    Real,
    Boolean,
    Timestamp,
}

impl SchemaDocument {
    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table names in emission order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

impl TableDefinition {
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Generated index name, `<table>__<col>...__idx`
    pub fn index_name(&self, index: &IndexDefinition) -> String {
        let mut name = self.name.clone();
        for column in &index.columns {
            name.push_str("__");
            name.push_str(column);
        }
        name.push_str("__idx");
        name
    }
}

impl ColumnDefinition {
    pub fn is_unique(&self) -> bool {
        self.modifiers.contains(&ColumnModifier::Unique)
    }

    pub fn is_not_null(&self) -> bool {
        self.modifiers.contains(&ColumnModifier::NotNull)
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.modifiers.iter().find_map(|m| match m {
            ColumnModifier::Default(value) => Some(value),
            _ => None,
        })
    }
}

impl ColumnType {
    /// Convert to SQL type string, `None` for unrecognized types
    pub fn to_sql(&self) -> Option<String> {
        let sql = match self {
            ColumnType::Varchar(Some(len)) => format!("VARCHAR({})", len),
            ColumnType::Varchar(None) => "VARCHAR".to_string(),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Real => "REAL".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Unrecognized(_) => return None,
        };
        Some(sql)
    }

    /// Semantic type for bindings, `None` for unrecognized types
    pub fn semantic(&self) -> Option<SemanticType> {
        match self {
            ColumnType::Varchar(_) | ColumnType::Text => Some(SemanticType::Text),
            ColumnType::Integer => Some(SemanticType::Integer),
            ColumnType::Real => Some(SemanticType::Real),
            ColumnType::Boolean => Some(SemanticType::Boolean),
            ColumnType::Timestamp => Some(SemanticType::Timestamp),
            ColumnType::Unrecognized(_) => None,
        }
    }
}

impl ColumnModifier {
    pub fn to_sql(&self) -> String {
        match self {
            ColumnModifier::Unique => "UNIQUE".to_string(),
            ColumnModifier::NotNull => "NOT NULL".to_string(),
            ColumnModifier::Default(value) => format!("DEFAULT {}", value.to_sql()),
        }
    }
}

impl DefaultValue {
    pub fn to_sql(&self) -> String {
        match self {
            DefaultValue::CurrentTimestamp => "CURRENT_TIMESTAMP".to_string(),
            DefaultValue::CurrentDate => "CURRENT_DATE".to_string(),
            DefaultValue::CurrentTime => "CURRENT_TIME".to_string(),
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Integer(value) => value.to_string(),
            DefaultValue::Decimal(value) => value.clone(),
            DefaultValue::Text(value) => format!("'{}'", value.replace('\'', "''")),
            DefaultValue::Boolean(true) => "TRUE".to_string(),
            DefaultValue::Boolean(false) => "FALSE".to_string(),
            DefaultValue::Expression(expr) => expr.clone(),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Text => "text",
            SemanticType::Integer => "integer",
            SemanticType::Real => "real",
            SemanticType::Boolean => "boolean",
            SemanticType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}
