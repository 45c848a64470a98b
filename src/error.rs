use serde::Serialize;
use thiserror::Error;

/// Structural problem found while loading a raw schema document
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchemaError {
    #[error("{path}: document root must be an object")]
    NotAnObject { path: String },

    #[error("{path}: missing required field")]
    MissingField { path: String },

    #[error("{path}: expected {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("{path}: unknown key")]
    UnknownKey { path: String },

    #[error("{path}: {message}")]
    Malformed { path: String, message: String },

    #[error("table '{table}' is listed in 'tables' but has no definition")]
    MissingTable { table: String },

    #[error("table '{table}' is listed more than once in 'tables'")]
    DuplicateTable { table: String },

    #[error("{path}: '{name}' is not a valid identifier")]
    InvalidIdentifier { path: String, name: String },

    #[error("{table}.{column}: malformed type '{declared}': {reason}")]
    MalformedType {
        table: String,
        column: String,
        declared: String,
        reason: String,
    },

    #[error("{table}.{column}: malformed options '{options}': {reason}")]
    MalformedOptions {
        table: String,
        column: String,
        options: String,
        reason: String,
    },
}

/// Cross-reference or uniqueness violation found in a loaded document
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("{table}: column '{column}' is declared more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("{table}: column '{column}' is reserved for the row id")]
    ReservedColumn { table: String, column: String },

    #[error("{table}: index #{position} has no columns")]
    EmptyIndex { table: String, position: usize },

    #[error("{table}: index #{position} references unknown column '{column}'")]
    UnknownIndexColumn {
        table: String,
        position: usize,
        column: String,
    },

    #[error("{table}: index #{position} repeats column '{column}'")]
    RepeatedIndexColumn {
        table: String,
        position: usize,
        column: String,
    },

    #[error("{table}: index #{position} duplicates index #{first} ({columns})")]
    DuplicateIndex {
        table: String,
        position: usize,
        first: usize,
        columns: String,
    },

    #[error("{table}: index #{position} and index #{first} would both be named '{name}'")]
    IndexNameCollision {
        table: String,
        position: usize,
        first: usize,
        name: String,
    },

    #[error("{scope}: '{first}' and '{second}' both bind to {kind} '{name}'")]
    BindingNameCollision {
        scope: String,
        kind: &'static str,
        name: String,
        first: String,
        second: String,
    },

    #[error("{table}.{column}: default {default} is not valid for type {declared}")]
    IncompatibleDefault {
        table: String,
        column: String,
        declared: String,
        default: String,
    },
}

/// Column whose declared type has no known mapping
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{table}.{column}: no mapping for declared type '{declared}'")]
pub struct TypeMappingError {
    pub table: String,
    pub column: String,
    pub declared: String,
}

/// Main error type for the generator
#[derive(Error, Debug)]
pub enum SchemagenError {
    #[error("schema document has {} structural problem(s)", .0.len())]
    Schema(Vec<SchemaError>),

    #[error("schema failed validation with {} problem(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("{} column type(s) could not be mapped", .0.len())]
    TypeMapping(Vec<TypeMappingError>),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SchemagenResult<T> = Result<T, SchemagenError>;

impl SchemagenError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Every individual problem carried by this error, one line each
    pub fn problems(&self) -> Vec<String> {
        match self {
            Self::Schema(errors) => errors.iter().map(ToString::to_string).collect(),
            Self::Validation(errors) => errors.iter().map(ToString::to_string).collect(),
            Self::TypeMapping(errors) => errors.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }

    /// Failure report for `source`: a summary line, then one indented line per problem
    pub fn report(&self, source: &str) -> String {
        let mut report = format!("{}: {}\n", source, self);
        if matches!(self, Self::Schema(_) | Self::Validation(_) | Self::TypeMapping(_)) {
            for problem in self.problems() {
                report.push_str(&format!("  - {}\n", problem));
            }
        }
        report
    }
}
