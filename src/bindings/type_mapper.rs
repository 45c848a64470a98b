use crate::error::TypeMappingError;
use crate::types::{ColumnDefinition, SemanticType};

/// Maps declared column types to the semantic types bindings expose
pub struct SemanticTypeMapper;

impl SemanticTypeMapper {
    pub fn new() -> Self {
        Self
    }

    /// Map one column, naming it in the error when its type is unknown
    pub fn map_column(&self, table: &str, column: &ColumnDefinition) -> Result<SemanticType, TypeMappingError> {
        column.column_type.semantic().ok_or_else(|| TypeMappingError {
            table: table.to_string(),
            column: column.name.clone(),
            declared: column.declared_type.clone(),
        })
    }
}

impl Default for SemanticTypeMapper {
    fn default() -> Self {
        Self::new()
    }
}
