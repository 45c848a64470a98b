use crate::bindings::naming;
use crate::bindings::type_mapper::SemanticTypeMapper;
use crate::error::{SchemagenError, SchemagenResult, TypeMappingError};
use crate::types::{SchemaDocument, SemanticType, TableDefinition};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for binding generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingConfig {
    /// Suffix of the per-table column-constants type
    pub columns_suffix: String,
    /// Appended to the package to form the content authority
    pub authority_suffix: String,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            columns_suffix: "Columns".to_string(),
            authority_suffix: "contentprovider".to_string(),
        }
    }
}

/// Bindings for a whole document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingSet {
    pub package: String,
    pub database: String,
    pub version: u32,
    pub row_id_column: Option<String>,
    /// Content authority shared by every table route
    pub authority: String,
    pub tables: Vec<TableBinding>,
}

/// Record type and column constants for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableBinding {
    pub table: String,
    /// Prefix followed by the capitalized table name
    pub type_name: String,
    pub columns_type_name: String,
    pub route: ContentRoute,
    pub fields: Vec<FieldBinding>,
}

/// Content URI routing for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRoute {
    /// Path segment under the authority, `<table>s`
    pub path: String,
    pub content_uri: String,
    /// MIME type of a cursor over the whole table
    pub dir_type: String,
    /// MIME type of a cursor over one row
    pub item_type: String,
    pub collection_constant: String,
    pub collection_code: u32,
    pub item_constant: String,
    pub item_code: u32,
}

/// One record field, in column declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    /// Column name as declared
    pub column: String,
    /// Upper-cased constant holding the column name
    pub constant: String,
    /// Camel-case accessor name
    pub accessor: String,
    pub semantic_type: SemanticType,
    pub unique: bool,
    pub has_default: bool,
}

impl TableBinding {
    pub fn field(&self, column: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|f| f.column == column)
    }
}

/// Produces typed binding descriptors; knows nothing about SQL
pub struct BindingGenerator {
    config: BindingConfig,
    mapper: SemanticTypeMapper,
}

impl BindingGenerator {
    pub fn new() -> Self {
        Self::with_config(BindingConfig::default())
    }

    pub fn with_config(config: BindingConfig) -> Self {
        Self {
            config,
            mapper: SemanticTypeMapper::new(),
        }
    }

    /// Build bindings for every table, or every column that has no mapping
    pub fn generate_bindings(
        &self,
        document: &SchemaDocument,
        row_id_column: Option<&str>,
    ) -> SchemagenResult<BindingSet> {
        let authority = naming::authority(&document.package, &self.config.authority_suffix);
        let mut tables = Vec::with_capacity(document.tables.len());
        let mut unmapped = Vec::new();

        for (position, table) in document.tables.iter().enumerate() {
            match self.table_binding(&document.prefix, &authority, position, table) {
                Ok(binding) => tables.push(binding),
                Err(errors) => unmapped.extend(errors),
            }
        }

        if !unmapped.is_empty() {
            return Err(SchemagenError::TypeMapping(unmapped));
        }

        info!("Generated bindings for {} table(s) under {}", tables.len(), authority);
        Ok(BindingSet {
            package: document.package.clone(),
            database: document.database.clone(),
            version: document.version,
            row_id_column: row_id_column.map(str::to_string),
            authority,
            tables,
        })
    }

    pub fn table_binding(
        &self,
        prefix: &str,
        authority: &str,
        position: usize,
        table: &TableDefinition,
    ) -> Result<TableBinding, Vec<TypeMappingError>> {
        let mut fields = Vec::with_capacity(table.columns.len());
        let mut unmapped = Vec::new();

        for column in &table.columns {
            match self.mapper.map_column(&table.name, column) {
                Ok(semantic_type) => fields.push(FieldBinding {
                    column: column.name.clone(),
                    constant: naming::constant_name(&column.name),
                    accessor: naming::accessor_name(&column.name),
                    semantic_type,
                    unique: column.is_unique(),
                    has_default: column.default_value().is_some(),
                }),
                Err(error) => unmapped.push(error),
            }
        }

        if !unmapped.is_empty() {
            return Err(unmapped);
        }

        let type_name = naming::type_name(prefix, &table.name);
        debug!("Table '{}' bound as {}", table.name, type_name);
        Ok(TableBinding {
            table: table.name.clone(),
            columns_type_name: naming::columns_type_name(prefix, &table.name, &self.config.columns_suffix),
            type_name,
            route: content_route(authority, position, &table.name),
            fields,
        })
    }
}

impl Default for BindingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn content_route(authority: &str, position: usize, table: &str) -> ContentRoute {
    let path = naming::content_path(table);
    let (collection_code, item_code) = naming::route_codes(position);
    ContentRoute {
        content_uri: format!("content://{}/{}", authority, path),
        dir_type: format!("{}/{}", naming::CURSOR_DIR_BASE_TYPE, path),
        item_type: format!("{}/{}", naming::CURSOR_ITEM_BASE_TYPE, table),
        collection_constant: naming::collection_constant(table),
        collection_code,
        item_constant: naming::item_constant(table),
        item_code,
        path,
    }
}
