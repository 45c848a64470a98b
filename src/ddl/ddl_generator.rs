use crate::ddl::index_generator::IndexGenerator;
use crate::error::{SchemagenError, SchemagenResult, TypeMappingError};
use crate::types::{SchemaDocument, TableDefinition};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Configuration for DDL emission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DdlConfig {
    /// Implicit `<name> INTEGER PRIMARY KEY` column prepended to every table
    pub row_id_column: Option<String>,
    /// Emit `IF NOT EXISTS` on CREATE statements
    pub if_not_exists: bool,
}

/// Type of DDL statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatementType {
    CreateTable,
    CreateIndex,
    DropTable,
    DropIndex,
}

/// A single DDL statement with the table it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DdlStatement {
    pub sql: String,
    pub table_name: String,
    pub statement_type: StatementType,
}

/// Ordered DDL for a whole document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedDdl {
    pub statements: Vec<DdlStatement>,
}

impl GeneratedDdl {
    /// Statement text in emission order
    pub fn all_statements(&self) -> Vec<String> {
        self.statements.iter().map(|s| s.sql.clone()).collect()
    }

    pub fn statements_for(&self, table: &str) -> impl Iterator<Item = &DdlStatement> + '_ {
        let table = table.to_string();
        self.statements.iter().filter(move |s| s.table_name == table)
    }
}

impl fmt::Display for GeneratedDdl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement.sql)?;
        }
        Ok(())
    }
}

/// Renders CREATE/DROP statements from a schema document
pub struct DdlGenerator {
    config: DdlConfig,
    indexes: IndexGenerator,
}

impl DdlGenerator {
    /// Create a new DDL generator with default configuration
    pub fn new() -> Self {
        Self::with_config(DdlConfig::default())
    }

    /// Create a new DDL generator with custom configuration
    pub fn with_config(config: DdlConfig) -> Self {
        let indexes = IndexGenerator::new(config.if_not_exists);
        Self { config, indexes }
    }

    pub fn config(&self) -> &DdlConfig {
        &self.config
    }

    /// CREATE TABLE followed by its CREATE INDEX statements, table by table.
    ///
    /// Columns whose type has no SQL rendering are all reported together.
    pub fn generate_ddl(&self, document: &SchemaDocument) -> SchemagenResult<GeneratedDdl> {
        let mut statements = Vec::new();
        let mut unmapped = Vec::new();

        for table in &document.tables {
            match self.create_table_statement(table) {
                Ok(statement) => statements.push(statement),
                Err(errors) => unmapped.extend(errors),
            }
            statements.extend(self.indexes.create_statements(table));
        }

        if !unmapped.is_empty() {
            return Err(SchemagenError::TypeMapping(unmapped));
        }

        info!(
            "Generated {} DDL statement(s) for {} table(s)",
            statements.len(),
            document.tables.len()
        );
        Ok(GeneratedDdl { statements })
    }

    /// DROP TABLE then DROP INDEX for each table, in document order
    pub fn generate_drop(&self, document: &SchemaDocument) -> GeneratedDdl {
        let mut statements = Vec::new();
        for table in &document.tables {
            statements.push(DdlStatement {
                sql: format!("DROP TABLE IF EXISTS {};", quote_identifier(&table.name)),
                table_name: table.name.clone(),
                statement_type: StatementType::DropTable,
            });
            statements.extend(self.indexes.drop_statements(table));
        }
        GeneratedDdl { statements }
    }

    /// Drop everything, then recreate it
    pub fn generate_upgrade(&self, document: &SchemaDocument) -> SchemagenResult<GeneratedDdl> {
        let create = self.generate_ddl(document)?;
        let mut upgrade = self.generate_drop(document);
        upgrade.statements.extend(create.statements);
        Ok(upgrade)
    }

    /// Generate CREATE TABLE statement for a table definition
    pub fn create_table_statement(&self, table: &TableDefinition) -> Result<DdlStatement, Vec<TypeMappingError>> {
        let mut column_definitions = Vec::with_capacity(table.columns.len() + 1);
        let mut unmapped = Vec::new();

        if let Some(row_id) = &self.config.row_id_column {
            column_definitions.push(format!("  {} INTEGER PRIMARY KEY", quote_identifier(row_id)));
        }

        for column in &table.columns {
            let Some(sql_type) = column.column_type.to_sql() else {
                unmapped.push(TypeMappingError {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    declared: column.declared_type.clone(),
                });
                continue;
            };

            let mut column_def = format!("  {} {}", quote_identifier(&column.name), sql_type);
            for modifier in &column.modifiers {
                column_def.push(' ');
                column_def.push_str(&modifier.to_sql());
            }
            column_definitions.push(column_def);
        }

        if !unmapped.is_empty() {
            return Err(unmapped);
        }

        let if_not_exists = if self.config.if_not_exists { "IF NOT EXISTS " } else { "" };
        let sql = format!(
            "CREATE TABLE {}{} (\n{}\n);",
            if_not_exists,
            quote_identifier(&table.name),
            column_definitions.join(",\n")
        );
        debug!("Rendered CREATE TABLE for '{}'", table.name);

        Ok(DdlStatement {
            sql,
            table_name: table.name.clone(),
            statement_type: StatementType::CreateTable,
        })
    }
}

impl Default for DdlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Double-quote an identifier so keywords such as `group` stay valid names
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
