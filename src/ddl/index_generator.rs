use crate::ddl::ddl_generator::{quote_identifier, DdlStatement, StatementType};
use crate::types::TableDefinition;

/// Renders the declared indexes of a table
pub struct IndexGenerator {
    if_not_exists: bool,
}

impl IndexGenerator {
    pub fn new(if_not_exists: bool) -> Self {
        Self { if_not_exists }
    }

    /// Generate CREATE INDEX statements in declaration order
    pub fn create_statements(&self, table: &TableDefinition) -> Vec<DdlStatement> {
        let if_not_exists = if self.if_not_exists { "IF NOT EXISTS " } else { "" };

        table
            .indexes
            .iter()
            .map(|index| {
                let unique_clause = if index.unique { "UNIQUE " } else { "" };
                let columns: Vec<String> = index.columns.iter().map(|c| quote_identifier(c)).collect();
                let sql = format!(
                    "CREATE {}INDEX {}{} ON {} ({});",
                    unique_clause,
                    if_not_exists,
                    quote_identifier(&table.index_name(index)),
                    quote_identifier(&table.name),
                    columns.join(", ")
                );
                DdlStatement {
                    sql,
                    table_name: table.name.clone(),
                    statement_type: StatementType::CreateIndex,
                }
            })
            .collect()
    }

    pub fn drop_statements(&self, table: &TableDefinition) -> Vec<DdlStatement> {
        table
            .indexes
            .iter()
            .map(|index| DdlStatement {
                sql: format!("DROP INDEX IF EXISTS {};", quote_identifier(&table.index_name(index))),
                table_name: table.name.clone(),
                statement_type: StatementType::DropIndex,
            })
            .collect()
    }
}
