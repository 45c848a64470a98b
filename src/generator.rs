// Loader -> validation -> DDL and bindings
use crate::bindings::{BindingGenerator, BindingSet};
use crate::config::GeneratorConfig;
use crate::ddl::{DdlGenerator, GeneratedDdl};
use crate::error::{SchemagenError, SchemagenResult, TypeMappingError};
use crate::schema_loader::{SchemaLoader, SchemaValidator};
use crate::types::SchemaDocument;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{info, warn};

/// Everything derived from one schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifacts {
    pub document: SchemaDocument,
    pub ddl: GeneratedDdl,
    pub upgrade: GeneratedDdl,
    pub bindings: BindingSet,
}

/// Runs the full generation pipeline for a configuration
pub struct SchemaGenerator {
    config: GeneratorConfig,
    loader: SchemaLoader,
    validator: SchemaValidator,
    ddl: DdlGenerator,
    bindings: BindingGenerator,
}

impl SchemaGenerator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        let validator = match &config.ddl.row_id_column {
            Some(row_id) => SchemaValidator::with_row_id_column(row_id.clone()),
            None => SchemaValidator::new(),
        }
        .with_columns_suffix(config.bindings.columns_suffix.clone());
        Self {
            loader: SchemaLoader::new(),
            validator,
            ddl: DdlGenerator::with_config(config.ddl.clone()),
            bindings: BindingGenerator::with_config(config.bindings.clone()),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Load and validate without emitting anything
    pub fn check(&self, raw: &Value) -> SchemagenResult<SchemaDocument> {
        let document = self.loader.load(raw)?;
        self.validator.validate(&document)?;
        Ok(document)
    }

    /// Load, validate, then emit DDL and bindings.
    ///
    /// DDL and bindings are both attempted; their type mapping errors are
    /// merged so each offending column is reported once.
    pub fn generate(&self, raw: &Value) -> SchemagenResult<GeneratedArtifacts> {
        let document = self.check(raw)?;
        self.generate_from(document)
    }

    pub fn generate_from(&self, document: SchemaDocument) -> SchemagenResult<GeneratedArtifacts> {
        let row_id = self.config.ddl.row_id_column.as_deref();
        let ddl = self.ddl.generate_ddl(&document);
        let bindings = self.bindings.generate_bindings(&document, row_id);

        match (ddl, bindings) {
            (Ok(ddl), Ok(bindings)) => {
                let upgrade = self.ddl.generate_upgrade(&document)?;
                info!(
                    "Generated artifacts for '{}': {} statement(s), {} binding(s)",
                    document.package,
                    ddl.statements.len(),
                    bindings.tables.len()
                );
                Ok(GeneratedArtifacts {
                    document,
                    ddl,
                    upgrade,
                    bindings,
                })
            }
            (ddl, bindings) => {
                let mut unmapped = Vec::new();
                for result in [ddl.err(), bindings.err()].into_iter().flatten() {
                    match result {
                        SchemagenError::TypeMapping(errors) => unmapped.extend(errors),
                        other => return Err(other),
                    }
                }
                let unmapped = dedup_by_column(unmapped);
                warn!("{} column type(s) could not be mapped", unmapped.len());
                Err(SchemagenError::TypeMapping(unmapped))
            }
        }
    }

    /// Generate independent documents in parallel, keeping input order
    pub fn generate_many<K>(&self, inputs: &[(K, Value)]) -> Vec<(K, SchemagenResult<GeneratedArtifacts>)>
    where
        K: Clone + Send + Sync,
    {
        inputs
            .par_iter()
            .map(|(key, raw)| (key.clone(), self.generate(raw)))
            .collect()
    }
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn dedup_by_column(errors: Vec<TypeMappingError>) -> Vec<TypeMappingError> {
    let mut seen = HashSet::new();
    errors
        .into_iter()
        .filter(|e| seen.insert((e.table.clone(), e.column.clone())))
        .collect()
}
