use crate::bindings::BindingConfig;
use crate::ddl::DdlConfig;
use crate::error::{SchemagenError, SchemagenResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Configuration for a whole generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub ddl: DdlConfig,
    pub bindings: BindingConfig,
}

impl GeneratorConfig {
    /// Read a JSON configuration file
    pub fn from_file(path: &Path) -> SchemagenResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| SchemagenError::config(format!("{}: {}", path.display(), e)))?;
        config.check()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject settings the emitters cannot honour
    pub fn check(&self) -> SchemagenResult<()> {
        if let Some(row_id) = &self.ddl.row_id_column {
            if !crate::schema_loader::is_identifier(row_id) {
                return Err(SchemagenError::config(format!(
                    "row id column '{}' is not a valid identifier",
                    row_id
                )));
            }
        }
        let suffix = &self.bindings.columns_suffix;
        if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SchemagenError::config(format!(
                "columns suffix '{}' must be non-empty letters, digits or underscores",
                suffix
            )));
        }
        if self.bindings.authority_suffix.is_empty() {
            return Err(SchemagenError::config("authority suffix must not be empty"));
        }
        Ok(())
    }
}
