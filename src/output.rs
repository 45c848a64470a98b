// Writing generated artifacts to disk
use crate::error::{SchemagenError, SchemagenResult};
use crate::generator::GeneratedArtifacts;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the DDL, upgrade script and bindings of one document
pub struct ArtifactWriter {
    output_directory: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_directory: impl Into<PathBuf>) -> Self {
        Self {
            output_directory: output_directory.into(),
        }
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Write `<stem>.sql`, `<stem>.upgrade.sql` and `<stem>.bindings.json`
    pub fn write(&self, stem: &str, artifacts: &GeneratedArtifacts) -> SchemagenResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_directory)?;

        let ddl_path = self.output_directory.join(format!("{}.sql", stem));
        fs::write(&ddl_path, artifacts.ddl.to_string())?;

        let upgrade_path = self.output_directory.join(format!("{}.upgrade.sql", stem));
        fs::write(&upgrade_path, artifacts.upgrade.to_string())?;

        let bindings_path = self.output_directory.join(format!("{}.bindings.json", stem));
        let mut bindings = serde_json::to_string_pretty(&artifacts.bindings)?;
        bindings.push('\n');
        fs::write(&bindings_path, bindings)?;

        info!("Wrote artifacts for '{}' to {}", stem, self.output_directory.display());
        Ok(vec![ddl_path, upgrade_path, bindings_path])
    }
}

/// Output file stem for each input, rejecting stems that are not UTF-8 or
/// that two inputs share
pub fn artifact_stems(inputs: &[PathBuf]) -> SchemagenResult<Vec<String>> {
    let mut owners: HashMap<&str, &Path> = HashMap::new();
    let mut stems = Vec::with_capacity(inputs.len());

    for input in inputs {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                SchemagenError::output(format!("{}: no UTF-8 file name to name artifacts after", input.display()))
            })?;
        if let Some(first) = owners.insert(stem, input) {
            return Err(SchemagenError::output(format!(
                "{} and {} would both write '{}' artifacts",
                first.display(),
                input.display(),
                stem
            )));
        }
        stems.push(stem.to_string());
    }

    Ok(stems)
}
