use std::fs;
use std::path::Path;

use rungs_core::{MigrateError, MigrateResult};

/// Writes generated files, creating parent directories and skipping writes
/// that would not change the file.
#[derive(Debug, Default)]
pub struct CodeWriter;

impl CodeWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_if_changed(&self, path: &Path, content: &str) -> MigrateResult<()> {
        let write_failed = |e: std::io::Error| MigrateError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        if path.exists() {
            let existing = fs::read_to_string(path).map_err(write_failed)?;
            if existing == content {
                return Ok(());
            }
        }

        fs::write(path, content).map_err(write_failed)
    }
}
