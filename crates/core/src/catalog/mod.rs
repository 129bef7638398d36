//! Migration Catalog - the directory-derived set of migration units.
//!
//! The catalog holds no state of its own: every listing re-reads the
//! directory, so the view is always current. Listing is fail-fast — one
//! malformed file name aborts the whole listing rather than silently
//! skipping a migration.

mod parse;
mod scaffold;

pub use scaffold::TemplateKind;

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::MigrationConfig;
use crate::error::{MigrateError, MigrateResult};

/// Direction of a migration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply the schema change
    Up,
    /// Revert the schema change
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Metadata for one migration unit on disk. The SQL body is read lazily at
/// execution time via [`MigrationUnit::read_sql`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationUnit {
    /// Numeric version parsed from the file name (typically a timestamp)
    pub version: i64,
    /// Human-readable name, the part after the version token
    pub name: String,
    pub direction: Direction,
    pub path: PathBuf,
}

impl MigrationUnit {
    /// Load the unit's SQL body from disk
    pub fn read_sql(&self) -> MigrateResult<String> {
        fs::read_to_string(&self.path).map_err(|e| {
            MigrateError::catalog(format!("Failed to read {}: {}", self.path.display(), e))
        })
    }
}

/// Live view over the migration directory
#[derive(Debug, Clone)]
pub struct MigrationCatalog {
    config: MigrationConfig,
}

impl MigrationCatalog {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// List every migration unit in the directory, ordered ascending by
    /// `(version, direction)`. Fails with `CatalogUnreadable` if the
    /// directory cannot be listed, `MalformedUnitName` on the first bad
    /// version token, and `DuplicateVersion` if two units share a version
    /// and a direction.
    pub fn list_units(&self) -> MigrateResult<Vec<MigrationUnit>> {
        let entries = fs::read_dir(&self.config.directory).map_err(|e| {
            MigrateError::catalog(format!(
                "Failed to read migration directory {}: {}",
                self.config.directory.display(),
                e
            ))
        })?;

        let mut units = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| MigrateError::catalog(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(parsed) = parse::parse_unit_name(file_name)? {
                units.push(MigrationUnit {
                    version: parsed.version,
                    name: parsed.name,
                    direction: parsed.direction,
                    path,
                });
            }
        }

        units.sort_by_key(|u| (u.version, u.direction));
        for pair in units.windows(2) {
            if pair[0].version == pair[1].version && pair[0].direction == pair[1].direction {
                return Err(MigrateError::DuplicateVersion {
                    version: pair[0].version,
                    direction: pair[0].direction.to_string(),
                });
            }
        }

        Ok(units)
    }

    /// Scaffold a new migration unit (pair for SQL, single file for code)
    /// into the directory; returns the created paths.
    pub fn create_unit(&self, name: &str, kind: TemplateKind) -> MigrateResult<Vec<PathBuf>> {
        scaffold::create_unit(&self.config.directory, name, kind)
    }
}
