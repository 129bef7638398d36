//! Migration Engine - orchestrates Up/Down/Create over the catalog and the
//! version store.
//!
//! `init` is the only constructor: it bootstraps the version table and reads
//! the current version, so every engine value is ready by construction and
//! an empty store is a valid starting state, not an error.
//!
//! Every Up/Down sequence runs under the store's advisory lock. The first
//! failing unit halts the sequence; units applied before it keep their
//! version record (each unit's execute + version write is one atomic step in
//! the store).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::catalog::{Direction, MigrationCatalog, TemplateKind};
use crate::error::{MigrateError, MigrateResult};
use crate::store::{SchemaStore, VersionState};

/// External scaffolding capability behind `generate`; a black box to the
/// engine, invoked once per model name.
pub trait ModelGenerator: Send + Sync {
    fn generate_model(&self, model: &str, output_path: &Path) -> MigrateResult<PathBuf>;
}

/// Outcome of an `up` run
#[derive(Debug)]
pub struct UpResult {
    /// Versions applied, in the order they ran
    pub applied: Vec<i64>,
    pub execution_time_ms: u128,
}

/// Outcome of a `down` run
#[derive(Debug)]
pub struct DownResult {
    /// The version that was undone, or `None` when there was nothing to undo
    pub reverted: Option<i64>,
    pub execution_time_ms: u128,
}

/// Outcome of a `redo` run
#[derive(Debug)]
pub struct RedoResult {
    pub down: DownResult,
    pub up: UpResult,
}

/// One up unit with its applied/pending flag, for `status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub version: i64,
    pub name: String,
    pub applied: bool,
}

pub struct MigrationEngine {
    store: Arc<dyn SchemaStore>,
    catalog: MigrationCatalog,
    generator: Arc<dyn ModelGenerator>,
}

impl MigrationEngine {
    /// Bootstrap the version store and construct a ready engine.
    pub async fn init(
        store: Arc<dyn SchemaStore>,
        catalog: MigrationCatalog,
        generator: Arc<dyn ModelGenerator>,
    ) -> MigrateResult<Self> {
        store.ensure_schema().await?;
        match store.current_version().await? {
            VersionState::Empty => tracing::info!("No schema version recorded yet"),
            VersionState::Current(version) => {
                tracing::info!(version, "Current schema version")
            }
        }

        Ok(Self {
            store,
            catalog,
            generator,
        })
    }

    /// Apply every pending up unit in ascending version order. Zero pending
    /// units is success.
    pub async fn up(&self) -> MigrateResult<UpResult> {
        let guard = self.store.lock().await?;
        let outcome = self.run_up().await;
        let released = guard.release().await;
        let result = outcome?;
        released?;
        Ok(result)
    }

    async fn run_up(&self) -> MigrateResult<UpResult> {
        let start = Instant::now();

        // Empty compares as -1 so every real version is eligible; the
        // sentinel never leaves this function.
        let current = match self.store.current_version().await? {
            VersionState::Empty => -1,
            VersionState::Current(version) => version,
        };

        let pending: Vec<_> = self
            .catalog
            .list_units()?
            .into_iter()
            .filter(|u| u.direction == Direction::Up && u.version > current)
            .collect();

        let mut applied = Vec::new();
        for unit in &pending {
            tracing::info!(version = unit.version, name = %unit.name, "Applying migration");
            let sql = unit.read_sql()?;
            self.store.apply(unit.version, &sql, unit.version).await?;
            applied.push(unit.version);
        }

        Ok(UpResult {
            applied,
            execution_time_ms: start.elapsed().as_millis(),
        })
    }

    /// Undo the single migration matching the current version. An empty
    /// store is a no-op success; a recorded version with no matching down
    /// unit is `NothingToUndo`.
    pub async fn down(&self) -> MigrateResult<DownResult> {
        let guard = self.store.lock().await?;
        let outcome = self.run_down().await;
        let released = guard.release().await;
        let result = outcome?;
        released?;
        Ok(result)
    }

    async fn run_down(&self) -> MigrateResult<DownResult> {
        let start = Instant::now();

        let current = match self.store.current_version().await? {
            VersionState::Empty => {
                return Ok(DownResult {
                    reverted: None,
                    execution_time_ms: start.elapsed().as_millis(),
                })
            }
            VersionState::Current(version) => version,
        };

        let unit = self
            .catalog
            .list_units()?
            .into_iter()
            .find(|u| u.direction == Direction::Down && u.version == current)
            .ok_or(MigrateError::NothingToUndo { version: current })?;

        tracing::info!(version = unit.version, name = %unit.name, "Reverting migration");
        let sql = unit.read_sql()?;
        self.store.apply(unit.version, &sql, current - 1).await?;

        Ok(DownResult {
            reverted: Some(current),
            execution_time_ms: start.elapsed().as_millis(),
        })
    }

    /// One step back, then forward again
    pub async fn redo(&self) -> MigrateResult<RedoResult> {
        let down = self.down().await?;
        let up = self.up().await?;
        Ok(RedoResult { down, up })
    }

    /// Declared in the contract but intentionally unsupported
    pub async fn undo(&self) -> MigrateResult<()> {
        Err(MigrateError::Unsupported {
            operation: "undo".to_string(),
        })
    }

    /// Current version state, straight from the store
    pub async fn version(&self) -> MigrateResult<VersionState> {
        self.store.current_version().await
    }

    /// Scaffold a new migration unit; returns the created paths
    pub fn create(&self, name: &str, kind: TemplateKind) -> MigrateResult<Vec<PathBuf>> {
        self.catalog.create_unit(name, kind)
    }

    /// Run the injected model generator once per model name
    pub fn generate(&self, models: &[String], output_path: &Path) -> MigrateResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        for model in models {
            let path = self.generator.generate_model(model, output_path)?;
            tracing::info!(model = %model, path = %path.display(), "Generated model");
            written.push(path);
        }
        Ok(written)
    }

    /// Every up unit with an applied flag derived from the current version
    pub async fn status(&self) -> MigrateResult<Vec<StatusEntry>> {
        let current = self.store.current_version().await?;
        let entries = self
            .catalog
            .list_units()?
            .into_iter()
            .filter(|u| u.direction == Direction::Up)
            .map(|u| StatusEntry {
                version: u.version,
                name: u.name,
                applied: matches!(current, VersionState::Current(c) if u.version <= c),
            })
            .collect();
        Ok(entries)
    }
}
