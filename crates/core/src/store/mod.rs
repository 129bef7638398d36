//! Version Store - persistence for the single current schema version.
//!
//! The store is an abstract capability so the engine can run against a real
//! Postgres database or an in-memory double in tests. "No version recorded
//! yet" is a first-class state (`VersionState::Empty`), never a sentinel
//! integer on this surface.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;

use crate::error::MigrateResult;

/// The stored schema version, or the distinct "nothing applied yet" state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionState {
    /// No version row exists
    Empty,
    /// The version of the most recently applied migration
    Current(i64),
}

impl VersionState {
    pub fn is_empty(&self) -> bool {
        matches!(self, VersionState::Empty)
    }
}

/// Advisory lock held for one Up/Down sequence; released by value so a lock
/// cannot outlive its release call.
#[async_trait]
pub trait StoreLock: Send + Sync {
    async fn release(self: Box<Self>) -> MigrateResult<()>;
}

/// Abstract backing store for the version record and statement execution
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Idempotently create the backing structure for the version record
    async fn ensure_schema(&self) -> MigrateResult<()>;

    /// Read the current version state
    async fn current_version(&self) -> MigrateResult<VersionState>;

    /// Insert or update the version record. Re-setting the stored value is
    /// a no-op, not an error.
    async fn set_version(&self, version: i64) -> MigrateResult<()>;

    /// Execute one migration unit's statements and advance the version
    /// record to `next_version` as a single atomic step.
    async fn apply(&self, version: i64, sql: &str, next_version: i64) -> MigrateResult<()>;

    /// Take the advisory lock guarding a whole Up/Down sequence
    async fn lock(&self) -> MigrateResult<Box<dyn StoreLock>>;
}
