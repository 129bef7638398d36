//! In-memory version store for tests.
//!
//! Records every executed SQL body and supports failure injection: any
//! statement containing [`MemoryStore::FAILURE_MARKER`] fails as
//! `ExecutionFailed` without touching the stored version.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{MigrateError, MigrateResult};
use crate::store::{SchemaStore, StoreLock, VersionState};

#[derive(Debug, Default)]
struct MemoryState {
    schema_ready: bool,
    version: Option<i64>,
    executed: Vec<String>,
}

/// Test double for [`SchemaStore`]; cheap to clone, shared state inside.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Statements containing this marker fail instead of executing
    pub const FAILURE_MARKER: &'static str = "--inject-failure";

    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a version already recorded
    pub fn with_version(version: i64) -> Self {
        let store = Self::new();
        store.state.lock().unwrap().version = Some(version);
        store
    }

    /// Every SQL body executed so far, in order
    pub fn executed_sql(&self) -> Vec<String> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn stored_version(&self) -> Option<i64> {
        self.state.lock().unwrap().version
    }

    pub fn schema_ready(&self) -> bool {
        self.state.lock().unwrap().schema_ready
    }
}

#[async_trait]
impl SchemaStore for MemoryStore {
    async fn ensure_schema(&self) -> MigrateResult<()> {
        self.state.lock().unwrap().schema_ready = true;
        Ok(())
    }

    async fn current_version(&self) -> MigrateResult<VersionState> {
        Ok(match self.state.lock().unwrap().version {
            Some(version) => VersionState::Current(version),
            None => VersionState::Empty,
        })
    }

    async fn set_version(&self, version: i64) -> MigrateResult<()> {
        self.state.lock().unwrap().version = Some(version);
        Ok(())
    }

    async fn apply(&self, version: i64, sql: &str, next_version: i64) -> MigrateResult<()> {
        if sql.contains(Self::FAILURE_MARKER) {
            return Err(MigrateError::ExecutionFailed {
                version,
                message: "injected failure".to_string(),
            });
        }
        let mut state = self.state.lock().unwrap();
        state.executed.push(sql.to_string());
        state.version = Some(next_version);
        Ok(())
    }

    async fn lock(&self) -> MigrateResult<Box<dyn StoreLock>> {
        Ok(Box::new(NoopLock))
    }
}

struct NoopLock;

#[async_trait]
impl StoreLock for NoopLock {
    async fn release(self: Box<Self>) -> MigrateResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_reports_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.current_version().await.unwrap(), VersionState::Empty);
    }

    #[tokio::test]
    async fn apply_records_sql_and_advances_version() {
        let store = MemoryStore::new();
        store.apply(3, "CREATE TABLE t(id int);", 3).await.unwrap();

        assert_eq!(store.executed_sql(), vec!["CREATE TABLE t(id int);"]);
        assert_eq!(
            store.current_version().await.unwrap(),
            VersionState::Current(3)
        );
    }

    #[tokio::test]
    async fn injected_failure_leaves_state_untouched() {
        let store = MemoryStore::with_version(1);
        let err = store
            .apply(2, "--inject-failure\nDROP TABLE t;", 2)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MigrateError::ExecutionFailed { version: 2, .. }
        ));
        assert_eq!(store.stored_version(), Some(1));
        assert!(store.executed_sql().is_empty());
    }

    #[tokio::test]
    async fn set_version_is_idempotent() {
        let store = MemoryStore::new();
        store.set_version(7).await.unwrap();
        store.set_version(7).await.unwrap();
        assert_eq!(store.stored_version(), Some(7));
    }
}
