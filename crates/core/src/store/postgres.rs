//! Postgres-backed version store.
//!
//! One row (`id = 1`) in the version table holds the current schema version
//! as a BIGINT. Each migration unit is applied inside a single transaction
//! together with the version upsert, and the whole Up/Down sequence runs
//! under a session-scoped advisory lock, so concurrent invocations cannot
//! interleave.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{PgPool, Postgres};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::config::DatabaseConfig;
use crate::error::{MigrateError, MigrateResult};
use crate::store::{SchemaStore, StoreLock, VersionState};

/// Key for `pg_advisory_lock`, shared by every invocation against the same
/// database.
const ADVISORY_LOCK_KEY: i64 = 0x72756e_6773; // "rungs"

pub struct PostgresStore {
    pool: PgPool,
    table: String,
}

impl PostgresStore {
    /// Connect with bounded retries and fixed backoff; exhausting the
    /// attempts yields `StoreUnavailable`.
    pub async fn connect(config: &DatabaseConfig, table: &str) -> MigrateResult<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let mut last_error = String::new();
        for attempt in 1..=config.connect_attempts {
            match PgPoolOptions::new()
                .max_connections(5)
                .connect_with(options.clone())
                .await
            {
                Ok(pool) => {
                    tracing::debug!(url = %config.masked_url(), "Connected to database");
                    return Ok(Self {
                        pool,
                        table: table.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = config.connect_attempts,
                        url = %config.masked_url(),
                        "Connection attempt failed: {}",
                        e
                    );
                    last_error = e.to_string();
                    if attempt < config.connect_attempts {
                        tokio::time::sleep(config.connect_backoff).await;
                    }
                }
            }
        }

        Err(MigrateError::StoreUnavailable {
            attempts: config.connect_attempts,
            message: last_error,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id INT PRIMARY KEY, version BIGINT NOT NULL);",
            self.table
        )
    }

    fn select_version_sql(&self) -> String {
        format!("SELECT version FROM {} WHERE id = 1", self.table)
    }

    /// Single-statement upsert, atomic with respect to concurrent writers;
    /// re-setting the stored value is a harmless no-op update.
    fn upsert_version_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id, version) VALUES (1, $1) \
             ON CONFLICT (id) DO UPDATE SET version = EXCLUDED.version;",
            self.table
        )
    }
}

#[async_trait]
impl SchemaStore for PostgresStore {
    async fn ensure_schema(&self) -> MigrateResult<()> {
        sqlx::query(&self.create_table_sql())
            .execute(&self.pool)
            .await
            .map_err(|e| MigrateError::store(format!("Failed to create version table: {}", e)))?;
        Ok(())
    }

    async fn current_version(&self) -> MigrateResult<VersionState> {
        let row: Option<i64> = sqlx::query_scalar(&self.select_version_sql())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MigrateError::store(format!("Failed to read current version: {}", e)))?;

        Ok(match row {
            Some(version) => VersionState::Current(version),
            None => VersionState::Empty,
        })
    }

    async fn set_version(&self, version: i64) -> MigrateResult<()> {
        sqlx::query(&self.upsert_version_sql())
            .bind(version)
            .execute(&self.pool)
            .await
            .map_err(|e| MigrateError::store(format!("Failed to set version {}: {}", version, e)))?;
        Ok(())
    }

    async fn apply(&self, version: i64, sql: &str, next_version: i64) -> MigrateResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|e| MigrateError::store(format!("Failed to start transaction: {}", e)))?;

        for statement in split_sql_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *transaction)
                .await
                .map_err(|e| MigrateError::ExecutionFailed {
                    version,
                    message: e.to_string(),
                })?;
        }

        sqlx::query(&self.upsert_version_sql())
            .bind(next_version)
            .execute(&mut *transaction)
            .await
            .map_err(|e| {
                MigrateError::store(format!("Failed to record version {}: {}", next_version, e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| MigrateError::store(format!("Failed to commit migration: {}", e)))?;

        Ok(())
    }

    async fn lock(&self) -> MigrateResult<Box<dyn StoreLock>> {
        // Dedicated connection: the advisory lock is session-scoped and must
        // stay on the same session until release.
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| MigrateError::store(format!("Failed to acquire lock connection: {}", e)))?;

        sqlx::query("SELECT pg_advisory_lock($1)")
            .bind(ADVISORY_LOCK_KEY)
            .execute(&mut *conn)
            .await
            .map_err(|e| MigrateError::store(format!("Failed to take advisory lock: {}", e)))?;

        Ok(Box::new(PgAdvisoryLock { conn }))
    }
}

struct PgAdvisoryLock {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl StoreLock for PgAdvisoryLock {
    async fn release(mut self: Box<Self>) -> MigrateResult<()> {
        sqlx::query("SELECT pg_advisory_unlock($1)")
            .bind(ADVISORY_LOCK_KEY)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| MigrateError::store(format!("Failed to release advisory lock: {}", e)))?;
        Ok(())
    }
}

/// Split a migration body into individual statements using proper SQL
/// parsing, falling back to naive semicolon splitting when the dialect
/// defeats the parser.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let dialect = GenericDialect {};
    match Parser::parse_sql(&dialect, sql) {
        Ok(parsed) => parsed.iter().map(|stmt| format!("{};", stmt)).collect(),
        Err(e) => {
            tracing::warn!("SQL parsing failed, using naive semicolon splitting: {}", e);
            sql.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| format!("{};", s))
                .collect()
        }
    }
}
