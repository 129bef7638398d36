//! Error taxonomy for the migration engine.
//!
//! Every error the engine, catalog, or a store variant can produce lives
//! here; callers propagate them unwrapped to the CLI, which maps each kind
//! to a distinct process exit code.

use thiserror::Error;

/// Result alias used across the rungs crates
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Core error type for the rungs migration engine
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store unavailable after {attempts} connection attempt(s): {message}")]
    StoreUnavailable { attempts: u32, message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Catalog unreadable: {message}")]
    CatalogUnreadable { message: String },

    #[error("Malformed migration file name '{file}': {message}")]
    MalformedUnitName { file: String, message: String },

    #[error("Duplicate migration version {version} ({direction}) in catalog")]
    DuplicateVersion { version: i64, direction: String },

    #[error("Nothing to undo: no down migration matching version {version}")]
    NothingToUndo { version: i64 },

    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to execute migration {version}: {message}")]
    ExecutionFailed { version: i64, message: String },

    #[error("Operation '{operation}' is not supported")]
    Unsupported { operation: String },
}

impl MigrateError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a new catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::CatalogUnreadable {
            message: message.into(),
        }
    }

    /// Process exit code for this error kind. Success is 0; clap reserves 2
    /// for usage errors, which is where invalid configuration lands too.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::StoreUnavailable { .. } => 3,
            Self::Store { .. } => 4,
            Self::CatalogUnreadable { .. } => 5,
            Self::MalformedUnitName { .. } => 6,
            Self::DuplicateVersion { .. } => 7,
            Self::NothingToUndo { .. } => 8,
            Self::WriteFailed { .. } => 9,
            Self::ExecutionFailed { .. } => 10,
            Self::Unsupported { .. } => 11,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = vec![
            MigrateError::config("x"),
            MigrateError::StoreUnavailable {
                attempts: 1,
                message: "x".into(),
            },
            MigrateError::store("x"),
            MigrateError::catalog("x"),
            MigrateError::MalformedUnitName {
                file: "x".into(),
                message: "x".into(),
            },
            MigrateError::DuplicateVersion {
                version: 1,
                direction: "up".into(),
            },
            MigrateError::NothingToUndo { version: 1 },
            MigrateError::WriteFailed {
                path: "x".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "x"),
            },
            MigrateError::ExecutionFailed {
                version: 1,
                message: "x".into(),
            },
            MigrateError::Unsupported {
                operation: "undo".into(),
            },
        ];

        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }
}
