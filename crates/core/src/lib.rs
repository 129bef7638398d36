//! # rungs-core
//!
//! Core of the rungs schema-migration tool: the version store, the
//! directory-derived migration catalog, and the engine that reconciles the
//! two by applying `<version>_<name>.up.sql` / `.down.sql` scripts in order.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod store;

pub use catalog::{Direction, MigrationCatalog, MigrationUnit, TemplateKind};
pub use config::{DatabaseConfig, MigrationConfig};
pub use engine::{
    DownResult, MigrationEngine, ModelGenerator, RedoResult, StatusEntry, UpResult,
};
pub use error::{MigrateError, MigrateResult};
pub use store::{MemoryStore, PostgresStore, SchemaStore, StoreLock, VersionState};
