//! Scaffolding for new migration units.
//!
//! Version tokens are the current wall clock formatted as `%Y%m%d%H%M%S`:
//! fixed-width, so lexical order on disk matches numeric order.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{MigrateError, MigrateResult};

/// What kind of skeleton `create` writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// A `<v>_<name>.up.sql` / `<v>_<name>.down.sql` pair
    Sql,
    /// A single `<v>_<name>.rs` Rust migration skeleton
    Code,
}

pub(crate) fn create_unit(
    directory: &Path,
    name: &str,
    kind: TemplateKind,
) -> MigrateResult<Vec<PathBuf>> {
    std::fs::create_dir_all(directory).map_err(|e| MigrateError::WriteFailed {
        path: directory.display().to_string(),
        source: e,
    })?;

    let version = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let name = sanitize_name(name);
    if name.is_empty() {
        return Err(MigrateError::config("Migration name cannot be empty"));
    }

    let mut created = Vec::new();
    match kind {
        TemplateKind::Sql => {
            let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
            let up_path = directory.join(format!("{}_{}.up.sql", version, name));
            write_new(
                &up_path,
                &format!(
                    "-- Migration: {} (up)\n-- Created: {}\n\n-- Add schema changes here\n",
                    name, stamp
                ),
            )?;
            created.push(up_path);

            let down_path = directory.join(format!("{}_{}.down.sql", version, name));
            write_new(
                &down_path,
                &format!(
                    "-- Migration: {} (down)\n-- Created: {}\n\n-- Add rollback statements here\n",
                    name, stamp
                ),
            )?;
            created.push(down_path);
        }
        TemplateKind::Code => {
            let path = directory.join(format!("{}_{}.rs", version, name));
            write_new(&path, &code_template(&version))?;
            created.push(path);
        }
    }

    Ok(created)
}

/// Lowercase, spaces to underscores, everything else restricted to
/// alphanumerics and underscores so the name round-trips through parsing.
fn sanitize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// `create_new` refuses an existing path, so a colliding version token can
/// never silently overwrite a migration.
fn write_new(path: &Path, content: &str) -> MigrateResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| MigrateError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        })?;
    file.write_all(content.as_bytes())
        .map_err(|e| MigrateError::WriteFailed {
            path: path.display().to_string(),
            source: e,
        })
}

fn code_template(version: &str) -> String {
    format!(
        r#"use sqlx::PgConnection;

pub const VERSION: i64 = {version};

pub async fn up(conn: &mut PgConnection) -> Result<(), sqlx::Error> {{
    // Apply the schema change
    Ok(())
}}

pub async fn down(conn: &mut PgConnection) -> Result<(), sqlx::Error> {{
    // Revert the schema change
    Ok(())
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sql_kind_writes_a_pair() {
        let dir = TempDir::new().unwrap();
        let created = create_unit(dir.path(), "create users table", TemplateKind::Sql).unwrap();

        assert_eq!(created.len(), 2);
        let up = created[0].file_name().unwrap().to_str().unwrap();
        let down = created[1].file_name().unwrap().to_str().unwrap();
        assert!(up.ends_with("_create_users_table.up.sql"));
        assert!(down.ends_with("_create_users_table.down.sql"));

        let up_body = fs::read_to_string(&created[0]).unwrap();
        assert!(up_body.contains("create_users_table (up)"));
        let down_body = fs::read_to_string(&created[1]).unwrap();
        assert!(down_body.contains("rollback"));
    }

    #[test]
    fn code_kind_writes_a_single_skeleton() {
        let dir = TempDir::new().unwrap();
        let created = create_unit(dir.path(), "add_index", TemplateKind::Code).unwrap();

        assert_eq!(created.len(), 1);
        let body = fs::read_to_string(&created[0]).unwrap();
        assert!(body.contains("pub const VERSION: i64"));
        assert!(body.contains("pub async fn up"));
        assert!(body.contains("pub async fn down"));
    }

    #[test]
    fn version_token_is_fixed_width() {
        let dir = TempDir::new().unwrap();
        let created = create_unit(dir.path(), "x", TemplateKind::Code).unwrap();
        let file_name = created[0].file_name().unwrap().to_str().unwrap();
        let token = file_name.split('_').next().unwrap();
        assert_eq!(token.len(), 14);
        assert!(token.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn existing_path_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taken.sql");
        fs::write(&path, "original").unwrap();

        let err = write_new(&path, "replacement").unwrap_err();
        assert!(matches!(err, MigrateError::WriteFailed { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn empty_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(create_unit(dir.path(), "  !! ", TemplateKind::Sql).is_err());
    }
}
