//! Command handlers: thin wrappers around the engine that turn results into
//! user-facing output. Errors propagate to `main`, which maps them to exit
//! codes.

use std::path::Path;

use rungs_core::{MigrateResult, MigrationEngine, TemplateKind, VersionState};

pub async fn up(engine: &MigrationEngine) -> MigrateResult<()> {
    let result = engine.up().await?;
    if result.applied.is_empty() {
        println!("Nothing to apply, schema is up to date");
    } else {
        for version in &result.applied {
            println!("✅ Applied {}", version);
        }
        println!(
            "Applied {} migration(s) in {}ms",
            result.applied.len(),
            result.execution_time_ms
        );
    }
    Ok(())
}

pub async fn down(engine: &MigrationEngine) -> MigrateResult<()> {
    let result = engine.down().await?;
    match result.reverted {
        Some(version) => println!(
            "✅ Reverted {} in {}ms",
            version, result.execution_time_ms
        ),
        None => println!("No version recorded, nothing to undo"),
    }
    Ok(())
}

pub async fn redo(engine: &MigrationEngine) -> MigrateResult<()> {
    let result = engine.redo().await?;
    match result.down.reverted {
        Some(version) => println!("✅ Reverted {}", version),
        None => println!("No version recorded, nothing to revert"),
    }
    for version in &result.up.applied {
        println!("✅ Applied {}", version);
    }
    Ok(())
}

pub async fn status(engine: &MigrationEngine, json: bool) -> MigrateResult<()> {
    let entries = engine.status().await?;

    if json {
        let rendered = serde_json::to_string_pretty(&entries)
            .map_err(|e| rungs_core::MigrateError::store(format!("Failed to render status: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No migrations found");
        return Ok(());
    }

    println!("Migration status:");
    for entry in &entries {
        let marker = if entry.applied { "✅" } else { "⏳" };
        println!("  {} {} {}", marker, entry.version, entry.name);
    }
    Ok(())
}

pub async fn version(engine: &MigrationEngine) -> MigrateResult<()> {
    match engine.version().await? {
        VersionState::Empty => println!("No schema version recorded"),
        VersionState::Current(version) => println!("{}", version),
    }
    Ok(())
}

pub fn create(engine: &MigrationEngine, name: &str, kind: TemplateKind) -> MigrateResult<()> {
    let created = engine.create(name, kind)?;
    for path in &created {
        println!("✅ Created {}", path.display());
    }
    Ok(())
}

pub fn generate(
    engine: &MigrationEngine,
    models: &[String],
    output_path: &Path,
) -> MigrateResult<()> {
    let written = engine.generate(models, output_path)?;
    for path in &written {
        println!("✅ Generated {}", path.display());
    }
    Ok(())
}
