mod commands;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rungs_codegen::CodeGenerator;
use rungs_core::{
    DatabaseConfig, MigrateResult, MigrationCatalog, MigrationConfig, MigrationEngine,
    PostgresStore, TemplateKind,
};

#[derive(Parser)]
#[command(name = "rungs")]
#[command(about = "Postgres schema migration tool", version)]
struct Cli {
    /// Database host
    #[arg(long, env = "RUNGS_DB_HOST", default_value = "localhost")]
    host: String,

    /// Database port
    #[arg(long, env = "RUNGS_DB_PORT", default_value_t = 5432)]
    port: u16,

    /// Database user
    #[arg(long, env = "RUNGS_DB_USER", default_value = "postgres")]
    user: String,

    /// Database password
    #[arg(
        long,
        env = "RUNGS_DB_PASSWORD",
        default_value = "postgres",
        hide_env_values = true
    )]
    password: String,

    /// Database name
    #[arg(long, env = "RUNGS_DB_NAME", default_value = "migrationtest")]
    database: String,

    /// Directory holding the migration files
    #[arg(long = "dir", env = "RUNGS_MIGRATION_DIR", default_value = "migrations")]
    dir: PathBuf,

    /// Table holding the current-version row
    #[arg(
        long,
        env = "RUNGS_VERSION_TABLE",
        default_value = "schema_migrations"
    )]
    version_table: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every pending migration in ascending version order
    Up,

    /// Undo the migration matching the current version
    Down,

    /// Undo the current migration, then re-apply pending ones
    Redo,

    /// Show every up migration with its applied/pending state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the current schema version
    Version,

    /// Scaffold a new migration
    Create {
        /// Migration name
        name: String,

        /// Skeleton to write: a .up/.down SQL pair or a Rust file
        #[arg(long, value_enum, default_value = "sql")]
        kind: KindArg,
    },

    /// Generate model skeletons into an output directory
    Generate {
        /// Directory the model files are written to
        output_path: PathBuf,

        /// Model names to generate
        #[arg(required = true)]
        models: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Sql,
    Code,
}

impl From<KindArg> for TemplateKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Sql => TemplateKind::Sql,
            KindArg::Code => TemplateKind::Code,
        }
    }
}

fn init_logging(json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Logs go to stderr; stdout is reserved for command output.
    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> MigrateResult<()> {
    let db_config = DatabaseConfig {
        host: cli.host,
        port: cli.port,
        user: cli.user,
        password: cli.password,
        database: cli.database,
        ..Default::default()
    };
    db_config.validate()?;

    let migration_config = MigrationConfig {
        directory: cli.dir,
        version_table: cli.version_table,
    };
    migration_config.validate()?;

    tracing::debug!(url = %db_config.masked_url(), dir = %migration_config.directory.display(), "Starting");

    let store = PostgresStore::connect(&db_config, &migration_config.version_table).await?;
    let catalog = MigrationCatalog::new(migration_config);
    let engine =
        MigrationEngine::init(Arc::new(store), catalog, Arc::new(CodeGenerator::new())).await?;

    match cli.command {
        Commands::Up => commands::up(&engine).await,
        Commands::Down => commands::down(&engine).await,
        Commands::Redo => commands::redo(&engine).await,
        Commands::Status { json } => commands::status(&engine, json).await,
        Commands::Version => commands::version(&engine).await,
        Commands::Create { name, kind } => commands::create(&engine, &name, kind.into()),
        Commands::Generate {
            output_path,
            models,
        } => commands::generate(&engine, &models, &output_path),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(err) = run(cli).await {
        eprintln!("❌ {}", err);
        std::process::exit(err.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_test::serial;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_up_with_defaults() {
        let cli = Cli::try_parse_from(["rungs", "up"]).unwrap();
        assert!(matches!(cli.command, Commands::Up));
        assert_eq!(cli.host, "localhost");
        assert_eq!(cli.port, 5432);
        assert_eq!(cli.dir, PathBuf::from("migrations"));
    }

    #[test]
    fn parses_create_with_kind() {
        let cli =
            Cli::try_parse_from(["rungs", "create", "add_users", "--kind", "code"]).unwrap();
        match cli.command {
            Commands::Create { name, kind } => {
                assert_eq!(name, "add_users");
                assert_eq!(kind, KindArg::Code);
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn generate_requires_at_least_one_model() {
        assert!(Cli::try_parse_from(["rungs", "generate", "out"]).is_err());

        let cli = Cli::try_parse_from(["rungs", "generate", "out", "user", "post"]).unwrap();
        match cli.command {
            Commands::Generate {
                output_path,
                models,
            } => {
                assert_eq!(output_path, PathBuf::from("out"));
                assert_eq!(models, vec!["user", "post"]);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["rungs", "sideways"]).is_err());
    }

    #[test]
    #[serial]
    fn environment_overrides_flags_defaults() {
        std::env::set_var("RUNGS_DB_PORT", "6543");
        std::env::set_var("RUNGS_MIGRATION_DIR", "/srv/migrations");
        let cli = Cli::try_parse_from(["rungs", "status"]).unwrap();
        std::env::remove_var("RUNGS_DB_PORT");
        std::env::remove_var("RUNGS_MIGRATION_DIR");

        assert_eq!(cli.port, 6543);
        assert_eq!(cli.dir, PathBuf::from("/srv/migrations"));
    }
}
