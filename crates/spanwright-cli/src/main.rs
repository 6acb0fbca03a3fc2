use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "spanwright",
    about = "Spanwright — Spanner emulator E2E tooling",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the environment-driven configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Read schema DDL and resolve fixture table names
    Schema {
        #[command(subcommand)]
        action: SchemaAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load .env and the environment, run every safety check, print a summary
    Check,
    /// Print the resource path for a configured database
    Dsn {
        #[arg(short, long, value_enum, default_value = "primary")]
        database: DatabaseChoice,
    },
}

#[derive(Subcommand)]
enum SchemaAction {
    /// Print the tables and columns declared by a schema file or directory
    Show {
        /// Schema file or directory of numbered migrations (relative)
        #[arg(short, long)]
        path: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Resolve a fixture table name against the schema.
    ///
    /// Exits non-zero when the name matches no declared table.
    Resolve {
        /// Table name as written in fixtures, e.g. user_profiles
        name: String,
        #[arg(short, long)]
        path: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DatabaseChoice {
    Primary,
    Secondary,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spanwright=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config::check(),
            ConfigAction::Dsn { database } => commands::config::dsn(database),
        },
        Commands::Schema { action } => match action {
            SchemaAction::Show { path, format } => commands::schema::show(&path, &format),
            SchemaAction::Resolve { name, path } => commands::schema::resolve(&name, &path),
        },
    }
}
