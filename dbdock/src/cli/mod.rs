// CLI argument parsing and definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::postgres::config::{DEFAULT_NAME, DEFAULT_PASS, DEFAULT_PORT, DEFAULT_USER};

#[derive(Debug, Clone, Parser)]
#[command(name = "dbdock")]
#[command(about = "Disposable PostgreSQL instances in Docker, for testing")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start a PostgreSQL instance
    Start {
        /// Engine version tag (empty selects the default)
        #[arg(long, default_value = "")]
        version: String,

        /// Host port to expose the database on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Database superuser name
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,

        /// Database superuser password
        #[arg(long, default_value = DEFAULT_PASS)]
        password: String,

        /// Name of the default database
        #[arg(short, long, default_value = DEFAULT_NAME)]
        name: String,

        /// Path to a migration file or directory (applied in order,
        /// `*down.sql` files excluded)
        #[arg(short, long)]
        migrations: Option<PathBuf>,

        /// Path to a fixture file or directory (applied in order)
        #[arg(short, long)]
        fixtures: Option<PathBuf>,

        /// Also launch the pgweb inspection UI
        #[arg(long)]
        ui: bool,

        /// Return immediately instead of blocking until Ctrl+C
        #[arg(long)]
        detach: bool,
    },

    /// Create an isolated database on a running instance and print its URI
    Create {
        /// Host port of the running instance
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Database superuser name
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,

        /// Database superuser password
        #[arg(long, default_value = DEFAULT_PASS)]
        password: String,

        /// Migration file or directory, applied only when no template exists yet
        #[arg(short, long)]
        migrations: Option<PathBuf>,

        /// Fixture file or directory, applied only when no template exists yet
        #[arg(short, long)]
        fixtures: Option<PathBuf>,
    },

    /// Drop a database previously created with `create`
    Rm {
        /// Connection URI of the database to drop
        uri: String,

        /// Host port of the running instance
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Database superuser name
        #[arg(short, long, default_value = DEFAULT_USER)]
        user: String,

        /// Database superuser password
        #[arg(long, default_value = DEFAULT_PASS)]
        password: String,
    },

    /// List managed database instances
    Ls {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Stop and remove every managed container (UI containers first)
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
