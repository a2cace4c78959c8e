//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Posyandu API - record keeping for community health posts
#[derive(Parser, Debug)]
#[command(name = "posyandu-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Create or reset the administrator account
    SeedAdmin(SeedAdminArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to, overriding SERVER_HOST
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Port to listen on, overriding SERVER_PORT
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the seed-admin command
#[derive(Parser, Debug)]
pub struct SeedAdminArgs {
    #[arg(long, default_value = "admin@posyandu.id", env = "ADMIN_EMAIL")]
    pub email: String,

    #[arg(long, default_value = "admin123", env = "ADMIN_PASSWORD")]
    pub password: String,

    #[arg(long, default_value = "Admin Posyandu")]
    pub name: String,

    /// Sixteen-digit NIK stored for the account
    #[arg(long, default_value = "1234567890123456")]
    pub nik: String,

    #[arg(long, default_value = "081234567890")]
    pub phone_number: String,
}
