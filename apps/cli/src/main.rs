//! # Stockroom Entry Point
//!
//! Bootstraps logging, opens the data directory (SQLite file + git audit
//! repository side by side, so audit commits capture the database file),
//! then hands off to the menu loop.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockroom::{menu, App};
use stockroom_audit::AuditLog;
use stockroom_db::{Database, DbConfig};

/// Console-driven inventory manager with a git-backed audit trail.
#[derive(Debug, Parser)]
#[command(name = "stockroom", version, about)]
struct Args {
    /// Data directory. Holds the database file and doubles as the audit
    /// log's git working directory.
    #[arg(long, default_value = "stockroom-data")]
    data_dir: PathBuf,

    /// Database file name inside the data directory.
    #[arg(long, default_value = "stockroom.db")]
    db_filename: String,

    /// Install demo products and customers on startup (idempotent).
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("creating data directory {}", args.data_dir.display()))?;

    let audit = AuditLog::open_or_init(&args.data_dir).context("opening audit repository")?;
    let db = Database::new(DbConfig::new(args.data_dir.join(&args.db_filename)))
        .await
        .context("opening database")?;

    info!(data_dir = %args.data_dir.display(), "Stockroom started");

    let app = App::new(db, audit);

    if args.seed {
        let (products, customers) = app.seed_demo_data().await.context("seeding demo data")?;
        println!("Seeded {products} demo products and {customers} demo customers.");
    }

    menu::run(&app).await.context("menu loop")?;

    Ok(())
}
