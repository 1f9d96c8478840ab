//! zyxel-presence - Zyxel router active device poller
//!
//! Logs into the router admin interface, scrapes the active DHCP clients and
//! merges them into a PostgreSQL presence history (one row per continuous
//! interval a device was seen).

mod config;
mod crypto;
mod db;
mod error;
mod models;
mod poller;
mod reconcile;
mod router;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;
use crate::db::PgDb;

#[derive(Parser)]
#[command(name = "zyxel-presence")]
#[command(version)]
#[command(about = "Record which devices are active on a Zyxel router over time")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Echo decrypted credentials, device counts and raw router responses
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the router once and update the presence history (default)
    Poll,

    /// Encrypt a secret for THE_USERNAME / THE_PASSWORD
    Encrypt {
        /// Value to encrypt
        plaintext: String,

        /// Hex encoded AES key
        #[arg(long, env = "THE_KEY", hide_env_values = true)]
        key: String,
    },

    /// Create the presence history table if missing
    InitDb {
        #[arg(long, env = "THE_POSTGRES_CS", hide_env_values = true)]
        database_url: String,
    },

    /// Show recorded presence intervals for a MAC address
    History {
        mac: String,

        #[arg(short, long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,

        #[arg(long, env = "THE_POSTGRES_CS", hide_env_values = true)]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("zyxel_presence={}", log_level).into()),
        )
        .init();

    match cli.command.unwrap_or(Commands::Poll) {
        Commands::Poll => cmd_poll(cli.verbose).await,
        Commands::Encrypt { plaintext, key } => {
            println!("{}", crypto::encrypt(&plaintext, &key)?);
            Ok(())
        }
        Commands::InitDb { database_url } => cmd_init_db(&database_url).await,
        Commands::History {
            mac,
            limit,
            database_url,
        } => cmd_history(&mac, limit, &database_url).await,
    }
}

async fn cmd_poll(verbose: bool) -> anyhow::Result<()> {
    let settings = Settings::load(verbose)?;
    tracing::debug!("[Poll] Router {}", settings.credentials.router_address);

    let summary = poller::run_once(&settings).await?;
    tracing::debug!("[Poll] Done: {:?}", summary);
    Ok(())
}

async fn cmd_init_db(database_url: &str) -> anyhow::Result<()> {
    let db = PgDb::connect(database_url).await?;
    let result = db.ensure_active_device_table().await;
    db.close().await;
    result?;

    tracing::info!("[Db] router.active_device is ready");
    Ok(())
}

async fn cmd_history(mac: &str, limit: u32, database_url: &str) -> anyhow::Result<()> {
    let db = PgDb::connect(database_url).await?;
    let result = db.list_intervals_by_mac(mac, limit).await;
    db.close().await;
    let rows = result?;

    if rows.is_empty() {
        println!("No presence recorded for {}", mac);
        return Ok(());
    }

    for row in rows {
        let minutes = (row.ending - row.starting).num_minutes();
        println!(
            "  {}  →  {}  {:>6} min  {:15} {} ({}/{})",
            row.starting.format("%Y-%m-%d %H:%M"),
            row.ending.format("%Y-%m-%d %H:%M"),
            minutes,
            row.ip,
            row.name,
            row.net,
            row.net_number
        );
    }
    Ok(())
}
