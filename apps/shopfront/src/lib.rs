//! # Shopfront Library
//!
//! Everything behind the `shopfront` binary: startup, state, commands.
//!
//! ## Module Organization
//! ```text
//! shopfront_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── cli.rs          ◄─── clap subcommands, dispatch, rendering
//! ├── state/
//! │   ├── mod.rs      ◄─── AppContext
//! │   ├── config.rs   ◄─── AppConfig (file + env)
//! │   ├── cart.rs     ◄─── CartStore + CartEvent feed
//! │   └── session.rs  ◄─── identity guards, discount inputs
//! ├── commands/       ◄─── one module per storefront area
//! └── error.rs        ◄─── AppError { code, message }
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, written to stderr            │
//! │     • Default: info,shopfront=debug,sqlx=warn; RUST_LOG overrides      │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults → shopfront.toml → SHOPFRONT_* env                      │
//! │                                                                         │
//! │  3. Open Local Storage ───────────────────────────────────────────────► │
//! │     • SQLite with WAL mode, pending migrations applied                 │
//! │                                                                         │
//! │  4. Build Context ────────────────────────────────────────────────────► │
//! │     • HttpBackend for the configured API URL                           │
//! │     • CartStore loaded from the `cart` key                             │
//! │                                                                         │
//! │  5. Dispatch the subcommand, close the pool                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use shopfront_api::HttpBackend;
use shopfront_db::{Database, DbConfig};

use cli::Cli;
use error::AppResult;
use state::{AppConfig, AppContext};

/// Runs one CLI invocation end to end.
pub async fn run(cli: Cli) -> AppResult<()> {
    init_tracing();

    let config = AppConfig::load(cli.config)?;
    debug!(api_url = %config.api_url, "Configuration loaded");

    let db_path = config.resolve_database_path()?;
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;

    let backend = HttpBackend::new(&config.api_url)?;

    let ctx = AppContext::new(config, db.clone(), Arc::new(backend)).await?;

    let result = cli::dispatch(&ctx, cli.command, cli.json).await;
    db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=shopfront=trace` - Show trace for shopfront crates only
/// - Default: `info,shopfront=debug,sqlx=warn`
///
/// Logs go to stderr so stdout stays clean for `--json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopfront=debug,sqlx=warn"));

    // A second init (tests, embedding) is not an error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
