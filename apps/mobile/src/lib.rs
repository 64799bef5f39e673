//! # Mariam Mobile Library
//!
//! Application layer of the Mariam POS mobile client: the cart ledger with
//! its persistence, the backend client, checkout and settings.
//!
//! ## Module Organization
//! ```text
//! mariam_mobile/
//! ├── lib.rs          ◄─── You are here (App composition root, tracing)
//! ├── state/
//! │   ├── ledger.rs   ◄─── CartLedger (load gate, write-back)
//! │   ├── feedback.rs ◄─── Add confirmation sinks
//! │   ├── settings.rs ◄─── Persisted API URL
//! │   └── config.rs   ◄─── ClientConfig (file + env)
//! ├── api/
//! │   ├── mod.rs      ◄─── PendingSaleApi trait
//! │   └── client.rs   ◄─── reqwest ApiClient
//! ├── checkout.rs     ◄─── Send cart to cashier
//! ├── cli/            ◄─── clap shell used by the `mariam-pos` binary
//! └── error.rs        ◄─── ApiError
//! ```
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. ClientConfig::load ─── defaults → config.toml → MARIAM_* env        │
//! │  2. Database::new ──────── SQLite file (WAL) + migrations               │
//! │  3. CartLedger::start ──── returns at once; cart restored in background │
//! │  4. Settings ───────────── API URL from the same store                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod checkout;
pub mod cli;
pub mod error;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mariam_store::{Database, DbConfig, KeyValueStore};

use api::ApiClient;
use error::{ApiError, ApiResult};
use state::{BellConfirmation, CartLedger, ClientConfig, ConfirmationSink, NoopConfirmation, Settings};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,mariam=debug,sqlx=warn";

/// Everything a session needs, built once at startup.
pub struct App {
    pub config: ClientConfig,
    pub db: Database,
    pub ledger: CartLedger,
    pub settings: Settings,
}

impl App {
    /// Opens the local store and starts the cart ledger.
    pub async fn init(config: ClientConfig) -> ApiResult<Self> {
        let db_path = match &config.database_path {
            Some(path) => path.clone(),
            None => default_database_path()?,
        };
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        Ok(Self::with_database(config, db))
    }

    /// Builds the app over an already opened database.
    pub fn with_database(config: ClientConfig, db: Database) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(db.key_values());

        let confirmation: Arc<dyn ConfirmationSink> = if config.sound_enabled {
            Arc::new(BellConfirmation)
        } else {
            Arc::new(NoopConfirmation)
        };

        let ledger = CartLedger::start(Arc::clone(&store), confirmation);
        let settings = Settings::new(store);

        App {
            config,
            db,
            ledger,
            settings,
        }
    }

    /// Backend URL in effect: pinned by config, else the saved setting.
    pub async fn api_url(&self) -> String {
        match &self.config.api_url {
            Some(url) => url.clone(),
            None => self.settings.api_url().await,
        }
    }

    /// Client for the backend URL in effect.
    pub async fn api(&self) -> ApiResult<ApiClient> {
        ApiClient::new(&self.api_url().await, self.config.request_timeout())
    }

    /// Waits for pending cart writes and closes the store. Add confirmations
    /// still in flight are not awaited.
    pub async fn shutdown(self) {
        self.ledger.flush().await;
        self.db.close().await;
        info!("Mariam POS client stopped");
    }
}

/// Installs the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=mariam_mobile=trace` - Trace the client only
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Platform data directory path of the local store.
///
/// - **Linux**: `~/.local/share/pos/mariam.db`
/// - **macOS**: `~/Library/Application Support/com.mariam.pos/mariam.db`
/// - **Windows**: `%APPDATA%\mariam\pos\data\mariam.db`
pub fn default_database_path() -> ApiResult<PathBuf> {
    let dirs = ProjectDirs::from("com", "mariam", "pos")
        .ok_or_else(|| ApiError::internal("Could not determine app data directory"))?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|e| {
        ApiError::internal(format!(
            "Could not create {}: {}",
            data_dir.display(),
            e
        ))
    })?;

    Ok(data_dir.join("mariam.db"))
}
