//! # Persisted Settings
//!
//! The backend base URL, editable by the user and stored in the same
//! key-value store as the cart under `@mariam_pos_api_url`.
//!
//! ```text
//! api_url()                       save_api_url(" http://10.0.0.5:3001 ")
//!    │                                   │
//!    ▼                                   ▼
//! store.get_item(key)              trim → required → parse (http/https)
//!    │                                   │
//!    ├── Some(url) ──► url               ▼
//!    ├── None ───────► DEFAULT_API_URL   store.set_item(key, "http://10.0.0.5:3001")
//!    └── Err ────────► DEFAULT_API_URL (logged)
//! ```

use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use mariam_core::error::ValidationError;
use mariam_core::validation::ValidationResult;
use mariam_core::{API_URL_STORAGE_KEY, DEFAULT_API_URL};
use mariam_store::KeyValueStore;

use crate::error::ApiResult;

const API_URL_FIELD: &str = "API URL";

/// Validates a backend base URL.
///
/// Accepts absolute `http`/`https` URLs with a host; surrounding whitespace
/// is ignored.
pub fn parse_api_url(raw: &str) -> ValidationResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(API_URL_FIELD));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| ValidationError::invalid_format(API_URL_FIELD, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::invalid_format(
            API_URL_FIELD,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.host_str().is_none() {
        return Err(ValidationError::invalid_format(API_URL_FIELD, "missing host"));
    }

    Ok(url)
}

/// Access to user-editable settings.
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn KeyValueStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Settings { store }
    }

    /// The configured backend URL, or the default when none is saved.
    ///
    /// Never fails: a store error is logged and the default returned.
    pub async fn api_url(&self) -> String {
        match self.store.get_item(API_URL_STORAGE_KEY).await {
            Ok(Some(url)) if !url.trim().is_empty() => url,
            Ok(_) => DEFAULT_API_URL.to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to read API URL setting, using default");
                DEFAULT_API_URL.to_string()
            }
        }
    }

    /// Validates and stores a new backend URL.
    ///
    /// ## Returns
    /// The trimmed URL as stored.
    pub async fn save_api_url(&self, url: &str) -> ApiResult<String> {
        parse_api_url(url)?;
        let trimmed = url.trim().to_string();

        self.store.set_item(API_URL_STORAGE_KEY, &trimmed).await?;
        info!(api_url = %trimmed, "API URL saved");

        Ok(trimmed)
    }

    /// The URL used when nothing is saved.
    pub fn default_api_url() -> &'static str {
        DEFAULT_API_URL
    }
}
