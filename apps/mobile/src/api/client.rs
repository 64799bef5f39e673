//! # HTTP Client
//!
//! `reqwest` client bound to one backend base URL.
//!
//! ## Failure Mapping
//! ```text
//! transport error (connect, timeout)  ──► NETWORK_ERROR
//! 404                                 ──► NOT_FOUND
//! other non-2xx                       ──► BACKEND_ERROR, message from body
//!                                         {"error": ".."} or {"message": ".."}
//! 2xx with unexpected body            ──► BACKEND_ERROR
//! ```
//! Every failure is logged with the status and URL before it is returned.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use mariam_core::{PendingSale, PendingSaleRequest, Product};

use super::PendingSaleApi;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::settings::parse_api_url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the POS backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client for `api_url` (e.g. `http://192.168.0.17:3001`).
    ///
    /// Requests go to `<api_url>/api/...`.
    pub fn new(api_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base = parse_api_url(api_url)?;
        let http = Client::builder().timeout(timeout).build()?;

        debug!(base = %base, ?timeout, "API client created");
        Ok(ApiClient { http, base })
    }

    /// Base URL requests are built from.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Looks a product up by barcode. `None` when the backend has no match.
    pub async fn product_by_code(&self, code: &str) -> ApiResult<Option<Product>> {
        let url = self.endpoint(&["products", "code", code])?;

        match self.fetch_json::<Option<Product>>(self.http.get(url.clone()), &url).await {
            Ok(product) => Ok(product),
            Err(e) if e.code == ErrorCode::NotFound => {
                debug!(code, "No product for code");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Free-text product search.
    pub async fn search_products(&self, search: &str) -> ApiResult<Vec<Product>> {
        let mut url = self.endpoint(&["products", "filters"])?;
        url.query_pairs_mut().append_pair("search", search);

        self.fetch_json(self.http.get(url.clone()), &url).await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// `<base>/api/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::internal(format!("Unusable base URL: {}", self.base)))?;
            path.pop_if_empty().push("api").extend(segments);
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> ApiResult<Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Backend request failed");
                return Err(ApiError::from(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(url = %url, status = status.as_u16(), "Backend request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(url = %url, status = status.as_u16(), body = %body, "Backend returned an error");
        Err(status_error(status, &body))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> ApiResult<T> {
        let response = self.send(request, url).await?;
        response.json::<T>().await.map_err(|e| {
            warn!(url = %url, error = %e, "Unexpected response body");
            ApiError::from(e)
        })
    }
}

#[async_trait]
impl PendingSaleApi for ApiClient {
    async fn create_pending_sale(&self, request: &PendingSaleRequest) -> ApiResult<PendingSale> {
        let url = self.endpoint(&["pending-sales"])?;
        self.fetch_json(self.http.post(url.clone()).json(request), &url)
            .await
    }

    async fn list_pending_sales(&self) -> ApiResult<Vec<PendingSale>> {
        let url = self.endpoint(&["pending-sales"])?;
        self.fetch_json(self.http.get(url.clone()), &url).await
    }

    async fn delete_pending_sale(&self, id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["pending-sales", id])?;
        self.send(self.http.request(Method::DELETE, url.clone()), &url)
            .await?;
        Ok(())
    }
}

/// Maps a non-2xx response to an error, preferring the backend's message.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "message"]
                .iter()
                .find_map(|field| json.get(field).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("Backend returned {}", status));

    if status == StatusCode::NOT_FOUND {
        ApiError::new(ErrorCode::NotFound, message)
    } else {
        ApiError::backend(message)
    }
}
