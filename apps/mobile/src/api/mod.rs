//! # Backend API
//!
//! The POS backend is the system of record: it owns products, stock and
//! sales. This client only sends pending sales and looks products up.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  <api_url>/api                                                         │
//! │                                                                         │
//! │  POST   /pending-sales              PendingSaleRequest → PendingSale    │
//! │  GET    /pending-sales              → [PendingSale]                     │
//! │  DELETE /pending-sales/{id}                                             │
//! │  GET    /products/code/{code}       → Product | 404                     │
//! │  GET    /products/filters?search=   → [Product]                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout depends on [`PendingSaleApi`] rather than [`ApiClient`] so it can
//! run against a stub.

pub mod client;

use async_trait::async_trait;
use mariam_core::{PendingSale, PendingSaleRequest};

use crate::error::ApiResult;

pub use client::ApiClient;

/// Pending-sale endpoints.
#[async_trait]
pub trait PendingSaleApi: Send + Sync {
    /// Submits a cart to the cashier queue.
    async fn create_pending_sale(&self, request: &PendingSaleRequest) -> ApiResult<PendingSale>;

    /// Lists sales waiting at the cashier.
    async fn list_pending_sales(&self) -> ApiResult<Vec<PendingSale>>;

    /// Withdraws a pending sale.
    async fn delete_pending_sale(&self, id: &str) -> ApiResult<()>;
}
