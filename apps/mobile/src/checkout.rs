//! # Send to Cashier
//!
//! Turns the current cart into a pending sale on the backend.
//!
//! ```text
//! ledger.lines() + total ──► PendingSaleRequest::from_lines ──► POST /pending-sales
//!                                   │ invalid                        │
//!                                   ▼                                ▼
//!                             Err (cart kept)            response has a code?
//!                                                         │ no         │ yes
//!                                                         ▼            ▼
//!                                                   Err (cart kept)  ledger.clear()
//! ```
//!
//! The cart is cleared only after the backend has acknowledged the sale
//! with a code.

use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use mariam_core::PendingSaleRequest;

use crate::api::PendingSaleApi;
use crate::error::ApiResult;
use crate::state::config::ClientConfig;
use crate::state::ledger::CartLedger;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CheckoutReceipt {
    /// Code the cashier uses to pull the sale up.
    pub code: String,
    /// Backend id of the pending sale, when returned.
    pub sale_id: Option<String>,
    pub client_name: String,
    pub total: f64,
    pub line_count: usize,
}

/// Submits the cart as a pending sale for `client_name`, then clears it.
pub async fn send_to_cashier<A>(
    ledger: &CartLedger,
    api: &A,
    config: &ClientConfig,
    client_name: &str,
) -> ApiResult<CheckoutReceipt>
where
    A: PendingSaleApi + ?Sized,
{
    ledger.ready().await;

    let lines = ledger.lines();
    let total = ledger.total();
    let request = PendingSaleRequest::from_lines(
        client_name,
        &lines,
        total,
        &config.branch,
        &config.cash_register,
    )?;

    let sale = api.create_pending_sale(&request).await?;
    let code = match sale.code() {
        Ok(code) => code.to_string(),
        Err(e) => {
            warn!(sale_id = ?sale.id, "Pending sale accepted without a code; cart kept");
            return Err(e.into());
        }
    };

    ledger.clear();

    info!(
        code = %code,
        client = %request.client_name,
        total,
        lines = lines.len(),
        "Cart sent to cashier"
    );

    Ok(CheckoutReceipt {
        code,
        sale_id: sale.id,
        client_name: request.client_name,
        total,
        line_count: lines.len(),
    })
}
