//! # Pending Sale Submission
//!
//! Translation of cart lines into the request body the backend expects when
//! a cart is sent to the cashier as a *pending sale*.
//!
//! ## Field Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartLine                    PendingSaleDetail                          │
//! │  ────────                    ─────────────────                          │
//! │  product_id: "12"      ───►  productId: 12        (must parse, > 0)     │
//! │  presentation_id: "3"  ───►  presentationId: 3    (invalid → null)      │
//! │  quantity              ───►  quantity                                   │
//! │  unit_price            ───►  price                                      │
//! │  total                 ───►  subTotal                                   │
//! │  base_price            ───►  basePrice            (absent → unit_price) │
//! │  sale_type             ───►  saleType             (absent → null)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is only cleared after the backend answers with a sale code; that
//! sequencing lives in the application's checkout flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult};
use crate::types::SaleType;
use crate::validation::{parse_backend_id, validate_client_name};

// =============================================================================
// Request
// =============================================================================

/// One line of a pending sale, in the backend's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PendingSaleDetail {
    pub product_id: i64,
    pub quantity: f64,
    pub price: f64,
    pub sub_total: f64,
    pub product_name: Option<String>,
    pub presentation_id: Option<i64>,
    pub presentation_name: Option<String>,
    pub sale_type: Option<SaleType>,
    pub base_price: f64,
}

impl PendingSaleDetail {
    /// Maps one cart line.
    ///
    /// ## Errors
    /// [`CoreError::InvalidProductId`] when the product id is not a positive integer.
    pub fn from_line(line: &CartLine) -> CoreResult<Self> {
        let product_id = parse_backend_id(&line.product_id)
            .ok_or_else(|| CoreError::InvalidProductId(line.product_id.clone()))?;

        Ok(PendingSaleDetail {
            product_id,
            quantity: line.quantity,
            price: line.unit_price,
            sub_total: line.total,
            product_name: Some(line.product_name.clone()).filter(|n| !n.is_empty()),
            presentation_id: line.presentation_id.as_deref().and_then(parse_backend_id),
            presentation_name: line.presentation_name.clone().filter(|n| !n.is_empty()),
            sale_type: line.sale_type,
            base_price: line.effective_price(),
        })
    }
}

/// Body of `POST /pending-sales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PendingSaleRequest {
    pub client_name: String,
    pub total: f64,
    pub branch: String,
    pub cash_register: String,
    pub details: Vec<PendingSaleDetail>,
}

impl PendingSaleRequest {
    /// Builds the request for a cart.
    ///
    /// ## Rules
    /// - Client name is trimmed and required
    /// - Cart must not be empty
    /// - Every product id must be a positive integer
    /// - The sale total must be a finite amount greater than zero
    pub fn from_lines(
        client_name: &str,
        lines: &[CartLine],
        total: f64,
        branch: &str,
        cash_register: &str,
    ) -> CoreResult<Self> {
        let client_name = validate_client_name(client_name)?;

        if lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let details = lines
            .iter()
            .map(PendingSaleDetail::from_line)
            .collect::<CoreResult<Vec<_>>>()?;

        if !total.is_finite() || total <= 0.0 {
            return Err(CoreError::InvalidTotal(total));
        }

        Ok(PendingSaleRequest {
            client_name,
            total,
            branch: branch.to_string(),
            cash_register: cash_register.to_string(),
            details,
        })
    }
}

// =============================================================================
// Response
// =============================================================================

/// A pending sale as returned by the backend.
///
/// Only the fields the client uses are modelled; anything else is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PendingSale {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,

    /// Short code the cashier types to pull the sale up.
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub client_name: Option<String>,

    #[serde(default)]
    pub total: Option<f64>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PendingSale {
    /// The sale code; its absence means the submission did not go through.
    pub fn code(&self) -> CoreResult<&str> {
        self.code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or(CoreError::MissingSaleCode)
    }
}

fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{Cart, NewCartLine};
    use crate::error::ValidationError;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_line(
            NewCartLine::new("12", "Cuaderno", 2.0, 35.0)
                .with_base_price(35.0)
                .with_sale_type(SaleType::Pieza),
        );
        cart.add_line(
            NewCartLine::new("40", "Azúcar", 1.5, 24.0)
                .with_presentation("x", "Bolsa")
                .with_sale_type(SaleType::Granel),
        );
        cart
    }

    #[test]
    fn test_from_lines_maps_fields() {
        let cart = cart();
        let request =
            PendingSaleRequest::from_lines(" Ana ", cart.lines(), cart.total(), "Centro", "Caja 2")
                .unwrap();

        assert_eq!(request.client_name, "Ana");
        assert_eq!(request.total, 106.0);
        assert_eq!(request.details.len(), 2);

        let first = &request.details[0];
        assert_eq!(first.product_id, 12);
        assert_eq!(first.price, 35.0);
        assert_eq!(first.sub_total, 70.0);
        assert_eq!(first.base_price, 35.0);

        // Non-numeric presentation ids become null, base price falls back
        let second = &request.details[1];
        assert_eq!(second.presentation_id, None);
        assert_eq!(second.presentation_name.as_deref(), Some("Bolsa"));
        assert_eq!(second.base_price, 24.0);
        assert_eq!(second.sale_type, Some(SaleType::Granel));
    }

    #[test]
    fn test_from_lines_serialized_shape() {
        let cart = cart();
        let request =
            PendingSaleRequest::from_lines("Ana", cart.lines(), cart.total(), "Centro", "Caja 1")
                .unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["clientName"], "Ana");
        assert_eq!(json["cashRegister"], "Caja 1");
        assert_eq!(json["details"][0]["subTotal"], 70.0);
        assert_eq!(json["details"][0]["productId"], 12);
        assert!(json["details"][1]["presentationId"].is_null());
    }

    #[test]
    fn test_from_lines_rejects_bad_input() {
        let cart = cart();

        assert!(matches!(
            PendingSaleRequest::from_lines("  ", cart.lines(), cart.total(), "b", "c"),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
        assert!(matches!(
            PendingSaleRequest::from_lines("Ana", &[], 0.0, "b", "c"),
            Err(CoreError::EmptyCart)
        ));
        assert!(matches!(
            PendingSaleRequest::from_lines("Ana", cart.lines(), 0.0, "b", "c"),
            Err(CoreError::InvalidTotal(_))
        ));

        let mut bad = Cart::new();
        bad.add_line(NewCartLine::new("P1", "Goma", 1.0, 5.0));
        assert!(matches!(
            PendingSaleRequest::from_lines("Ana", bad.lines(), bad.total(), "b", "c"),
            Err(CoreError::InvalidProductId(id)) if id == "P1"
        ));
    }

    #[test]
    fn test_pending_sale_code() {
        let sale: PendingSale =
            serde_json::from_str(r#"{"id":5,"code":"PV-0005","total":106,"clientName":"Ana"}"#)
                .unwrap();
        assert_eq!(sale.id.as_deref(), Some("5"));
        assert_eq!(sale.code().unwrap(), "PV-0005");

        let missing: PendingSale = serde_json::from_str(r#"{"id":"6"}"#).unwrap();
        assert!(matches!(missing.code(), Err(CoreError::MissingSaleCode)));
    }
}
