//! # Catalog Types and Add Flows
//!
//! Product shapes as returned by the backend, and the two calling
//! conventions screens use to turn a product into a cart candidate.
//!
//! ## Add Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User taps a product (optionally a presentation)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  product.is_bulk()?                                                     │
//! │       │                                                                 │
//! │       ├── No  ──► piece_candidate()                                     │
//! │       │            qty = presentation qty or 1                          │
//! │       │                                                                 │
//! │       └── Yes ──► ask "total price" ──► bulk_candidate()                │
//! │                    qty = entered total / base price                     │
//! │                    (validation errors go back to the screen)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ledger.add_line(candidate)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::NewCartLine;
use crate::error::ValidationError;
use crate::types::{string_or_number, SaleType};
use crate::validation::{validate_entered_amount, ValidationResult};

// =============================================================================
// Product
// =============================================================================

/// A product as returned by the backend catalog endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Price of one unit (piece goods) or one kg/l (bulk goods).
    pub price: f64,

    /// Barcode / internal code.
    #[serde(default)]
    pub code: Option<String>,

    /// Loosely-cased "Pieza" / "Granel" as stored by the backend.
    #[serde(default)]
    pub sale_type: Option<String>,

    #[serde(default)]
    pub presentations: Vec<Presentation>,
}

/// A packaging/variant of a product with its own price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Presentation {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub name: String,

    /// Units added to the cart per tap.
    #[serde(default = "default_presentation_quantity")]
    pub quantity: f64,

    pub unit_price: f64,

    #[serde(default)]
    pub is_default: bool,
}

fn default_presentation_quantity() -> f64 {
    1.0
}

impl Product {
    /// Whether the product is sold by weight/volume.
    pub fn is_bulk(&self) -> bool {
        SaleType::normalize(self.sale_type.as_deref()).is_bulk()
    }

    /// Normalized sale type.
    pub fn sale_type(&self) -> SaleType {
        SaleType::normalize(self.sale_type.as_deref())
    }

    /// The presentation flagged as default, if any.
    pub fn default_presentation(&self) -> Option<&Presentation> {
        self.presentations.iter().find(|p| p.is_default)
    }

    /// Price shown in listings: default presentation price, else product price.
    pub fn display_price(&self) -> f64 {
        self.default_presentation()
            .map(|p| p.unit_price)
            .filter(|p| *p != 0.0)
            .unwrap_or(self.price)
    }

    /// Finds a presentation by id.
    pub fn presentation(&self, id: &str) -> Option<&Presentation> {
        self.presentations.iter().find(|p| p.id == id)
    }
}

/// Base price for a product/presentation pair.
///
/// A presentation price of zero falls back to the product price, matching
/// how the catalog treats unpriced presentations.
pub fn base_price(product: &Product, presentation: Option<&Presentation>) -> f64 {
    presentation
        .map(|p| p.unit_price)
        .filter(|p| *p != 0.0)
        .unwrap_or(product.price)
}

// =============================================================================
// Add Flows
// =============================================================================

/// Builds the candidate for a direct (piece) add.
///
/// Quantity is the presentation's pack quantity, or 1.
pub fn piece_candidate(product: &Product, presentation: Option<&Presentation>) -> NewCartLine {
    let price = base_price(product, presentation);
    let quantity = presentation
        .map(|p| p.quantity)
        .filter(|q| *q != 0.0)
        .unwrap_or(1.0);

    let candidate = NewCartLine::new(product.id.clone(), product.name.clone(), quantity, price)
        .with_base_price(price)
        .with_sale_type(product.sale_type());

    match presentation {
        Some(p) => candidate.with_presentation(p.id.clone(), p.name.clone()),
        None => candidate,
    }
}

/// Builds the candidate for a barcode scan.
///
/// A scan always adds a single unit at the base price, even when the
/// presentation describes a multi-unit pack.
pub fn scan_candidate(product: &Product, presentation: Option<&Presentation>) -> NewCartLine {
    let price = base_price(product, presentation);

    let candidate = NewCartLine::new(product.id.clone(), product.name.clone(), 1.0, price)
        .with_base_price(price)
        .with_sale_type(product.sale_type());

    match presentation {
        Some(p) => candidate.with_presentation(p.id.clone(), p.name.clone()),
        None => candidate,
    }
}

/// Builds the candidate for a bulk add from the total price the user entered.
///
/// ## Rules
/// - Entered total must be a positive, finite amount
/// - Base price must be positive
/// - `quantity = entered_total / base_price`
///
/// The resulting line's total equals the entered amount (up to
/// floating-point rounding).
pub fn bulk_candidate(
    product: &Product,
    presentation: Option<&Presentation>,
    entered_total: f64,
) -> ValidationResult<NewCartLine> {
    validate_entered_amount(entered_total)?;

    let price = base_price(product, presentation);
    if price.is_nan() || price <= 0.0 {
        return Err(ValidationError::must_be_positive("base price"));
    }

    let quantity = entered_total / price;
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ValidationError::invalid_format(
            "total price",
            "does not yield a valid quantity",
        ));
    }

    let candidate = NewCartLine::new(product.id.clone(), product.name.clone(), quantity, price)
        .with_base_price(price)
        .with_sale_type(SaleType::Granel);

    Ok(match presentation {
        Some(p) => candidate.with_presentation(p.id.clone(), p.name.clone()),
        None => candidate,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
