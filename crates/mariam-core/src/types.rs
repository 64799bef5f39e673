//! # Domain Types
//!
//! Small value types shared by the cart, the catalog and the submission shape.
//!
//! ## Line Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A cart line is identified by (product_id, presentation_id)             │
//! │                                                                         │
//! │   ("12", None)        Cuaderno profesional (sold by piece)              │
//! │   ("12", Some("3"))   Cuaderno profesional - paquete 5                  │
//! │   ("40", None)        Azúcar (sold by weight, "Granel")                 │
//! │                                                                         │
//! │  Two adds with the same key merge into one line.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Sale Type
// =============================================================================

/// How a product is sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SaleType {
    /// Discrete unit goods, integer quantity.
    #[serde(alias = "pieza", alias = "PIEZA")]
    Pieza,
    /// Bulk goods sold by weight/volume, fractional quantity.
    #[serde(alias = "granel", alias = "GRANEL")]
    Granel,
}

impl SaleType {
    /// Normalizes the loosely-cased sale type strings the backend sends.
    ///
    /// Anything that is not "granel" (case-insensitive) is sold by piece,
    /// and a missing value defaults to [`SaleType::Pieza`].
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("granel") => SaleType::Granel,
            _ => SaleType::Pieza,
        }
    }

    /// Label used in the persisted blob and the submission payload.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleType::Pieza => "Pieza",
            SaleType::Granel => "Granel",
        }
    }

    /// Whether quantities of this type are fractional.
    #[inline]
    pub const fn is_bulk(&self) -> bool {
        matches!(self, SaleType::Granel)
    }
}

impl Default for SaleType {
    fn default() -> Self {
        SaleType::Pieza
    }
}

impl fmt::Display for SaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pieza" => Ok(SaleType::Pieza),
            "granel" => Ok(SaleType::Granel),
            _ => Err(ValidationError::NotAllowed {
                field: "saleType".to_string(),
                allowed: vec!["Pieza".to_string(), "Granel".to_string()],
            }),
        }
    }
}

// =============================================================================
// Line Key
// =============================================================================

/// Identity key of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: String,
    pub presentation_id: Option<String>,
}

impl LineKey {
    /// Creates a key from a product id and an optional presentation id.
    pub fn new(product_id: impl Into<String>, presentation_id: Option<&str>) -> Self {
        LineKey {
            product_id: product_id.into(),
            presentation_id: presentation_id.map(str::to_string),
        }
    }

    /// Checks whether this key addresses the given ids.
    pub fn matches(&self, product_id: &str, presentation_id: Option<&str>) -> bool {
        self.product_id == product_id && self.presentation_id.as_deref() == presentation_id
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.presentation_id {
            Some(p) => write!(f, "{}/{}", self.product_id, p),
            None => write!(f, "{}", self.product_id),
        }
    }
}

// =============================================================================
// Id Decoding
// =============================================================================

/// An id as the backend (and older persisted carts) send it.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

/// Accepts an id sent either as a JSON string or a JSON number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(RawId::deserialize(deserializer)?.into_string())
}

/// Optional variant of [`string_or_number`]; `null` stays `None`.
pub(crate) fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(RawId::into_string))
}

// =============================================================================
// Unit Tests
// =============================================================================
