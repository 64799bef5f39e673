//! # Cart Ledger
//!
//! The in-memory list of line items and the rules that mutate it.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Ledger Operations                               │
//! │                                                                         │
//! │  Screen Action           Operation               Ledger Change          │
//! │  ─────────────           ─────────               ─────────────          │
//! │                                                                         │
//! │  Tap product ───────────► add_line() ──────────► merge or append        │
//! │                                                                         │
//! │  Change quantity ───────► update_quantity() ───► qty = n, total = n×p   │
//! │                           (n ≤ 0) ─────────────► remove                 │
//! │                                                                         │
//! │  Swipe remove ──────────► remove_line() ───────► retain others          │
//! │                                                                         │
//! │  Sale sent / cancel ────► clear() ─────────────► empty                  │
//! │                                                                         │
//! │  Badge / footer ────────► total(), item_count() (read only)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing
//! The *effective price* of a line is `base_price` when present, else
//! `unit_price`. A line's total is always `quantity × effective price` and
//! `unit_price` is rewritten to the effective price on every mutation, so the
//! base price, once set, is the permanent per-unit reference of the line.
//!
//! On merge the price already established on the existing line wins over the
//! incoming candidate's price.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{optional_string_or_number, string_or_number, LineKey, SaleType};

// =============================================================================
// Cart Line
// =============================================================================

/// One entry in the cart.
///
/// Serialized with camelCase names; this is the element shape of the
/// persisted cart blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Product identifier (part of the identity key).
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,

    /// Display label, informational only.
    pub product_name: String,

    /// Packaging/variant identifier (part of the identity key).
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub presentation_id: Option<String>,

    /// Display label of the presentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_name: Option<String>,

    /// Units for piece goods, weight/volume for bulk goods.
    pub quantity: f64,

    /// Price used for totals; normalized to the effective price.
    pub unit_price: f64,

    /// Canonical per-unit price; wins over `unit_price` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_type: Option<SaleType>,

    /// Derived: `quantity × effective price`.
    pub total: f64,
}

impl CartLine {
    /// Returns `base_price` if set, otherwise `unit_price`.
    #[inline]
    pub fn effective_price(&self) -> f64 {
        self.base_price.unwrap_or(self.unit_price)
    }

    /// Returns the identity key of this line.
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.presentation_id.as_deref())
    }

    /// Checks whether this line has the given identity.
    #[inline]
    pub fn matches(&self, product_id: &str, presentation_id: Option<&str>) -> bool {
        self.product_id == product_id && self.presentation_id.as_deref() == presentation_id
    }

    /// Display label: "Product - Presentation" or just the product name.
    pub fn display_name(&self) -> String {
        match &self.presentation_name {
            Some(p) => format!("{} - {}", self.product_name, p),
            None => self.product_name.clone(),
        }
    }

    /// Whether this line holds bulk (fractional quantity) goods.
    pub fn is_bulk(&self) -> bool {
        self.sale_type.map(|t| t.is_bulk()).unwrap_or(false)
    }

    /// Sets a new quantity and recomputes the derived fields.
    fn set_quantity(&mut self, quantity: f64) {
        let price = self.effective_price();
        self.quantity = quantity;
        self.unit_price = price;
        self.total = quantity * price;
    }
}

// =============================================================================
// New Cart Line (candidate)
// =============================================================================

/// A line to add: every field of [`CartLine`] except the derived total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewCartLine {
    #[serde(deserialize_with = "string_or_number")]
    pub product_id: String,
    pub product_name: String,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub presentation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presentation_name: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_type: Option<SaleType>,
}

impl NewCartLine {
    /// Creates a candidate without presentation, base price or sale type.
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: f64,
        unit_price: f64,
    ) -> Self {
        NewCartLine {
            product_id: product_id.into(),
            product_name: product_name.into(),
            presentation_id: None,
            presentation_name: None,
            quantity,
            unit_price,
            base_price: None,
            sale_type: None,
        }
    }

    pub fn with_presentation(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.presentation_id = Some(id.into());
        self.presentation_name = Some(name.into());
        self
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = Some(base_price);
        self
    }

    pub fn with_sale_type(mut self, sale_type: SaleType) -> Self {
        self.sale_type = Some(sale_type);
        self
    }

    /// Returns `base_price` if set, otherwise `unit_price`.
    #[inline]
    pub fn effective_price(&self) -> f64 {
        self.base_price.unwrap_or(self.unit_price)
    }

    /// Converts into a stored line: unit price normalized, total derived.
    pub fn into_line(self) -> CartLine {
        let price = self.effective_price();
        CartLine {
            total: self.quantity * price,
            unit_price: price,
            product_id: self.product_id,
            product_name: self.product_name,
            presentation_id: self.presentation_id,
            presentation_name: self.presentation_name,
            quantity: self.quantity,
            base_price: self.base_price,
            sale_type: self.sale_type,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The ordered sequence of cart lines.
///
/// ## Invariants
/// - Lines are unique by `(product_id, presentation_id)`
/// - Insertion order is display order; merges update in place
/// - `total` of every line equals `quantity × effective price`
///
/// Serializes as a bare JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Wraps lines restored from storage as they are.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Cart { lines }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Finds the line with the given identity.
    pub fn find(&self, product_id: &str, presentation_id: Option<&str>) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|l| l.matches(product_id, presentation_id))
    }

    /// Adds a candidate line, merging with an existing line of the same key.
    ///
    /// ## Behavior
    /// - Existing key: quantities are summed and the total is recomputed with
    ///   the **existing** line's effective price; position is preserved.
    /// - New key: appended with `unit_price` normalized to the effective price.
    ///
    /// No validation happens here: a zero or negative quantity on a new key
    /// still creates a (degenerate) line.
    ///
    /// ## Returns
    /// The line as it stands after the add.
    pub fn add_line(&mut self, candidate: NewCartLine) -> &CartLine {
        let position = self.lines.iter().position(|l| {
            l.matches(&candidate.product_id, candidate.presentation_id.as_deref())
        });

        match position {
            Some(index) => {
                let line = &mut self.lines[index];
                let merged = line.quantity + candidate.quantity;
                line.set_quantity(merged);
                &self.lines[index]
            }
            None => {
                self.lines.push(candidate.into_line());
                let last = self.lines.len() - 1;
                &self.lines[last]
            }
        }
    }

    /// Removes the line with the given identity.
    ///
    /// ## Returns
    /// `true` if a line was removed, `false` if no line matched.
    pub fn remove_line(&mut self, product_id: &str, presentation_id: Option<&str>) -> bool {
        let before = self.lines.len();
        self.lines
            .retain(|l| !l.matches(product_id, presentation_id));
        self.lines.len() != before
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: same as [`Cart::remove_line`]
    /// - Otherwise the total is recomputed and `unit_price` normalized
    /// - No-op if the key is absent
    ///
    /// ## Returns
    /// `true` if a line was changed or removed.
    pub fn update_quantity(
        &mut self,
        product_id: &str,
        presentation_id: Option<&str>,
        quantity: f64,
    ) -> bool {
        if quantity <= 0.0 {
            return self.remove_line(product_id, presentation_id);
        }

        match self
            .lines
            .iter_mut()
            .find(|l| l.matches(product_id, presentation_id))
        {
            Some(line) => {
                line.set_quantity(quantity);
                true
            }
            None => false,
        }
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of the line totals (0 for an empty cart).
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.total).sum()
    }

    /// Raw sum of quantities (bulk quantities included as fractions).
    pub fn total_quantity(&self) -> f64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Item count for the cart badge: the quantity sum rounded to a whole number.
    pub fn item_count(&self) -> i64 {
        self.total_quantity().round() as i64
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart summary for the UI shell (badge and footer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub item_count: i64,
    pub total: f64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.len(),
            item_count: cart.item_count(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn piece(id: &str, qty: f64, price: f64) -> NewCartLine {
        NewCartLine::new(id, format!("Producto {}", id), qty, price).with_sale_type(SaleType::Pieza)
    }

    #[test]
    fn test_add_line_appends_with_total() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 2.0, 10.0));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].total, 20.0);
        assert_eq!(cart.total(), 20.0);
    }

    #[test]
    fn test_add_same_key_merges_quantity() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 2.0, 8.0).with_base_price(8.0));
        cart.add_line(piece("P1", 3.0, 8.0).with_base_price(8.0));

        assert_eq!(cart.len(), 1);
        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 5.0);
        assert_eq!(line.total, 40.0);
    }

    #[test]
    fn test_merge_keeps_existing_price() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 1.0, 10.0).with_base_price(10.0));
        cart.add_line(piece("P1", 1.0, 12.0).with_base_price(12.0));

        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 2.0);
        assert_eq!(line.total, 20.0);
        assert_eq!(line.base_price, Some(10.0));
    }

    #[test]
    fn test_merge_preserves_position() {
        let mut cart = Cart::new();
        cart.add_line(piece("A", 1.0, 1.0));
        cart.add_line(piece("B", 1.0, 1.0));
        cart.add_line(piece("A", 4.0, 1.0));

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(cart.lines()[0].quantity, 5.0);
    }

    #[test]
    fn test_presentations_are_distinct_lines() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 1.0, 10.0));
        cart.add_line(piece("P1", 1.0, 45.0).with_presentation("7", "Paquete 5"));

        assert_eq!(cart.len(), 2);
        assert!(cart.find("P1", None).is_some());
        assert!(cart.find("P1", Some("7")).is_some());
    }

    #[test]
    fn test_base_price_wins_over_unit_price() {
        let mut cart = Cart::new();
        cart.add_line(NewCartLine::new("P1", "Hojas", 3.0, 99.0).with_base_price(2.0));

        let line = &cart.lines()[0];
        assert_eq!(line.unit_price, 2.0);
        assert_eq!(line.total, 6.0);
    }

    #[test]
    fn test_degenerate_new_line_is_kept() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 0.0, 10.0));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].total, 0.0);
    }

    #[test]
    fn test_update_quantity_recomputes_total() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 2.0, 10.0));

        assert!(cart.update_quantity("P1", None, 7.0));
        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 7.0);
        assert_eq!(line.total, 70.0);
    }

    #[test]
    fn test_update_quantity_normalizes_unit_price() {
        // Restored lines are taken as-is, so unit and base price may differ.
        let mut cart = Cart::from_lines(vec![CartLine {
            product_id: "P1".to_string(),
            product_name: "Lapicero".to_string(),
            presentation_id: None,
            presentation_name: None,
            quantity: 1.0,
            unit_price: 9.0,
            base_price: Some(6.0),
            sale_type: Some(SaleType::Pieza),
            total: 9.0,
        }]);

        cart.update_quantity("P1", None, 2.0);
        let line = &cart.lines()[0];
        assert_eq!(line.unit_price, 6.0);
        assert_eq!(line.total, 12.0);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 2.0, 10.0));
        cart.add_line(piece("P2", 2.0, 10.0));

        assert!(cart.update_quantity("P1", None, 0.0));
        assert!(cart.update_quantity("P2", None, -3.0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_missing_key_is_noop() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 2.0, 10.0));

        assert!(!cart.update_quantity("P9", None, 4.0));
        assert!(!cart.update_quantity("P1", Some("1"), 4.0));
        assert_eq!(cart.lines()[0].quantity, 2.0);
    }

    #[test]
    fn test_remove_line_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 1.0, 10.0));

        assert!(cart.remove_line("P1", None));
        assert!(!cart.remove_line("P1", None));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_sums_effective_prices() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), 0.0);

        cart.add_line(piece("A", 2.0, 10.0));
        cart.add_line(NewCartLine::new("B", "Azúcar", 1.5, 0.0).with_base_price(24.0));
        cart.add_line(piece("C", 3.0, 1.25));

        let expected: f64 = cart
            .lines()
            .iter()
            .map(|l| l.quantity * l.effective_price())
            .sum();
        assert!((cart.total() - expected).abs() < EPSILON);
        assert!((cart.total() - 59.75).abs() < EPSILON);
    }

    #[test]
    fn test_item_count_rounds_fractional_sum() {
        let mut cart = Cart::new();
        cart.add_line(piece("A", 2.0, 10.0));
        cart.add_line(NewCartLine::new("B", "Frijol", 0.75, 30.0).with_sale_type(SaleType::Granel));
        cart.add_line(NewCartLine::new("C", "Arroz", 0.8, 20.0).with_sale_type(SaleType::Granel));

        assert!((cart.total_quantity() - 3.55).abs() < EPSILON);
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_granel_quantity_round_trip() {
        let base_price = 25.0;
        let entered_total = 137.50;
        let quantity = entered_total / base_price;

        let mut cart = Cart::new();
        cart.add_line(
            NewCartLine::new("40", "Azúcar", quantity, base_price)
                .with_base_price(base_price)
                .with_sale_type(SaleType::Granel),
        );

        let line = &cart.lines()[0];
        assert!((line.quantity - 5.5).abs() < EPSILON);
        assert!((line.total - 137.50).abs() < EPSILON);
        assert!(line.is_bulk());
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut cart = Cart::new();

        cart.add_line(piece("P1", 2.0, 10.0));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].total, 20.0);

        cart.add_line(piece("P1", 3.0, 10.0));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5.0);
        assert_eq!(cart.lines()[0].total, 50.0);

        cart.update_quantity("P1", None, 1.0);
        assert_eq!(cart.lines()[0].quantity, 1.0);
        assert_eq!(cart.lines()[0].total, 10.0);
        assert_eq!(cart.total(), 10.0);

        cart.clear();
        assert_eq!(cart.total(), 0.0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_serialized_shape_is_camel_case_array() {
        let mut cart = Cart::new();
        cart.add_line(piece("P1", 1.0, 10.0));

        let json = serde_json::to_value(&cart).unwrap();
        let first = &json.as_array().unwrap()[0];
        assert_eq!(first["productId"], "P1");
        assert_eq!(first["unitPrice"], 10.0);
        assert_eq!(first["saleType"], "Pieza");
        assert!(first.get("presentationId").is_none());
    }

    #[test]
    fn test_serde_round_trip_preserves_sequence() {
        let mut cart = Cart::new();
        cart.add_line(piece("A", 2.0, 10.0));
        cart.add_line(
            NewCartLine::new("B", "Cuaderno", 1.0, 45.0)
                .with_presentation("3", "Paquete 5")
                .with_base_price(45.0),
        );
        cart.add_line(
            NewCartLine::new("C", "Azúcar", 2.5, 24.0)
                .with_base_price(24.0)
                .with_sale_type(SaleType::Granel),
        );

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_reads_blob_written_by_older_clients() {
        let blob = r#"[{"productId":"5","productName":"Goma","quantity":2,
            "unitPrice":3.5,"total":7,"saleType":null},
            {"productId":12,"productName":"Cuaderno","presentationId":3,
            "presentationName":"Pieza","quantity":1,"unitPrice":35,"total":35},
            {"productId":40,"productName":"Lápiz","presentationId":null,
            "quantity":1,"unitPrice":5,"total":5}]"#;

        let cart: Cart = serde_json::from_str(blob).unwrap();
        assert_eq!(cart.len(), 3);
        assert_eq!(cart.lines()[0].sale_type, None);
        assert_eq!(cart.lines()[0].total, 7.0);

        assert_eq!(cart.lines()[1].product_id, "12");
        assert_eq!(cart.lines()[1].presentation_id.as_deref(), Some("3"));
        assert_eq!(cart.lines()[2].product_id, "40");
        assert_eq!(cart.lines()[2].presentation_id, None);
    }

    #[test]
    fn test_numeric_ids_merge_with_string_ids() {
        let blob = r#"[{"productId":12,"productName":"Cuaderno","presentationId":3,
            "quantity":1,"unitPrice":35,"total":35}]"#;
        let mut cart: Cart = serde_json::from_str(blob).unwrap();

        cart.add_line(NewCartLine::new("12", "Cuaderno", 2.0, 35.0).with_presentation("3", "Pieza"));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3.0);
        assert_eq!(cart.lines()[0].total, 105.0);
    }

    #[test]
    fn test_cart_totals_summary() {
        let mut cart = Cart::new();
        cart.add_line(piece("A", 2.0, 10.0));
        cart.add_line(piece("B", 1.0, 5.0));

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.total, 25.0);
    }
}
