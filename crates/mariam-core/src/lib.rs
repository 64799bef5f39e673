//! # mariam-core: Pure Cart Logic for Mariam POS
//!
//! This crate holds the part of the mobile client that carries real
//! invariants: the cart ledger. Everything here is synchronous, in-memory
//! and free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Mariam POS Mobile Client                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI shell (screens)                           │   │
//! │  │    Products ──► Scanner ──► Cart ──► Send to cashier            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              apps/mobile (CartLedger, checkout, API)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ mariam-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   cart    │  │  catalog  │  │ submission │  │ validation│  │   │
//! │  │   │ CartLine  │  │ Product   │  │ PendingSale│  │  entered  │  │   │
//! │  │   │ Cart      │  │ piece/bulk│  │  Request   │  │  amounts  │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORAGE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart lines and the ledger operations (merge, update, remove)
//! - [`types`] - Sale type and line identity key
//! - [`catalog`] - Backend product shapes and the piece/bulk add flows
//! - [`submission`] - Translation of cart lines into a pending sale request
//! - [`validation`] - Caller-side validation of user input
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use mariam_core::cart::{Cart, NewCartLine};
//! use mariam_core::types::SaleType;
//!
//! let mut cart = Cart::new();
//! cart.add_line(NewCartLine::new("P1", "Cuaderno", 2.0, 10.0).with_sale_type(SaleType::Pieza));
//! cart.add_line(NewCartLine::new("P1", "Cuaderno", 3.0, 10.0).with_sale_type(SaleType::Pieza));
//!
//! assert_eq!(cart.lines().len(), 1);
//! assert_eq!(cart.total(), 50.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod submission;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals, NewCartLine};
pub use catalog::{Presentation, Product};
pub use error::{CoreError, CoreResult, ValidationError};
pub use submission::{PendingSale, PendingSaleDetail, PendingSaleRequest};
pub use types::{LineKey, SaleType};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Key under which the whole cart is persisted in the key-value store.
///
/// Shared with earlier client releases; carts they saved restore as-is.
pub const CART_STORAGE_KEY: &str = "@mariam_pos_cart";

/// Key under which the configured backend URL is persisted.
pub const API_URL_STORAGE_KEY: &str = "@mariam_pos_api_url";

/// Backend URL used until the user saves another one.
pub const DEFAULT_API_URL: &str = "http://192.168.0.17:3001";

/// Branch name sent with every pending sale.
pub const DEFAULT_BRANCH: &str = "Sucursal Default";

/// Cash register name sent with every pending sale.
pub const DEFAULT_CASH_REGISTER: &str = "Caja 1";
