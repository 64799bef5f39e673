//! # Repository Module
//!
//! SQLite-backed repositories for the local store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartLedger / Settings                                                 │
//! │       │                                                                 │
//! │       │  store.set_item("@mariam_pos_cart", "[...]")                   │
//! │       ▼                                                                 │
//! │  KeyValueRepository                                                    │
//! │  ├── get_item(&self, key)                                              │
//! │  ├── set_item(&self, key, value)   (upsert)                            │
//! │  ├── remove_item(&self, key)                                           │
//! │  └── keys(&self)                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  key_value_store table                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`KeyValueRepository`](kv::KeyValueRepository) - String blobs under string keys

pub mod kv;
