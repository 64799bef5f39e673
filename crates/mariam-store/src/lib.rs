//! # mariam-store: Local Persistence for Mariam POS
//!
//! A key-value store of serialized blobs under fixed string keys. The mobile
//! client keeps exactly two entries in it: the cart and the backend URL.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          mariam-store                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  kv.rs       KeyValueStore trait + MemoryKeyValueStore          │   │
//! │  │              load_json / save_json                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  pool.rs     DbConfig + Database (SqlitePool, WAL)              │   │
//! │  │  migrations.rs  embedded migrations/sqlite/*.sql                │   │
//! │  │  repository/kv.rs  KeyValueRepository (impl KeyValueStore)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! use mariam_store::{Database, DbConfig, KeyValueStore};
//!
//! let db = Database::new(DbConfig::new("./mariam.db")).await?;
//! let kv = db.key_values();
//! kv.set_item("@mariam_pos_api_url", "http://10.0.0.5:3001").await?;
//! ```

pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{StoreError, StoreResult};
pub use kv::{load_json, save_json, KeyValueStore, MemoryKeyValueStore};
pub use pool::{Database, DbConfig};
pub use repository::kv::KeyValueRepository;
