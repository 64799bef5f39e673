//! # State Module
//!
//! Long-lived state owned by the composition root ([`App`](crate::App)) and
//! handed explicitly to whatever needs it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │          ┌──────────────────┬──────────────────┬──────────────────┐    │
//! │          ▼                  ▼                  ▼                  ▼    │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │  CartLedger  │  │   Settings   │  │ ClientConfig │  │ Confirma-  │  │
//! │  │              │  │              │  │              │  │ tionSink   │  │
//! │  │  Arc<Mutex<  │  │  api url in  │  │  branch,     │  │ bell /     │  │
//! │  │   Cart>>     │  │  kv store    │  │  register    │  │ noop       │  │
//! │  └──────┬───────┘  └──────┬───────┘  └──────────────┘  └────────────┘  │
//! │         │                 │                                             │
//! │         └────────┬────────┘                                             │
//! │                  ▼                                                      │
//! │          Arc<dyn KeyValueStore>                                         │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartLedger: std Mutex, never held across .await                     │
//! │  • Settings: stateless, reads the store on demand                      │
//! │  • ClientConfig: read-only after startup                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod feedback;
pub mod ledger;
pub mod settings;

pub use config::{ClientConfig, ConfigError};
pub use feedback::{BellConfirmation, ConfirmationSink, FeedbackError, NoopConfirmation};
pub use ledger::{CartLedger, LoadState};
pub use settings::Settings;
