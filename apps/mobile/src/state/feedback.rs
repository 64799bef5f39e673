//! # Add Confirmation
//!
//! The audible/haptic acknowledgement fired when a line is added to the cart.
//!
//! The ledger runs every confirmation on a detached task and only logs its
//! outcome, so a sink is free to be slow or to fail.
//!
//! ```text
//! CartLedger::add_line ──► (mutation done) ──► spawn ──► sink.confirm(&line)
//!                                                             │
//!                                              Err / panic ──► tracing::warn!
//! ```

use async_trait::async_trait;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

use mariam_core::CartLine;

/// Confirmation failures. Never surfaced to the ledger's caller.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Confirmation output failed: {0}")]
    Output(#[from] std::io::Error),

    #[error("Confirmation device unavailable: {0}")]
    Unavailable(String),
}

/// Receives a notification for every added line.
#[async_trait]
pub trait ConfirmationSink: Send + Sync {
    async fn confirm(&self, line: &CartLine) -> Result<(), FeedbackError>;
}

/// Sink that does nothing (sound disabled).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopConfirmation;

#[async_trait]
impl ConfirmationSink for NoopConfirmation {
    async fn confirm(&self, _line: &CartLine) -> Result<(), FeedbackError> {
        Ok(())
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct BellConfirmation;

#[async_trait]
impl ConfirmationSink for BellConfirmation {
    async fn confirm(&self, line: &CartLine) -> Result<(), FeedbackError> {
        ring_bell()?;
        debug!(product_id = %line.product_id, "Bell confirmation");
        Ok(())
    }
}

fn ring_bell() -> std::io::Result<()> {
    let mut stderr = std::io::stderr().lock();
    stderr.write_all(b"\x07")?;
    stderr.flush()
}
