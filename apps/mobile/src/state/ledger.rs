//! # Cart Ledger
//!
//! The application's single cart: the pure [`Cart`] from `mariam-core`,
//! wrapped with persistence, a load gate and the add confirmation.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CartLedger State Machine                           │
//! │                                                                         │
//! │  CartLedger::start(store, sink)                                        │
//! │       │   cart = [], journal = []                                       │
//! │       ▼                                                                 │
//! │  ┌───────────────┐  loader task   ┌───────────┐                        │
//! │  │ Uninitialized │ ─────────────► │  Loading  │                        │
//! │  └───────────────┘                └─────┬─────┘                        │
//! │        │                                │ get_item("@mariam_pos_cart")  │
//! │        │  add / remove / update / clear │                               │
//! │        │  ──► applied to memory         │                               │
//! │        │  ──► appended to journal       ▼                               │
//! │        │                          ┌───────────┐                        │
//! │        └────────────────────────► │   Ready   │                        │
//! │                                   └───────────┘                        │
//! │            cart = snapshot + journal replayed in order                  │
//! │            journal non-empty? ──► one write of the merged cart          │
//! │                                                                         │
//! │  Ready: every change ──► WriteCommand ──► writer task ──► store         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write-back
//! Writes go through an unbounded channel to a single writer task, so they
//! reach the store in mutation order and no mutation waits on I/O. A failed
//! write is logged; memory stays authoritative until the next write.
//!
//! ## Thread Safety
//! `CartLedger` is a cheap `Arc` handle. The cart sits behind a
//! `std::sync::Mutex` that is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};
use ts_rs::TS;

use mariam_core::{Cart, CartLine, CartTotals, LineKey, NewCartLine, CART_STORAGE_KEY};
use mariam_store::{load_json, save_json, KeyValueStore};

use super::feedback::ConfirmationSink;

// =============================================================================
// Load State
// =============================================================================

/// Where the ledger is in restoring the persisted cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum LoadState {
    /// Constructed; the loader task has not run yet.
    Uninitialized,
    /// Reading the persisted cart.
    Loading,
    /// Persisted cart applied; changes are written through.
    Ready,
}

// =============================================================================
// Internals
// =============================================================================

/// A ledger operation, kept for replay while the load is pending.
#[derive(Debug, Clone)]
enum Mutation {
    Add(NewCartLine),
    Remove(LineKey),
    SetQuantity(LineKey, f64),
    Clear,
}

impl Mutation {
    fn apply(&self, cart: &mut Cart) {
        match self {
            Mutation::Add(candidate) => {
                cart.add_line(candidate.clone());
            }
            Mutation::Remove(key) => {
                cart.remove_line(&key.product_id, key.presentation_id.as_deref());
            }
            Mutation::SetQuantity(key, quantity) => {
                cart.update_quantity(&key.product_id, key.presentation_id.as_deref(), *quantity);
            }
            Mutation::Clear => cart.clear(),
        }
    }
}

/// Work for the writer task.
#[derive(Debug)]
enum WriteCommand {
    Save(Vec<CartLine>),
    Erase,
    Flush(oneshot::Sender<()>),
}

struct Inner {
    cart: Cart,
    state: LoadState,
    journal: Vec<Mutation>,
}

impl Inner {
    /// Records a mutation that has already been applied to `cart` and
    /// returns the write it calls for, if any.
    fn commit(&mut self, mutation: Mutation, changed: bool) -> Option<WriteCommand> {
        if self.state != LoadState::Ready {
            self.journal.push(mutation);
            return None;
        }

        match mutation {
            Mutation::Clear => Some(WriteCommand::Erase),
            _ if changed => Some(WriteCommand::Save(self.cart.lines().to_vec())),
            _ => None,
        }
    }
}

struct Shared {
    inner: Mutex<Inner>,
    writer: mpsc::UnboundedSender<WriteCommand>,
    state_tx: watch::Sender<LoadState>,
    confirmation: Arc<dyn ConfirmationSink>,
    runtime: Handle,
}

// =============================================================================
// Cart Ledger
// =============================================================================

/// Handle to the application's cart.
///
/// Every operation returns immediately and never fails: persistence and
/// confirmation problems are logged, not returned.
///
/// ## Example
/// ```rust,ignore
/// let ledger = CartLedger::start(store, Arc::new(NoopConfirmation));
/// ledger.add_line(NewCartLine::new("12", "Cuaderno", 2.0, 35.0));
/// assert_eq!(ledger.total(), 70.0);
/// ```
#[derive(Clone)]
pub struct CartLedger {
    shared: Arc<Shared>,
}

impl CartLedger {
    /// Creates an empty ledger and starts restoring the persisted cart.
    ///
    /// Spawns the writer and loader tasks on the current Tokio runtime.
    ///
    /// # Panics
    /// When called outside a Tokio runtime.
    pub fn start(store: Arc<dyn KeyValueStore>, confirmation: Arc<dyn ConfirmationSink>) -> Self {
        let runtime = Handle::current();
        let (writer, commands) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(LoadState::Uninitialized);

        let ledger = CartLedger {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    cart: Cart::new(),
                    state: LoadState::Uninitialized,
                    journal: Vec::new(),
                }),
                writer,
                state_tx,
                confirmation,
                runtime: runtime.clone(),
            }),
        };

        runtime.spawn(run_writer(Arc::clone(&store), commands));

        let loader = ledger.clone();
        runtime.spawn(async move { loader.load(store).await });

        debug!("Cart ledger started");
        ledger
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds a line, merging with an existing line of the same key.
    ///
    /// On merge the existing line's price is kept. Fires the add
    /// confirmation in the background.
    ///
    /// ## Returns
    /// The line as it stands after the add.
    pub fn add_line(&self, candidate: NewCartLine) -> CartLine {
        let line = {
            let mut inner = self.lock();
            let line = inner.cart.add_line(candidate.clone()).clone();
            let write = inner.commit(Mutation::Add(candidate), true);
            self.dispatch(write);
            line
        };

        debug!(
            product_id = %line.product_id,
            presentation_id = ?line.presentation_id,
            quantity = line.quantity,
            total = line.total,
            "Line added"
        );

        self.confirm(line.clone());
        line
    }

    /// Removes the line with the given key.
    ///
    /// ## Returns
    /// `true` if a line was removed; removing an absent key is a no-op.
    pub fn remove_line(&self, product_id: &str, presentation_id: Option<&str>) -> bool {
        let removed = {
            let mut inner = self.lock();
            let removed = inner.cart.remove_line(product_id, presentation_id);
            let key = LineKey::new(product_id, presentation_id);
            let write = inner.commit(Mutation::Remove(key), removed);
            self.dispatch(write);
            removed
        };

        debug!(product_id, ?presentation_id, removed, "Remove line");
        removed
    }

    /// Sets a line's quantity; `quantity <= 0` removes the line.
    ///
    /// ## Returns
    /// `true` if a line was changed or removed.
    pub fn update_quantity(
        &self,
        product_id: &str,
        presentation_id: Option<&str>,
        quantity: f64,
    ) -> bool {
        let changed = {
            let mut inner = self.lock();
            let changed = inner
                .cart
                .update_quantity(product_id, presentation_id, quantity);
            let key = LineKey::new(product_id, presentation_id);
            let write = inner.commit(Mutation::SetQuantity(key, quantity), changed);
            self.dispatch(write);
            changed
        };

        debug!(product_id, ?presentation_id, quantity, changed, "Update quantity");
        changed
    }

    /// Empties the cart and deletes the persisted copy.
    pub fn clear(&self) {
        {
            let mut inner = self.lock();
            inner.cart.clear();
            let write = inner.commit(Mutation::Clear, true);
            self.dispatch(write);
        }

        debug!("Cart cleared");
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Snapshot of the lines in display order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().cart.lines().to_vec()
    }

    /// The line with the given key, if present.
    pub fn find(&self, product_id: &str, presentation_id: Option<&str>) -> Option<CartLine> {
        self.lock().cart.find(product_id, presentation_id).cloned()
    }

    /// Sum of line totals.
    pub fn total(&self) -> f64 {
        self.lock().cart.total()
    }

    /// Sum of quantities, rounded for display.
    pub fn item_count(&self) -> i64 {
        self.lock().cart.item_count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().cart.is_empty()
    }

    /// Line count, item count and total in one read.
    pub fn totals(&self) -> CartTotals {
        CartTotals::from(&self.lock().cart)
    }

    pub fn load_state(&self) -> LoadState {
        self.lock().state
    }

    /// Receiver that observes load state changes.
    pub fn subscribe_load_state(&self) -> watch::Receiver<LoadState> {
        self.shared.state_tx.subscribe()
    }

    // -------------------------------------------------------------------------
    // Synchronization points
    // -------------------------------------------------------------------------

    /// Resolves once the persisted cart has been applied.
    pub async fn ready(&self) {
        let mut state = self.subscribe_load_state();
        let _ = state.wait_for(|s| *s == LoadState::Ready).await;
    }

    /// Resolves once the load has been applied and every write queued so far
    /// has been attempted.
    ///
    /// Add confirmations are fire-and-forget and are not awaited here, so a
    /// confirmation may still be running when this returns.
    pub async fn flush(&self) {
        self.ready().await;

        let (done_tx, done_rx) = oneshot::channel();
        if self.shared.writer.send(WriteCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while locked cannot leave the cart half-updated: every
        // mutation is a single call into `Cart`.
        self.shared
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues a write. Called with the lock held so writes keep mutation order.
    fn dispatch(&self, write: Option<WriteCommand>) {
        if let Some(command) = write {
            if self.shared.writer.send(command).is_err() {
                warn!("Cart writer has stopped; change kept in memory only");
            }
        }
    }

    fn confirm(&self, line: CartLine) {
        let sink = Arc::clone(&self.shared.confirmation);
        let task = self
            .shared
            .runtime
            .spawn(async move { sink.confirm(&line).await });

        self.shared.runtime.spawn(async move {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Add confirmation failed"),
                Err(e) if e.is_panic() => error!("Add confirmation panicked"),
                Err(e) => debug!(error = %e, "Add confirmation cancelled"),
            }
        });
    }

    async fn load(&self, store: Arc<dyn KeyValueStore>) {
        self.begin_load();

        let snapshot = match load_json::<Cart, _>(store.as_ref(), CART_STORAGE_KEY).await {
            Ok(Some(cart)) => {
                info!(lines = cart.len(), "Restored persisted cart");
                cart
            }
            Ok(None) => {
                debug!("No persisted cart");
                Cart::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart, starting empty");
                Cart::new()
            }
        };

        self.finish_load(snapshot);
    }

    fn begin_load(&self) {
        let mut inner = self.lock();
        if inner.state == LoadState::Uninitialized {
            inner.state = LoadState::Loading;
            self.shared.state_tx.send_replace(LoadState::Loading);
        }
    }

    /// Replays the journal on top of `snapshot` and opens the gate.
    fn finish_load(&self, mut snapshot: Cart) {
        let mut inner = self.lock();
        let journal = std::mem::take(&mut inner.journal);

        for mutation in &journal {
            mutation.apply(&mut snapshot);
        }

        if !journal.is_empty() {
            let cleared = journal.iter().any(|m| matches!(m, Mutation::Clear));
            let write = if cleared && snapshot.is_empty() {
                WriteCommand::Erase
            } else {
                WriteCommand::Save(snapshot.lines().to_vec())
            };
            self.dispatch(Some(write));

            info!(
                replayed = journal.len(),
                lines = snapshot.len(),
                "Merged early cart changes with persisted cart"
            );
        }

        inner.cart = snapshot;
        inner.state = LoadState::Ready;
        self.shared.state_tx.send_replace(LoadState::Ready);
    }
}

impl std::fmt::Debug for CartLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("CartLedger")
            .field("state", &inner.state)
            .field("lines", &inner.cart.len())
            .field("journal", &inner.journal.len())
            .finish()
    }
}

// =============================================================================
// Writer Task
// =============================================================================

async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    mut commands: mpsc::UnboundedReceiver<WriteCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            WriteCommand::Save(lines) => {
                match save_json(store.as_ref(), CART_STORAGE_KEY, &lines).await {
                    Ok(()) => debug!(lines = lines.len(), "Cart persisted"),
                    Err(e) => warn!(error = %e, lines = lines.len(), "Failed to persist cart"),
                }
            }
            WriteCommand::Erase => match store.remove_item(CART_STORAGE_KEY).await {
                Ok(()) => debug!("Persisted cart erased"),
                Err(e) => warn!(error = %e, "Failed to erase persisted cart"),
            },
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    debug!("Cart writer stopped");
}

// =============================================================================
// Unit Tests
// =============================================================================
