//! Cart Synchronizer
//!
//! Session-scoped wrapper around [`CartState`] that mirrors every mutation
//! to the remote store through a serialized writer queue and raises
//! storefront notifications. Local state is updated first; persistence is
//! queued and never awaited by the mutation itself.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    catalog::{MarketUuid, ProductRecord},
    notify::Notifier,
    users::UserUuid,
};

use super::{
    errors::CartError,
    models::{CartLine, LineUuid},
    state::{AddOutcome, CartState, PendingAdd, UpdateOutcome},
    store::CartStore,
    writer::CartWriter,
};

/// Result of [`CartSynchronizer::add_item`] and
/// [`CartSynchronizer::confirm_market_switch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddItemOutcome {
    /// A new line was appended and queued for persistence.
    Added(LineUuid),

    /// The quantity was merged into an existing line and queued for
    /// persistence.
    Merged(LineUuid),

    /// The mutation was rejected; the cart is unchanged.
    Rejected(CartError),

    /// The product belongs to another market. Resolve with
    /// [`CartSynchronizer::confirm_market_switch`] or
    /// [`CartSynchronizer::cancel_market_switch`].
    SwitchRequired(MarketUuid),
}

/// Per-session cart synchronizer for one authenticated user.
pub struct CartSynchronizer {
    user: UserUuid,
    state: CartState,
    pending_switch: Option<PendingAdd>,
    store: Arc<dyn CartStore>,
    notifier: Arc<dyn Notifier>,
    writer: CartWriter,
}

impl CartSynchronizer {
    /// Create an empty synchronizer for `user` and spawn its writer task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, since the writer task is
    /// spawned onto the current runtime.
    #[must_use]
    pub fn new(user: UserUuid, store: Arc<dyn CartStore>, notifier: Arc<dyn Notifier>) -> Self {
        let writer = CartWriter::spawn(store.clone(), user);

        Self {
            user,
            state: CartState::new(),
            pending_switch: None,
            store,
            notifier,
            writer,
        }
    }

    /// Load the user's persisted lines, replacing local state.
    ///
    /// Fetch failures are logged and leave the current state intact; no
    /// user-facing notification is raised.
    #[tracing::instrument(skip(self), fields(user = %self.user))]
    pub async fn load(&mut self) {
        match self.store.fetch_lines(self.user).await {
            Ok(lines) => {
                info!(count = lines.len(), "loaded cart");
                self.state.restore(lines);
            }
            Err(error) => {
                warn!(%error, "failed to load cart, keeping local state");
            }
        }
    }

    /// Add `quantity` units of `product` to the cart.
    ///
    /// On success a toast names the added product and a snapshot is queued.
    /// A stock rejection raises an error toast citing the available count.
    /// A market conflict is held back as [`AddItemOutcome::SwitchRequired`].
    pub fn add_item(
        &mut self,
        product: ProductRecord,
        quantity: u32,
        notes: Option<String>,
    ) -> AddItemOutcome {
        let name = product.name.clone();

        match self.state.add_item(product, quantity, notes) {
            Ok(AddOutcome::Added(uuid)) => {
                self.notifier
                    .notify_success(&format!("Added {name} to cart"));
                self.persist();

                AddItemOutcome::Added(uuid)
            }
            Ok(AddOutcome::Merged(uuid)) => {
                self.persist();

                AddItemOutcome::Merged(uuid)
            }
            Ok(AddOutcome::SwitchRequired(pending)) => {
                let market = pending.market();
                self.pending_switch = Some(pending);

                AddItemOutcome::SwitchRequired(market)
            }
            Err(error) => {
                self.notify_rejection(&error);

                AddItemOutcome::Rejected(error)
            }
        }
    }

    /// The market a pending switch would adopt, if one is awaiting a
    /// decision.
    #[must_use]
    pub fn pending_market_switch(&self) -> Option<MarketUuid> {
        self.pending_switch.as_ref().map(PendingAdd::market)
    }

    /// Confirm the pending market switch: clears the cart, adopts the new
    /// market and performs the held-back add. Returns `None` when no switch
    /// is pending.
    pub fn confirm_market_switch(&mut self) -> Option<AddItemOutcome> {
        let pending = self.pending_switch.take()?;
        let name = pending.product().name.clone();

        let outcome = match self.state.confirm_switch(pending) {
            Ok(AddOutcome::Added(uuid)) => {
                self.notifier
                    .notify_success(&format!("Added {name} to cart"));

                AddItemOutcome::Added(uuid)
            }
            Ok(AddOutcome::Merged(uuid)) => AddItemOutcome::Merged(uuid),
            Ok(AddOutcome::SwitchRequired(pending)) => {
                // Unreachable in practice: the cart was just cleared, and an
                // empty cart never holds an add back.
                let market = pending.market();
                self.pending_switch = Some(pending);

                AddItemOutcome::SwitchRequired(market)
            }
            Err(error) => {
                self.notify_rejection(&error);

                AddItemOutcome::Rejected(error)
            }
        };

        // The cart was cleared even when the re-add was rejected, so the
        // remote rows must be dropped either way.
        self.persist();

        Some(outcome)
    }

    /// Decline the pending market switch, leaving the cart untouched.
    pub fn cancel_market_switch(&mut self) {
        self.pending_switch = None;
    }

    /// Remove the line with the given identifier; no-op if absent.
    pub fn remove_line(&mut self, line: LineUuid) {
        if self.state.remove_line(line) {
            self.persist();
        }
    }

    /// Replace a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StockExceeded`] (after raising the stock toast)
    /// when the new quantity exceeds the line's snapshot stock.
    pub fn update_quantity(
        &mut self,
        line: LineUuid,
        quantity: u32,
    ) -> Result<UpdateOutcome, CartError> {
        match self.state.update_quantity(line, quantity) {
            Ok(outcome) => {
                if matches!(outcome, UpdateOutcome::Updated | UpdateOutcome::Removed) {
                    self.persist();
                }

                Ok(outcome)
            }
            Err(error) => {
                self.notify_rejection(&error);

                Err(error)
            }
        }
    }

    /// Empty the cart, locally and remotely. Idempotent.
    pub fn clear(&mut self) {
        self.state.clear();
        self.pending_switch = None;
        self.persist();
    }

    /// Drop local state without touching the remote rows; they are restored
    /// by [`CartSynchronizer::load`] on the user's next session.
    pub fn sign_out(&mut self) {
        self.state.clear();
        self.pending_switch = None;
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.state.lines()
    }

    /// The single market all current lines belong to.
    #[must_use]
    pub fn locked_market(&self) -> Option<MarketUuid> {
        self.state.locked_market()
    }

    /// Sum of effective line prices, in minor currency units.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.state.total()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.state.item_count()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Wait until every queued snapshot has been attempted against the
    /// store.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    fn persist(&self) {
        self.writer.enqueue(self.state.lines().to_vec());
    }

    fn notify_rejection(&self, error: &CartError) {
        match error {
            CartError::StockExceeded { available } => {
                self.notifier.notify_error(&format!(
                    "Sorry, only {available} items available in stock"
                ));
            }
            CartError::Unavailable => {
                self.notifier
                    .notify_error("Sorry, this product is currently unavailable");
            }
            // An API misuse rather than a shopper action; nothing to toast.
            CartError::ZeroQuantity => {}
        }
    }
}
