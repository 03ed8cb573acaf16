//! Cart state machine.
//!
//! Pure, I/O-free cart state. Four invariants hold after every mutation:
//!
//! - every line belongs to the locked market;
//! - the market lock is set exactly when the cart is non-empty;
//! - every line's quantity is within `1..=product.stock`;
//! - no two lines share a product.
//!
//! Switching markets with a non-empty cart is a two-phase operation:
//! [`CartState::add_item`] returns [`AddOutcome::SwitchRequired`] and the
//! caller either resolves it with [`CartState::confirm_switch`] or drops the
//! pending value to decline.

use crate::catalog::{MarketUuid, ProductRecord};

use super::{
    errors::CartError,
    models::{CartLine, LineUuid},
};

/// Successful outcomes of [`CartState::add_item`].
#[derive(Debug, Clone)]
pub enum AddOutcome {
    /// A new line was appended.
    Added(LineUuid),

    /// The quantity was merged into an existing line for the same product.
    Merged(LineUuid),

    /// The product belongs to a different market than the locked one; the
    /// add is held back until confirmed.
    SwitchRequired(PendingAdd),
}

/// An add held back by the market lock, waiting for confirmation.
#[derive(Debug, Clone)]
pub struct PendingAdd {
    pub(crate) product: ProductRecord,
    pub(crate) quantity: u32,
    pub(crate) notes: Option<String>,
}

impl PendingAdd {
    /// The market the cart would switch to on confirmation.
    #[must_use]
    pub fn market(&self) -> MarketUuid {
        self.product.market_uuid
    }

    /// The product waiting to be added.
    #[must_use]
    pub fn product(&self) -> &ProductRecord {
        &self.product
    }
}

/// Outcomes of [`CartState::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The line's quantity was replaced.
    Updated,

    /// A zero quantity removed the line.
    Removed,

    /// No line matched the given identifier.
    NoSuchLine,
}

/// In-memory cart state: ordered lines plus the market lock.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    lines: Vec<CartLine>,
    locked_market: Option<MarketUuid>,
}

impl CartState {
    /// An empty, unlocked cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The single market all current lines belong to.
    #[must_use]
    pub fn locked_market(&self) -> Option<MarketUuid> {
        self.locked_market
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of effective line prices, in minor currency units.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Add `quantity` units of `product` to the cart.
    ///
    /// An existing line for the same product absorbs the quantity instead of
    /// duplicating; its notes are overwritten only by a new non-empty value.
    /// A product from a different market than the locked one is held back as
    /// [`AddOutcome::SwitchRequired`] while the cart is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] for a zero quantity,
    /// [`CartError::Unavailable`] for a product flagged unavailable, and
    /// [`CartError::StockExceeded`] when the resulting quantity would exceed
    /// the product's stock. The cart is unchanged in every error case.
    pub fn add_item(
        &mut self,
        product: ProductRecord,
        quantity: u32,
        notes: Option<String>,
    ) -> Result<AddOutcome, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        if !product.is_available {
            return Err(CartError::Unavailable);
        }

        if let Some(locked) = self.locked_market {
            if locked != product.market_uuid && !self.lines.is_empty() {
                return Ok(AddOutcome::SwitchRequired(PendingAdd {
                    product,
                    quantity,
                    notes,
                }));
            }
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.uuid == product.uuid)
        {
            let merged = line.quantity.saturating_add(quantity);

            if merged > product.stock {
                return Err(CartError::StockExceeded {
                    available: product.stock,
                });
            }

            line.quantity = merged;

            if let Some(notes) = notes.filter(|notes| !notes.is_empty()) {
                line.notes = Some(notes);
            }

            // Refresh the snapshot so later stock checks track the catalog
            // record the caller just read.
            line.product = product;

            return Ok(AddOutcome::Merged(line.uuid));
        }

        if quantity > product.stock {
            return Err(CartError::StockExceeded {
                available: product.stock,
            });
        }

        let uuid = LineUuid::now_v7();

        self.locked_market = Some(product.market_uuid);
        self.lines.push(CartLine {
            uuid,
            product,
            quantity,
            notes,
        });

        Ok(AddOutcome::Added(uuid))
    }

    /// Resolve a held-back add: clear the cart, adopt the pending product's
    /// market and perform the add.
    ///
    /// # Errors
    ///
    /// Returns the same rejections as [`CartState::add_item`]; the cart has
    /// already been cleared when one is returned.
    pub fn confirm_switch(&mut self, pending: PendingAdd) -> Result<AddOutcome, CartError> {
        self.clear();

        self.add_item(pending.product, pending.quantity, pending.notes)
    }

    /// Remove the line with the given identifier.
    ///
    /// Returns whether a line was removed. Removing the last line resets the
    /// market lock.
    pub fn remove_line(&mut self, line: LineUuid) -> bool {
        let before = self.lines.len();

        self.lines.retain(|entry| entry.uuid != line);

        if self.lines.is_empty() {
            self.locked_market = None;
        }

        self.lines.len() != before
    }

    /// Replace a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StockExceeded`] when the new quantity exceeds
    /// the line's snapshot stock; the line is unchanged.
    pub fn update_quantity(
        &mut self,
        line: LineUuid,
        quantity: u32,
    ) -> Result<UpdateOutcome, CartError> {
        if quantity == 0 {
            return Ok(if self.remove_line(line) {
                UpdateOutcome::Removed
            } else {
                UpdateOutcome::NoSuchLine
            });
        }

        let Some(entry) = self.lines.iter_mut().find(|entry| entry.uuid == line) else {
            return Ok(UpdateOutcome::NoSuchLine);
        };

        if quantity > entry.product.stock {
            return Err(CartError::StockExceeded {
                available: entry.product.stock,
            });
        }

        entry.quantity = quantity;

        Ok(UpdateOutcome::Updated)
    }

    /// Empty the cart and reset the market lock. Idempotent.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.locked_market = None;
    }

    /// Replace state wholesale from loaded rows; the lock is taken from the
    /// first line's market.
    pub(crate) fn restore(&mut self, lines: Vec<CartLine>) {
        self.locked_market = lines.first().map(|line| line.product.market_uuid);
        self.lines = lines;
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use crate::catalog::{ProductRecord, ProductUuid};

    use super::*;

    fn product(name: &str, market: MarketUuid, stock: u32, price: u64) -> ProductRecord {
        ProductRecord {
            uuid: ProductUuid::now_v7(),
            market_uuid: market,
            name: name.to_string(),
            description: String::new(),
            price,
            discount_price: None,
            stock,
            unit: "kg".to_string(),
            is_available: true,
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    fn added(result: Result<AddOutcome, CartError>) -> LineUuid {
        match result {
            Ok(AddOutcome::Added(uuid) | AddOutcome::Merged(uuid)) => uuid,
            other => panic!("expected an accepted add, got {other:?}"),
        }
    }

    #[test]
    fn first_add_locks_the_market() {
        let market = MarketUuid::now_v7();
        let mut cart = CartState::new();

        let outcome = cart.add_item(product("Tomatoes", market, 5, 3_00), 2, None);

        assert!(
            matches!(outcome, Ok(AddOutcome::Added(_))),
            "expected Added, got {outcome:?}"
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.locked_market(), Some(market));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut cart = CartState::new();

        let outcome = cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 0, None);

        assert_eq!(outcome.unwrap_err(), CartError::ZeroQuantity);
        assert!(cart.is_empty());
        assert_eq!(cart.locked_market(), None);
    }

    #[test]
    fn unavailable_product_is_rejected() {
        let mut cart = CartState::new();
        let mut tomatoes = product("Tomatoes", MarketUuid::now_v7(), 5, 3_00);
        tomatoes.is_available = false;

        let outcome = cart.add_item(tomatoes, 1, None);

        assert_eq!(outcome.unwrap_err(), CartError::Unavailable);
        assert!(cart.is_empty());
    }

    #[test]
    fn adding_same_product_merges_quantities() {
        let market = MarketUuid::now_v7();
        let tomatoes = product("Tomatoes", market, 10, 3_00);
        let mut cart = CartState::new();

        let first = added(cart.add_item(tomatoes.clone(), 2, None));
        let second = added(cart.add_item(tomatoes, 3, None));

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn merge_overwrites_notes_only_with_non_empty_value() {
        let market = MarketUuid::now_v7();
        let tomatoes = product("Tomatoes", market, 10, 3_00);
        let mut cart = CartState::new();

        added(cart.add_item(tomatoes.clone(), 1, Some("ripe ones".to_string())));
        added(cart.add_item(tomatoes.clone(), 1, None));

        assert_eq!(cart.lines()[0].notes.as_deref(), Some("ripe ones"));

        added(cart.add_item(tomatoes.clone(), 1, Some(String::new())));

        assert_eq!(cart.lines()[0].notes.as_deref(), Some("ripe ones"));

        added(cart.add_item(tomatoes, 1, Some("green ones".to_string())));

        assert_eq!(cart.lines()[0].notes.as_deref(), Some("green ones"));
    }

    #[test]
    fn fresh_add_beyond_stock_is_rejected() {
        let mut cart = CartState::new();

        let outcome = cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 6, None);

        assert_eq!(
            outcome.unwrap_err(),
            CartError::StockExceeded { available: 5 }
        );
        assert!(cart.is_empty());
        assert_eq!(cart.locked_market(), None);
    }

    #[test]
    fn merge_beyond_stock_is_rejected_and_state_unchanged() {
        let market = MarketUuid::now_v7();
        let tomatoes = product("Tomatoes", market, 5, 3_00);
        let mut cart = CartState::new();

        added(cart.add_item(tomatoes.clone(), 2, None));

        let outcome = cart.add_item(tomatoes, 4, None);

        assert_eq!(
            outcome.unwrap_err(),
            CartError::StockExceeded { available: 5 }
        );
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn foreign_market_add_is_held_back() {
        let mut cart = CartState::new();

        added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 1, None));

        let other_market = MarketUuid::now_v7();
        let outcome = cart.add_item(product("Olives", other_market, 5, 4_00), 1, None);

        match outcome {
            Ok(AddOutcome::SwitchRequired(pending)) => {
                assert_eq!(pending.market(), other_market);
            }
            other => panic!("expected SwitchRequired, got {other:?}"),
        }

        // Declining is just dropping the pending value.
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].product.name, "Tomatoes");
    }

    #[test]
    fn confirming_a_switch_clears_and_relocks() {
        let mut cart = CartState::new();

        added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        let other_market = MarketUuid::now_v7();
        let outcome = cart.add_item(product("Olives", other_market, 5, 4_00), 1, None);

        let Ok(AddOutcome::SwitchRequired(pending)) = outcome else {
            panic!("expected SwitchRequired, got {outcome:?}");
        };

        let confirmed = cart.confirm_switch(pending);

        assert!(
            matches!(confirmed, Ok(AddOutcome::Added(_))),
            "expected Added, got {confirmed:?}"
        );
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].product.name, "Olives");
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.locked_market(), Some(other_market));
    }

    #[test]
    fn confirmed_switch_beyond_stock_leaves_an_empty_unlocked_cart() {
        let mut cart = CartState::new();

        added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        let outcome = cart.add_item(product("Olives", MarketUuid::now_v7(), 2, 4_00), 3, None);

        let Ok(AddOutcome::SwitchRequired(pending)) = outcome else {
            panic!("expected SwitchRequired, got {outcome:?}");
        };

        let confirmed = cart.confirm_switch(pending);

        assert_eq!(
            confirmed.unwrap_err(),
            CartError::StockExceeded { available: 2 }
        );
        assert!(cart.is_empty());
        assert_eq!(cart.locked_market(), None);
    }

    #[test]
    fn relock_is_silent_when_cart_is_empty() {
        let mut cart = CartState::new();
        let first_market = MarketUuid::now_v7();

        let line = added(cart.add_item(product("Tomatoes", first_market, 5, 3_00), 1, None));
        assert!(cart.remove_line(line));

        let second_market = MarketUuid::now_v7();
        let outcome = cart.add_item(product("Olives", second_market, 5, 4_00), 1, None);

        assert!(
            matches!(outcome, Ok(AddOutcome::Added(_))),
            "expected Added without confirmation, got {outcome:?}"
        );
        assert_eq!(cart.locked_market(), Some(second_market));
    }

    #[test]
    fn removing_the_last_line_resets_the_lock() {
        let mut cart = CartState::new();

        let line = added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        assert!(cart.remove_line(line));
        assert!(cart.is_empty());
        assert_eq!(cart.locked_market(), None);
    }

    #[test]
    fn removing_an_unknown_line_is_a_no_op() {
        let mut cart = CartState::new();

        added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        assert!(!cart.remove_line(LineUuid::now_v7()));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn update_quantity_replaces_within_stock() {
        let mut cart = CartState::new();

        let line = added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        assert_eq!(cart.update_quantity(line, 4), Ok(UpdateOutcome::Updated));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn update_quantity_beyond_stock_is_rejected() {
        let mut cart = CartState::new();

        let line = added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        assert_eq!(
            cart.update_quantity(line, 6),
            Err(CartError::StockExceeded { available: 5 })
        );
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn update_quantity_to_zero_removes_the_line() {
        let mut cart = CartState::new();

        let line = added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        assert_eq!(cart.update_quantity(line, 0), Ok(UpdateOutcome::Removed));
        assert!(cart.is_empty());
        assert_eq!(cart.locked_market(), None);
    }

    #[test]
    fn update_quantity_on_unknown_line_is_a_no_op() {
        let mut cart = CartState::new();

        added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        assert_eq!(
            cart.update_quantity(LineUuid::now_v7(), 3),
            Ok(UpdateOutcome::NoSuchLine)
        );
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut cart = CartState::new();

        added(cart.add_item(product("Tomatoes", MarketUuid::now_v7(), 5, 3_00), 2, None));

        cart.clear();
        let after_once = (cart.len(), cart.locked_market());
        cart.clear();

        assert_eq!((cart.len(), cart.locked_market()), after_once);
        assert!(cart.is_empty());
    }

    #[test]
    fn total_prefers_discount_prices() {
        let market = MarketUuid::now_v7();
        let mut olives = product("Olives", market, 10, 4_00);
        olives.discount_price = Some(3_50);
        let mut cart = CartState::new();

        added(cart.add_item(product("Tomatoes", market, 10, 3_00), 2, None));
        added(cart.add_item(olives, 3, None));

        assert_eq!(cart.total(), 2 * 3_00 + 3 * 3_50);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn all_lines_share_the_locked_market_when_switches_are_declined() {
        let market = MarketUuid::now_v7();
        let mut cart = CartState::new();

        added(cart.add_item(product("Tomatoes", market, 10, 3_00), 1, None));
        added(cart.add_item(product("Olives", market, 10, 4_00), 2, None));

        // Held back, then dropped: a decline.
        let outcome = cart.add_item(product("Bread", MarketUuid::now_v7(), 10, 2_00), 1, None);
        assert!(
            matches!(outcome, Ok(AddOutcome::SwitchRequired(_))),
            "expected SwitchRequired, got {outcome:?}"
        );

        assert!(
            cart.lines()
                .iter()
                .all(|line| line.product.market_uuid == market),
            "every line must belong to the locked market"
        );
        assert_eq!(cart.locked_market(), Some(market));
    }

    #[test]
    fn no_two_lines_share_a_product() {
        let market = MarketUuid::now_v7();
        let tomatoes = product("Tomatoes", market, 10, 3_00);
        let mut cart = CartState::new();

        added(cart.add_item(tomatoes.clone(), 1, None));
        added(cart.add_item(product("Olives", market, 10, 4_00), 1, None));
        added(cart.add_item(tomatoes, 2, None));

        let mut products: Vec<_> = cart.lines().iter().map(CartLine::product_uuid).collect();
        products.sort();
        products.dedup();

        assert_eq!(products.len(), cart.len(), "product uuids must be unique");
    }

    #[test]
    fn restore_locks_to_the_first_line_market() {
        let market = MarketUuid::now_v7();
        let mut seed = CartState::new();
        added(seed.add_item(product("Tomatoes", market, 10, 3_00), 2, None));
        added(seed.add_item(product("Olives", market, 10, 4_00), 1, None));

        let mut cart = CartState::new();
        cart.restore(seed.lines().to_vec());

        assert_eq!(cart.locked_market(), Some(market));
        assert_eq!(cart.len(), 2);

        cart.restore(Vec::new());

        assert_eq!(cart.locked_market(), None);
        assert!(cart.is_empty());
    }
}
