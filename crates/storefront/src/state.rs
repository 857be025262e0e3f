//! Application state: catalog, basket, order draft, and current screen.
//!
//! `AppState` is a cheaply cloneable handle (`Rc`) with interior mutability.
//! Every mutation releases its borrow before publishing, so subscribers may
//! read the state while handling the notification.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use larek_core::{
    Card, CardId, CurrencyFormat, FieldId, OrderDraft, OrderRequest, PaymentMethod, Price,
};
use rust_decimal::Decimal;

use crate::error::{Result, StorefrontError};
use crate::events::{StateChange, StoreBus, StoreEvent, topics};
use crate::validation::{self, ValidationResult};

/// Which region re-renders on a generic `state:update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Screen {
    #[default]
    None,
    CardPreview,
    Basket,
    OrderForm,
    Success,
}

#[derive(Default)]
struct Catalog {
    cards: Vec<Card>,
    index: HashMap<CardId, usize>,
}

impl Catalog {
    fn new(cards: Vec<Card>) -> Self {
        let index = cards
            .iter()
            .enumerate()
            .map(|(position, card)| (card.id.clone(), position))
            .collect();
        Self { cards, index }
    }

    fn get(&self, id: &CardId) -> Option<&Card> {
        self.index.get(id).and_then(|&position| self.cards.get(position))
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Rc<AppStateInner>,
}

struct AppStateInner {
    events: StoreBus,
    currency: CurrencyFormat,
    catalog: RefCell<Catalog>,
    basket: RefCell<Vec<CardId>>,
    order: RefCell<OrderDraft>,
    screen: Cell<Screen>,
}

impl AppState {
    /// Create an empty state publishing on `events`.
    #[must_use]
    pub fn new(events: StoreBus, currency: CurrencyFormat) -> Self {
        Self {
            inner: Rc::new(AppStateInner {
                events,
                currency,
                catalog: RefCell::new(Catalog::default()),
                basket: RefCell::new(Vec::new()),
                order: RefCell::new(OrderDraft::default()),
                screen: Cell::new(Screen::None),
            }),
        }
    }

    /// The bus this state publishes on.
    #[must_use]
    pub fn events(&self) -> &StoreBus {
        &self.inner.events
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Replace the catalog and publish `cards:changed` with the new snapshot.
    ///
    /// Basket entries that no longer exist in the catalog are dropped.
    pub fn load_cards(&self, cards: Vec<Card>) {
        let snapshot = cards.clone();
        let catalog = Catalog::new(cards);

        let dropped = {
            let mut basket = self.inner.basket.borrow_mut();
            let before = basket.len();
            basket.retain(|id| catalog.index.contains_key(id));
            before - basket.len()
        };
        if dropped > 0 {
            tracing::warn!(dropped, "Removed basket items missing from the new catalog");
        }

        *self.inner.catalog.borrow_mut() = catalog;
        tracing::info!(count = snapshot.len(), "Catalog loaded");

        self.inner
            .events
            .emit(topics::CARDS_CHANGED, &StoreEvent::CardsChanged(snapshot));
    }

    /// All cards, in load order.
    #[must_use]
    pub fn cards(&self) -> Vec<Card> {
        self.inner.catalog.borrow().cards.clone()
    }

    /// Look up a card.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::NotFound` if the id is not in the catalog.
    pub fn get_card(&self, id: &CardId) -> Result<Card> {
        self.inner
            .catalog
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| StorefrontError::NotFound(id.clone()))
    }

    // =========================================================================
    // Basket
    // =========================================================================

    /// Returns `true` if the card is in the basket.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.inner.basket.borrow().contains(id)
    }

    /// Add a card to the end of the basket. Returns `false` (and does nothing)
    /// if it is already there or not in the catalog.
    pub fn add_card(&self, id: CardId) -> bool {
        if self.inner.catalog.borrow().get(&id).is_none() {
            tracing::warn!(card_id = %id, "Ignoring basket add for unknown card");
            return false;
        }

        {
            let mut basket = self.inner.basket.borrow_mut();
            if basket.contains(&id) {
                return false;
            }
            basket.push(id.clone());
        }

        tracing::debug!(card_id = %id, "Added to basket");
        self.notify(StateChange {
            id: Some(id),
            field: None,
        });
        true
    }

    /// Remove a card from the basket. Returns `false` if it was not there.
    pub fn remove_card(&self, id: &CardId) -> bool {
        {
            let mut basket = self.inner.basket.borrow_mut();
            let Some(position) = basket.iter().position(|item| item == id) else {
                return false;
            };
            basket.remove(position);
        }

        tracing::debug!(card_id = %id, "Removed from basket");
        self.notify(StateChange {
            id: Some(id.clone()),
            field: None,
        });
        true
    }

    /// Add the card if absent, remove it if present. Returns whether the card
    /// is in the basket afterwards.
    pub fn toggle_card(&self, id: CardId) -> bool {
        if self.contains(&id) {
            self.remove_card(&id);
            false
        } else {
            self.add_card(id)
        }
    }

    /// Basket contents in insertion order.
    #[must_use]
    pub fn get_basket_card_id(&self) -> Vec<CardId> {
        self.inner.basket.borrow().clone()
    }

    #[must_use]
    pub fn basket_len(&self) -> usize {
        self.inner.basket.borrow().len()
    }

    /// Sum of basket prices; priceless items count as zero.
    #[must_use]
    pub fn get_total(&self) -> Decimal {
        let catalog = self.inner.catalog.borrow();
        self.inner
            .basket
            .borrow()
            .iter()
            .filter_map(|id| catalog.get(id))
            .map(|card| card.price)
            .sum()
    }

    /// Empty the basket.
    pub fn clear_basket(&self) {
        self.inner.basket.borrow_mut().clear();
        self.notify(StateChange::default());
    }

    // =========================================================================
    // Order draft
    // =========================================================================

    /// Overwrite an order field and publish `state:update` naming it.
    pub fn set_order_field(&self, field: FieldId, value: &str) {
        self.inner.order.borrow_mut().set(field, value);
        tracing::debug!(field = %field, "Order field updated");
        self.notify(StateChange {
            id: None,
            field: Some(field),
        });
    }

    /// Select the payment method.
    pub fn set_payment(&self, method: PaymentMethod) {
        self.set_order_field(FieldId::PAYMENT, method.as_str());
    }

    /// Snapshot of the order draft.
    #[must_use]
    pub fn get_order(&self) -> OrderDraft {
        self.inner.order.borrow().clone()
    }

    /// Reset every order field.
    pub fn clear_order(&self) {
        self.inner.order.borrow_mut().clear();
        self.notify(StateChange::default());
    }

    /// Validate the current draft.
    #[must_use]
    pub fn validate_order(&self) -> ValidationResult {
        validation::validate_order(&self.inner.order.borrow())
    }

    /// Build the submission payload from the draft and basket.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Validation` if the draft is incomplete.
    pub fn order_request(&self) -> Result<OrderRequest> {
        let validation = self.validate_order();
        let draft = self.get_order();
        let Some(payment) = draft.payment.filter(|_| validation.is_empty()) else {
            return Err(StorefrontError::Validation(validation));
        };

        Ok(OrderRequest {
            payment,
            address: draft.address,
            email: draft.email,
            phone: draft.phone,
            items: self.get_basket_card_id(),
            total: self.get_total(),
        })
    }

    // =========================================================================
    // Screen
    // =========================================================================

    pub fn set_state(&self, screen: Screen) {
        let previous = self.inner.screen.replace(screen);
        if previous != screen {
            tracing::debug!(from = ?previous, to = ?screen, "Screen changed");
        }
    }

    #[must_use]
    pub fn get_state(&self) -> Screen {
        self.inner.screen.get()
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    /// Format a nullable price for display.
    #[must_use]
    pub fn format_currency(&self, price: Price) -> String {
        self.inner.currency.format(price)
    }

    /// Format a definite amount, such as a total.
    #[must_use]
    pub fn format_amount(&self, amount: Decimal) -> String {
        self.inner.currency.format_amount(amount)
    }

    fn notify(&self, change: StateChange) {
        self.inner
            .events
            .emit(topics::STATE_UPDATE, &StoreEvent::StateChanged(change));
    }
}
