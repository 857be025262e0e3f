//! Screen state machine.
//!
//! The dispatcher subscribes to UI and state events on the shared bus and
//! decides which regions re-render, and with what derived data.
//!
//! # Borrowing
//!
//! Handlers run re-entrantly: a state mutation publishes `state:update`, which
//! runs the dispatcher's own generic handler before the mutation returns. The
//! regions are therefore only borrowed for rendering, never while the state is
//! mutated or an event is emitted.
//!
//! # Async work
//!
//! Order submission is spawned with [`tokio::task::spawn_local`], so a
//! `contacts:submit` must be emitted from inside a `LocalSet`. The task's only
//! continuation is an `order:placed` or `order:failed` event.

mod render;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use larek_core::{CardId, Namespace};

use crate::error::{Result, StorefrontError, add_breadcrumb};
use crate::events::{HandlerId, StateChange, StoreEvent, Topic, topics};
use crate::services::OrderService;
use crate::state::{AppState, Screen};
use crate::views::{ModalContent, Regions};

pub use render::button_label;

/// Sub-view of the order form screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStep {
    #[default]
    Delivery,
    Contacts,
}

/// Owns the regions and the subscriptions that drive them.
///
/// Dropping the dispatcher unsubscribes every handler.
pub struct Dispatcher {
    inner: Rc<DispatcherInner>,
}

struct DispatcherInner {
    state: AppState,
    regions: RefCell<Regions>,
    service: Rc<dyn OrderService>,
    preview: RefCell<Option<CardId>>,
    step: Cell<OrderStep>,
    submitting: Cell<bool>,
    failure: RefCell<Option<String>>,
    subscriptions: RefCell<Vec<(Topic, HandlerId)>>,
}

impl Dispatcher {
    /// Subscribe to every storefront topic on the state's bus.
    #[must_use]
    pub fn install(state: AppState, regions: Regions, service: Rc<dyn OrderService>) -> Self {
        let dispatcher = Self {
            inner: Rc::new(DispatcherInner {
                state,
                regions: RefCell::new(regions),
                service,
                preview: RefCell::new(None),
                step: Cell::new(OrderStep::Delivery),
                submitting: Cell::new(false),
                failure: RefCell::new(None),
                subscriptions: RefCell::new(Vec::new()),
            }),
        };

        dispatcher.on(topics::CARDS_CHANGED, DispatcherInner::on_cards_changed);
        dispatcher.on(topics::CARDS_FAILED, DispatcherInner::on_cards_failed);
        dispatcher.on(topics::STATE_UPDATE, DispatcherInner::on_state_update);
        dispatcher.on(topics::CARD_PREVIEW_OPEN, DispatcherInner::on_preview_open);
        dispatcher.on(topics::BASKET_CHANGED, DispatcherInner::on_basket_changed);
        dispatcher.on(topics::BASKET_OPEN, DispatcherInner::on_basket_open);
        dispatcher.on(topics::BASKET_SUBMIT, DispatcherInner::on_basket_submit);
        dispatcher.on(
            Topic::field_change(Namespace::Order),
            DispatcherInner::on_field_change,
        );
        dispatcher.on(
            Topic::field_change(Namespace::Contacts),
            DispatcherInner::on_field_change,
        );
        dispatcher.on(topics::PAYMENT_SELECTED, DispatcherInner::on_payment_selected);
        dispatcher.on(topics::ORDER_SUBMIT, DispatcherInner::on_delivery_submit);
        dispatcher.on(topics::CONTACTS_SUBMIT, DispatcherInner::on_contacts_submit);
        dispatcher.on(topics::ORDER_PLACED, DispatcherInner::on_order_placed);
        dispatcher.on(topics::ORDER_FAILED, DispatcherInner::on_order_failed);
        dispatcher.on(topics::SUCCESS_SUBMIT, DispatcherInner::on_success_submit);
        dispatcher.on(topics::MODAL_OPEN, DispatcherInner::on_modal_open);
        dispatcher.on(topics::MODAL_CLOSE, DispatcherInner::on_modal_close);

        tracing::debug!(
            handlers = dispatcher.inner.subscriptions.borrow().len(),
            "Dispatcher installed"
        );
        dispatcher
    }

    /// Fetch the catalog and load it into the state.
    ///
    /// On failure the notice region is told and `cards:failed` is published;
    /// calling this again retries.
    ///
    /// # Errors
    ///
    /// Returns `StorefrontError::Network` if the fetch fails.
    #[allow(clippy::future_not_send)] // single-threaded: state and service are `Rc`
    pub async fn refresh_catalog(&self) -> Result<()> {
        let service = Rc::clone(&self.inner.service);
        match service.fetch_catalog().await {
            Ok(cards) => {
                self.inner.state.load_cards(cards);
                Ok(())
            }
            Err(e) => {
                let err = StorefrontError::from(e);
                err.report();
                self.inner
                    .state
                    .events()
                    .emit(topics::CARDS_FAILED, &StoreEvent::Failed(err.user_message()));
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.inner.state
    }

    /// Card currently shown in the preview, if any.
    #[must_use]
    pub fn preview(&self) -> Option<CardId> {
        self.inner.preview.borrow().clone()
    }

    #[must_use]
    pub fn order_step(&self) -> OrderStep {
        self.inner.step.get()
    }

    /// Returns `true` while an order submission is awaiting the service.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.inner.submitting.get()
    }

    fn on(&self, topic: impl Into<Topic>, handler: fn(&DispatcherInner, &StoreEvent)) {
        let topic = topic.into();
        let weak: Weak<DispatcherInner> = Rc::downgrade(&self.inner);
        let id = self
            .inner
            .state
            .events()
            .subscribe(topic.clone(), move |event: &StoreEvent| {
                if let Some(inner) = weak.upgrade() {
                    handler(&inner, event);
                }
            });
        self.inner.subscriptions.borrow_mut().push((topic, id));
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        let events = self.inner.state.events();
        for (topic, id) in self.inner.subscriptions.borrow_mut().drain(..) {
            events.unsubscribe(&topic, id);
        }
    }
}

impl DispatcherInner {
    // =========================================================================
    // Catalog
    // =========================================================================

    fn on_cards_changed(&self, event: &StoreEvent) {
        let StoreEvent::CardsChanged(cards) = event else {
            return unexpected(topics::CARDS_CHANGED, event);
        };
        let items = render::catalog_items(&self.state, cards);
        let mut regions = self.regions.borrow_mut();
        regions.catalog.render(&items);
        regions.page.set_counter(self.state.basket_len());
    }

    fn on_cards_failed(&self, event: &StoreEvent) {
        let StoreEvent::Failed(message) = event else {
            return unexpected(topics::CARDS_FAILED, event);
        };
        self.regions.borrow_mut().notice.show(message);
    }

    // =========================================================================
    // Generic re-render
    // =========================================================================

    fn on_state_update(&self, event: &StoreEvent) {
        let StoreEvent::StateChanged(change) = event else {
            return unexpected(topics::STATE_UPDATE, event);
        };

        let screen = self.state.get_state();
        tracing::debug!(?screen, ?change, "Re-rendering after state update");

        match screen {
            Screen::CardPreview => {
                self.render_preview();
                self.render_basket();
                self.render_counter();
            }
            Screen::Basket => {
                self.render_basket();
                self.render_counter();
            }
            Screen::OrderForm => self.render_forms(change),
            Screen::Success => self.render_basket(),
            Screen::None => self.render_counter(),
        }
    }

    // =========================================================================
    // Preview and basket
    // =========================================================================

    fn on_preview_open(&self, event: &StoreEvent) {
        let StoreEvent::Card(id) = event else {
            return unexpected(topics::CARD_PREVIEW_OPEN, event);
        };

        if let Err(err) = self.state.get_card(id) {
            tracing::warn!(card_id = %id, "Ignoring preview of unknown card");
            err.report();
            return;
        }

        add_breadcrumb("preview", id.as_str());
        *self.preview.borrow_mut() = Some(id.clone());
        self.state.set_state(Screen::CardPreview);
        self.render_preview();
        self.open_modal(ModalContent::Preview);
    }

    fn on_basket_changed(&self, event: &StoreEvent) {
        let StoreEvent::Card(id) = event else {
            return unexpected(topics::BASKET_CHANGED, event);
        };
        add_breadcrumb("basket", id.as_str());
        let in_basket = self.state.toggle_card(id.clone());
        tracing::debug!(card_id = %id, in_basket, "Basket toggled");
    }

    fn on_basket_open(&self, _event: &StoreEvent) {
        self.failure.borrow_mut().take();
        self.step.set(OrderStep::Delivery);
        self.state.clear_order();

        self.state.set_state(Screen::Basket);
        self.render_basket();
        self.render_counter();
        self.open_modal(ModalContent::Basket);
    }

    fn on_basket_submit(&self, _event: &StoreEvent) {
        if self.state.basket_len() == 0 {
            tracing::warn!("Ignoring checkout of an empty basket");
            return;
        }

        tracing::info!(items = self.state.basket_len(), "Checkout started");
        self.step.set(OrderStep::Delivery);
        self.state.set_state(Screen::OrderForm);
        self.render_forms(&StateChange::default());
        self.open_modal(ModalContent::Delivery);
    }

    // =========================================================================
    // Order form
    // =========================================================================

    fn on_field_change(&self, event: &StoreEvent) {
        let StoreEvent::FieldEdited { field, value } = event else {
            return unexpected("field change", event);
        };
        if field.namespace() == Namespace::Contacts {
            self.failure.borrow_mut().take();
        }
        self.state.set_order_field(*field, value);
    }

    fn on_payment_selected(&self, event: &StoreEvent) {
        let StoreEvent::PaymentSelected(method) = event else {
            return unexpected(topics::PAYMENT_SELECTED, event);
        };
        self.state.set_payment(*method);
    }

    fn on_delivery_submit(&self, _event: &StoreEvent) {
        let validation = self.state.validate_order();
        if !validation.delivery_valid() {
            tracing::debug!(errors = validation.len(), "Delivery form incomplete");
            self.render_forms(&StateChange::default());
            return;
        }

        self.step.set(OrderStep::Contacts);
        self.state.set_state(Screen::OrderForm);
        self.render_forms(&StateChange::default());
        self.open_modal(ModalContent::Contacts);
    }

    fn on_contacts_submit(&self, _event: &StoreEvent) {
        if self.submitting.get() {
            tracing::warn!("Ignoring order submission while one is in flight");
            return;
        }

        let request = match self.state.order_request() {
            Ok(request) => request,
            Err(err) => {
                err.report();
                self.render_forms(&StateChange::default());
                return;
            }
        };

        tracing::info!(
            items = request.items.len(),
            total = %request.total,
            "Submitting order"
        );
        add_breadcrumb("order", "submit");
        self.submitting.set(true);
        self.failure.borrow_mut().take();

        let service = Rc::clone(&self.service);
        let events = self.state.events().clone();
        tokio::task::spawn_local(async move {
            match service.submit_order(request).await {
                Ok(result) => {
                    events.emit(topics::ORDER_PLACED, &StoreEvent::OrderPlaced(result));
                }
                Err(e) => {
                    let err = StorefrontError::from(e);
                    err.report();
                    events.emit(topics::ORDER_FAILED, &StoreEvent::Failed(err.user_message()));
                }
            }
        });
    }

    fn on_order_placed(&self, event: &StoreEvent) {
        let StoreEvent::OrderPlaced(result) = event else {
            return unexpected(topics::ORDER_PLACED, event);
        };
        self.submitting.set(false);
        tracing::info!(order_id = %result.id, total = %result.total, "Order placed");

        self.state.set_state(Screen::Success);
        self.state.clear_basket();
        self.state.clear_order();

        let data = render::success(&self.state, result.total);
        self.regions.borrow_mut().success.render(&data);
        self.render_counter();
        self.open_modal(ModalContent::Success);
    }

    fn on_order_failed(&self, event: &StoreEvent) {
        let StoreEvent::Failed(message) = event else {
            return unexpected(topics::ORDER_FAILED, event);
        };
        self.submitting.set(false);
        *self.failure.borrow_mut() = Some(message.clone());
        tracing::warn!(message = %message, "Order failed; basket and draft kept");

        if self.state.get_state() == Screen::OrderForm {
            self.step.set(OrderStep::Contacts);
            self.render_forms(&StateChange::default());
        }
        self.regions.borrow_mut().notice.show(message);
    }

    fn on_success_submit(&self, _event: &StoreEvent) {
        self.state
            .events()
            .emit(topics::MODAL_CLOSE, &StoreEvent::Empty);
    }

    // =========================================================================
    // Overlay
    // =========================================================================

    fn on_modal_open(&self, _event: &StoreEvent) {
        self.regions.borrow_mut().page.set_locked(true);
    }

    fn on_modal_close(&self, _event: &StoreEvent) {
        self.preview.borrow_mut().take();
        self.state.set_state(Screen::None);
        {
            let mut regions = self.regions.borrow_mut();
            regions.modal.close();
            regions.page.set_locked(false);
        }
        self.render_counter();
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    fn open_modal(&self, content: ModalContent) {
        self.regions.borrow_mut().modal.open(content);
        self.state
            .events()
            .emit(topics::MODAL_OPEN, &StoreEvent::Empty);
    }

    fn render_counter(&self) {
        let count = self.state.basket_len();
        self.regions.borrow_mut().page.set_counter(count);
    }

    fn render_preview(&self) {
        let Some(id) = self.preview.borrow().clone() else {
            return;
        };
        match self.state.get_card(&id) {
            Ok(card) => {
                let data = render::preview(&self.state, &card);
                self.regions.borrow_mut().preview.render(&data);
            }
            Err(err) => err.report(),
        }
    }

    fn render_basket(&self) {
        let data = render::basket(&self.state);
        self.regions.borrow_mut().basket.render(&data);
    }

    /// Re-render both sub-forms and focus the hinted field in its owning form.
    fn render_forms(&self, change: &StateChange) {
        let validation = self.state.validate_order();
        let delivery = render::delivery_form(&self.state, &validation);
        let contacts =
            render::contacts_form(&self.state, &validation, self.failure.borrow().as_deref());

        let mut regions = self.regions.borrow_mut();
        regions.delivery.render(&delivery);
        regions.contacts.render(&contacts);

        if let Some(field) = change.field {
            match field.namespace() {
                Namespace::Order => regions.delivery.focus(field),
                Namespace::Contacts => regions.contacts.focus(field),
            }
        }
    }
}

fn unexpected(topic: &str, event: &StoreEvent) {
    tracing::warn!(topic, ?event, "Ignoring event with unexpected payload");
}
