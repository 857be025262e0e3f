//! Integration test harness for the Web-Larek storefront core.
//!
//! [`Storefront`] wires a real bus, state and dispatcher to recording regions
//! and a scripted [`MockOrderService`]. Tests emit UI events and inspect what
//! the regions were asked to render.
//!
//! ```rust,ignore
//! let shop = Storefront::new(vec![card("x", Some(500))]);
//! shop.emit(topics::CARD_PREVIEW_OPEN, &StoreEvent::Card(CardId::new("x")));
//! assert_eq!(shop.log().previews.last().unwrap().button, ButtonLabel::Available);
//! ```

use std::cell::{Cell, Ref, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use larek_core::{Card, CardId, CurrencyFormat, FieldId, OrderId, OrderRequest, OrderResult, Price};
use larek_storefront::dispatcher::Dispatcher;
use larek_storefront::events::{StoreBus, StoreEvent, topics};
use larek_storefront::services::{ApiError, OrderService};
use larek_storefront::state::AppState;
use larek_storefront::views::{
    BasketData, CatalogItem, ContactsFormData, DeliveryFormData, FormRegion, ModalContent,
    ModalShell, Notice, Page, PreviewData, Region, Regions, SuccessData,
};

// =============================================================================
// Fixtures
// =============================================================================

/// A card with a price in whole units, or priceless for `None`.
#[must_use]
pub fn card(id: &str, price: Option<i64>) -> Card {
    Card {
        id: CardId::new(id),
        title: format!("Card {id}"),
        description: format!("About {id}"),
        image: format!("https://cdn.test/{id}.svg"),
        category: "soft".to_string(),
        price: price.map_or_else(Price::priceless, Price::from_units),
    }
}

// =============================================================================
// Recording regions
// =============================================================================

/// Everything the dispatcher asked the regions to do, in order.
#[derive(Debug, Default)]
pub struct RenderLog {
    pub catalog: Vec<Vec<CatalogItem>>,
    pub previews: Vec<PreviewData>,
    pub baskets: Vec<BasketData>,
    pub deliveries: Vec<DeliveryFormData>,
    pub contacts: Vec<ContactsFormData>,
    pub successes: Vec<SuccessData>,
    pub delivery_focus: Vec<FieldId>,
    pub contacts_focus: Vec<FieldId>,
    /// Content currently shown in the overlay.
    pub modal: Option<ModalContent>,
    pub modal_history: Vec<ModalContent>,
    pub counter: Option<usize>,
    pub locked: bool,
    pub notices: Vec<String>,
}

/// Region implementation that appends to a shared [`RenderLog`].
#[derive(Clone, Default)]
pub struct Recorder {
    log: Rc<RefCell<RenderLog>>,
}

impl Recorder {
    /// A full set of regions recording into this log.
    #[must_use]
    pub fn regions(&self) -> Regions {
        Regions {
            catalog: Box::new(self.clone()),
            preview: Box::new(self.clone()),
            basket: Box::new(self.clone()),
            delivery: Box::new(self.clone()),
            contacts: Box::new(self.clone()),
            success: Box::new(self.clone()),
            modal: Box::new(self.clone()),
            page: Box::new(self.clone()),
            notice: Box::new(self.clone()),
        }
    }
}

impl Region<Vec<CatalogItem>> for Recorder {
    fn render(&mut self, data: &Vec<CatalogItem>) {
        self.log.borrow_mut().catalog.push(data.clone());
    }
}

impl Region<PreviewData> for Recorder {
    fn render(&mut self, data: &PreviewData) {
        self.log.borrow_mut().previews.push(data.clone());
    }
}

impl Region<BasketData> for Recorder {
    fn render(&mut self, data: &BasketData) {
        self.log.borrow_mut().baskets.push(data.clone());
    }
}

impl Region<DeliveryFormData> for Recorder {
    fn render(&mut self, data: &DeliveryFormData) {
        self.log.borrow_mut().deliveries.push(data.clone());
    }
}

impl FormRegion<DeliveryFormData> for Recorder {
    fn focus(&mut self, field: FieldId) {
        self.log.borrow_mut().delivery_focus.push(field);
    }
}

impl Region<ContactsFormData> for Recorder {
    fn render(&mut self, data: &ContactsFormData) {
        self.log.borrow_mut().contacts.push(data.clone());
    }
}

impl FormRegion<ContactsFormData> for Recorder {
    fn focus(&mut self, field: FieldId) {
        self.log.borrow_mut().contacts_focus.push(field);
    }
}

impl Region<SuccessData> for Recorder {
    fn render(&mut self, data: &SuccessData) {
        self.log.borrow_mut().successes.push(data.clone());
    }
}

impl ModalShell for Recorder {
    fn open(&mut self, content: ModalContent) {
        let mut log = self.log.borrow_mut();
        log.modal = Some(content);
        log.modal_history.push(content);
    }

    fn close(&mut self) {
        self.log.borrow_mut().modal = None;
    }
}

impl Page for Recorder {
    fn set_counter(&mut self, count: usize) {
        self.log.borrow_mut().counter = Some(count);
    }

    fn set_locked(&mut self, locked: bool) {
        self.log.borrow_mut().locked = locked;
    }
}

impl Notice for Recorder {
    fn show(&mut self, message: &str) {
        self.log.borrow_mut().notices.push(message.to_string());
    }
}

// =============================================================================
// Mock order service
// =============================================================================

/// Scripted outcome of one `submit_order` call.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Accept(OrderResult),
    Reject { status: u16, message: String },
}

/// Order service that answers from a script and records every request.
///
/// With an empty script, orders are accepted with id `o<n>` and the
/// requested total.
#[derive(Default)]
pub struct MockOrderService {
    catalog: RefCell<Option<Vec<Card>>>,
    outcomes: RefCell<VecDeque<SubmitOutcome>>,
    requests: RefCell<Vec<OrderRequest>>,
    catalog_calls: Cell<usize>,
}

impl MockOrderService {
    #[must_use]
    pub fn with_catalog(cards: Vec<Card>) -> Self {
        let service = Self::default();
        *service.catalog.borrow_mut() = Some(cards);
        service
    }

    /// Make the next catalog fetches fail until a catalog is set again.
    pub fn fail_catalog(&self) {
        self.catalog.borrow_mut().take();
    }

    pub fn set_catalog(&self, cards: Vec<Card>) {
        *self.catalog.borrow_mut() = Some(cards);
    }

    /// Queue the outcome of a future submission.
    pub fn push_outcome(&self, outcome: SubmitOutcome) {
        self.outcomes.borrow_mut().push_back(outcome);
    }

    #[must_use]
    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests.borrow().clone()
    }

    #[must_use]
    pub fn submit_calls(&self) -> usize {
        self.requests.borrow().len()
    }

    #[must_use]
    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.get()
    }
}

#[async_trait(?Send)]
impl OrderService for MockOrderService {
    async fn fetch_catalog(&self) -> Result<Vec<Card>, ApiError> {
        self.catalog_calls.set(self.catalog_calls.get() + 1);
        tokio::task::yield_now().await;
        self.catalog.borrow().clone().ok_or_else(|| ApiError::Api {
            status: 503,
            message: "catalog offline".to_string(),
        })
    }

    async fn submit_order(&self, order: OrderRequest) -> Result<OrderResult, ApiError> {
        let total = order.total;
        self.requests.borrow_mut().push(order);
        let number = self.requests.borrow().len();
        tokio::task::yield_now().await;

        let outcome = self.outcomes.borrow_mut().pop_front();
        match outcome {
            Some(SubmitOutcome::Accept(result)) => Ok(result),
            Some(SubmitOutcome::Reject { status, message }) => {
                Err(ApiError::Api { status, message })
            }
            None => Ok(OrderResult {
                id: OrderId::new(format!("o{number}")),
                total,
            }),
        }
    }
}

// =============================================================================
// Storefront under test
// =============================================================================

/// Bus, state, dispatcher and recorders wired together.
pub struct Storefront {
    pub bus: StoreBus,
    pub state: AppState,
    pub dispatcher: Dispatcher,
    pub service: Rc<MockOrderService>,
    recorder: Recorder,
}

impl Storefront {
    /// A storefront with `cards` already loaded.
    #[must_use]
    pub fn new(cards: Vec<Card>) -> Self {
        let shop = Self::empty(MockOrderService::with_catalog(cards.clone()));
        shop.state.load_cards(cards);
        shop
    }

    /// A storefront with nothing loaded, backed by `service`.
    #[must_use]
    pub fn empty(service: MockOrderService) -> Self {
        let bus = StoreBus::new();
        let state = AppState::new(bus.clone(), CurrencyFormat::default());
        let recorder = Recorder::default();
        let service = Rc::new(service);
        let dispatcher = Dispatcher::install(
            state.clone(),
            recorder.regions(),
            Rc::clone(&service) as Rc<dyn OrderService>,
        );

        Self {
            bus,
            state,
            dispatcher,
            service,
            recorder,
        }
    }

    #[must_use]
    pub fn log(&self) -> Ref<'_, RenderLog> {
        self.recorder.log.borrow()
    }

    pub fn emit(&self, topic: &str, event: &StoreEvent) -> usize {
        self.bus.emit(topic, event)
    }

    pub fn open_preview(&self, id: &str) {
        self.emit(topics::CARD_PREVIEW_OPEN, &StoreEvent::Card(CardId::new(id)));
    }

    pub fn toggle(&self, id: &str) {
        self.emit(topics::BASKET_CHANGED, &StoreEvent::Card(CardId::new(id)));
    }

    pub fn open_basket(&self) {
        self.emit(topics::BASKET_OPEN, &StoreEvent::Empty);
    }

    /// Emit a field edit on the field's own change topic.
    pub fn edit(&self, field: FieldId, value: &str) {
        self.emit(
            &field.change_topic(),
            &StoreEvent::FieldEdited {
                field,
                value: value.to_string(),
            },
        );
    }

    /// Walk from the basket to a fully filled contacts form.
    pub fn fill_checkout(&self) {
        self.open_basket();
        self.emit(topics::BASKET_SUBMIT, &StoreEvent::Empty);
        self.edit(FieldId::PAYMENT, "card");
        self.edit(FieldId::ADDRESS, "Spb Vosstania 1");
        self.emit(topics::ORDER_SUBMIT, &StoreEvent::Empty);
        self.edit(FieldId::EMAIL, "buyer@example.test");
        self.edit(FieldId::PHONE, "+71234567890");
    }

    /// Run `action` inside a `LocalSet` and wait for every task it spawned.
    #[allow(clippy::future_not_send)]
    pub async fn drive<F>(&self, action: F)
    where
        F: FnOnce(&Self),
    {
        let local = tokio::task::LocalSet::new();
        local.run_until(async { action(self) }).await;
        local.await;
    }

    /// `drive` a contacts submission.
    #[allow(clippy::future_not_send)]
    pub async fn submit_contacts(&self) {
        self.drive(|shop| {
            shop.emit(topics::CONTACTS_SUBMIT, &StoreEvent::Empty);
        })
        .await;
    }
}
