//! Synchronous publish/subscribe event bus.
//!
//! # Semantics
//!
//! - Handlers run synchronously, in registration order, before [`EventBus::emit`]
//!   returns. There is no queue and no scheduler.
//! - The set of matching handlers is captured when an emit starts, so handlers
//!   may subscribe, unsubscribe, or emit again. A nested emit runs to
//!   completion (depth-first) before the outer emit moves on.
//! - A handler unsubscribed while an emit is in progress is skipped for the
//!   rest of that emit.
//!
//! The bus is single-threaded (`Rc`/`RefCell`). Clones share one registry, so
//! the bus is constructed once and handed to every component explicitly.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use larek_core::{Card, CardId, FieldId, Namespace, OrderResult, PaymentMethod};
use regex::Regex;

/// Topic names used by the storefront.
pub mod topics {
    /// Generic "something in the state changed" notification.
    pub const STATE_UPDATE: &str = "state:update";
    /// The catalog was replaced.
    pub const CARDS_CHANGED: &str = "cards:changed";
    /// Fetching the catalog failed.
    pub const CARDS_FAILED: &str = "cards:failed";
    pub const CARD_PREVIEW_OPEN: &str = "cardPreview:open";
    pub const BASKET_OPEN: &str = "basket:open";
    /// Toggle a card in or out of the basket.
    pub const BASKET_CHANGED: &str = "basket:changed";
    pub const BASKET_SUBMIT: &str = "basket:submit";
    /// Delivery form submitted.
    pub const ORDER_SUBMIT: &str = "order:submit";
    pub const PAYMENT_SELECTED: &str = "payment:select";
    pub const CONTACTS_SUBMIT: &str = "contacts:submit";
    /// The order service accepted the order.
    pub const ORDER_PLACED: &str = "order:placed";
    /// The order service rejected the order or was unreachable.
    pub const ORDER_FAILED: &str = "order:failed";
    pub const SUCCESS_SUBMIT: &str = "success:submit";
    pub const MODAL_OPEN: &str = "modal:open";
    pub const MODAL_CLOSE: &str = "modal:close";
}

/// Hint attached to a `state:update` notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateChange {
    /// Card whose basket membership changed.
    pub id: Option<CardId>,
    /// Order field that was edited.
    pub field: Option<FieldId>,
}

/// Payload carried by storefront events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Empty,
    /// Snapshot of the freshly loaded catalog, in load order.
    CardsChanged(Vec<Card>),
    Card(CardId),
    FieldEdited { field: FieldId, value: String },
    PaymentSelected(PaymentMethod),
    StateChanged(StateChange),
    OrderPlaced(OrderResult),
    /// User-facing description of a failed network operation.
    Failed(String),
}

/// The bus type used throughout the storefront.
pub type StoreBus = EventBus<StoreEvent>;

/// Identifies one registration, for [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// What a handler listens to.
#[derive(Debug, Clone)]
pub enum Topic {
    /// Exactly this topic string.
    Exact(String),
    /// Any field change of one form: `"<namespace>.<field>:change"`.
    FieldChange(Namespace),
    /// Any topic matching a regular expression.
    Pattern(Regex),
}

impl Topic {
    /// Match a single topic string.
    #[must_use]
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    /// Match every field change topic of a namespace.
    #[must_use]
    pub const fn field_change(namespace: Namespace) -> Self {
        Self::FieldChange(namespace)
    }

    /// Match topics against a regular expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the expression does not compile.
    pub fn pattern(expr: &str) -> Result<Self, regex::Error> {
        Regex::new(expr).map(Self::Pattern)
    }

    /// Returns `true` if an emitted topic is delivered to this subscription.
    #[must_use]
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            Self::Exact(name) => name == topic,
            Self::FieldChange(namespace) => topic
                .strip_prefix(namespace.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|rest| rest.strip_suffix(":change"))
                .is_some_and(|field| !field.is_empty() && !field.contains(['.', ':'])),
            Self::Pattern(regex) => regex.is_match(topic),
        }
    }
}

impl PartialEq for Topic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::FieldChange(a), Self::FieldChange(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl From<&str> for Topic {
    fn from(name: &str) -> Self {
        Self::exact(name)
    }
}

type Handler<P> = Rc<dyn Fn(&P)>;

struct Registration<P> {
    id: HandlerId,
    topic: Topic,
    handler: Handler<P>,
}

struct Registry<P> {
    registrations: RefCell<Vec<Registration<P>>>,
    next_id: Cell<u64>,
}

/// Synchronous publish/subscribe bus; see the module docs for semantics.
pub struct EventBus<P> {
    inner: Rc<Registry<P>>,
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

impl<P> EventBus<P> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Registry {
                registrations: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Register a handler for a topic.
    pub fn subscribe<F>(&self, topic: impl Into<Topic>, handler: F) -> HandlerId
    where
        F: Fn(&P) + 'static,
    {
        let id = HandlerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.registrations.borrow_mut().push(Registration {
            id,
            topic: topic.into(),
            handler: Rc::new(handler),
        });
        id
    }

    /// Remove one registration. Returns `false` if it was not registered
    /// under that topic.
    pub fn unsubscribe(&self, topic: &Topic, id: HandlerId) -> bool {
        let mut registrations = self.inner.registrations.borrow_mut();
        let before = registrations.len();
        registrations.retain(|r| !(r.id == id && r.topic == *topic));
        registrations.len() != before
    }

    /// Deliver a payload to every matching handler. Returns how many ran.
    pub fn emit(&self, topic: &str, payload: &P) -> usize {
        let matching: Vec<(HandlerId, Handler<P>)> = self
            .inner
            .registrations
            .borrow()
            .iter()
            .filter(|r| r.topic.matches(topic))
            .map(|r| (r.id, Rc::clone(&r.handler)))
            .collect();

        tracing::trace!(topic, handlers = matching.len(), "emit");

        let mut delivered = 0;
        for (id, handler) in matching {
            if self.is_registered(id) {
                handler(payload);
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of live registrations.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.registrations.borrow().len()
    }

    fn is_registered(&self, id: HandlerId) -> bool {
        self.inner
            .registrations
            .borrow()
            .iter()
            .any(|r| r.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&u32)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let make = move |name: &str| -> Box<dyn Fn(&u32)> {
            let sink = Rc::clone(&sink);
            let name = name.to_string();
            Box::new(move |value: &u32| sink.borrow_mut().push(format!("{name}:{value}")))
        };
        (log, make)
    }

    #[test]
    fn test_emit_runs_handlers_in_registration_order() {
        let bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        bus.subscribe("a", make("first"));
        bus.subscribe("b", make("other"));
        bus.subscribe("a", make("second"));

        assert_eq!(bus.emit("a", &7), 2);
        assert_eq!(*log.borrow(), vec!["first:7", "second:7"]);
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let bus = EventBus::<u32>::new();
        assert_eq!(bus.emit("nobody", &1), 0);
    }

    #[test]
    fn test_unsubscribe_removes_specific_registration() {
        let bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        let first = bus.subscribe("a", make("first"));
        bus.subscribe("a", make("second"));

        assert!(!bus.unsubscribe(&Topic::exact("b"), first));
        assert!(bus.unsubscribe(&Topic::exact("a"), first));
        assert!(!bus.unsubscribe(&Topic::exact("a"), first));

        bus.emit("a", &1);
        assert_eq!(*log.borrow(), vec!["second:1"]);
    }

    #[test]
    fn test_field_change_topic_matching() {
        let topic = Topic::field_change(Namespace::Order);
        assert!(topic.matches("order.address:change"));
        assert!(topic.matches("order.payment:change"));
        assert!(!topic.matches("contacts.email:change"));
        assert!(!topic.matches("order:submit"));
        assert!(!topic.matches("order.:change"));
        assert!(!topic.matches("order.a.b:change"));
        assert!(!topic.matches("orders.address:change"));
    }

    #[test]
    fn test_regex_pattern_topic() {
        let bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        bus.subscribe(Topic::pattern(r"^basket:").unwrap(), make("basket"));

        bus.emit("basket:open", &1);
        bus.emit("modal:open", &2);
        bus.emit("basket:submit", &3);
        assert_eq!(*log.borrow(), vec!["basket:1", "basket:3"]);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(Topic::pattern("(").is_err());
    }

    #[test]
    fn test_reentrant_emit_runs_depth_first() {
        let bus = EventBus::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_bus = bus.clone();
        let sink = Rc::clone(&log);
        bus.subscribe("outer", move |v: &u32| {
            sink.borrow_mut().push(format!("outer-start:{v}"));
            inner_bus.emit("inner", &(v + 1));
            sink.borrow_mut().push(format!("outer-end:{v}"));
        });
        let sink = Rc::clone(&log);
        bus.subscribe("outer", move |v: &u32| sink.borrow_mut().push(format!("outer-second:{v}")));
        let sink = Rc::clone(&log);
        bus.subscribe("inner", move |v: &u32| sink.borrow_mut().push(format!("inner:{v}")));

        bus.emit("outer", &1);
        assert_eq!(
            *log.borrow(),
            vec!["outer-start:1", "inner:2", "outer-end:1", "outer-second:1"]
        );
    }

    #[test]
    fn test_handler_may_unsubscribe_later_handler() {
        let bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        let victim_slot: Rc<Cell<Option<HandlerId>>> = Rc::new(Cell::new(None));

        let slot = Rc::clone(&victim_slot);
        let handle = bus.clone();
        bus.subscribe("a", move |_: &u32| {
            if let Some(id) = slot.take() {
                handle.unsubscribe(&Topic::exact("a"), id);
            }
        });
        victim_slot.set(Some(bus.subscribe("a", make("victim"))));

        assert_eq!(bus.emit("a", &1), 1);
        assert!(log.borrow().is_empty());
        assert_eq!(bus.handler_count(), 1);
    }

    #[test]
    fn test_handler_may_subscribe_during_emit() {
        let bus = EventBus::<u32>::new();
        let (log, make) = recorder();
        let make = Rc::new(make);

        let handle = bus.clone();
        let factory = Rc::clone(&make);
        bus.subscribe("a", move |_: &u32| {
            let late = factory("late");
            handle.subscribe("a", move |v: &u32| late(v));
        });

        assert_eq!(bus.emit("a", &1), 1);
        assert!(log.borrow().is_empty());
        bus.emit("a", &2);
        assert_eq!(*log.borrow(), vec!["late:2"]);
    }
}
