//! End-to-end storefront flows: preview, basket, two-step checkout.
//!
//! Each test drives the dispatcher through bus events only and checks what
//! the recording regions were asked to render.

#![allow(clippy::unwrap_used)]

use larek_core::{FieldId, OrderDraft, OrderId, OrderResult, PaymentMethod};
use larek_integration_tests::{MockOrderService, Storefront, SubmitOutcome, card};
use larek_storefront::dispatcher::OrderStep;
use larek_storefront::events::{StoreEvent, topics};
use larek_storefront::state::Screen;
use larek_storefront::validation::messages;
use larek_storefront::views::{ButtonLabel, ModalContent};
use rust_decimal::Decimal;

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_refresh_catalog_renders_formatted_prices() {
    let shop = Storefront::empty(MockOrderService::with_catalog(vec![
        card("x", Some(500)),
        card("free", None),
    ]));

    shop.dispatcher.refresh_catalog().await.unwrap();

    let log = shop.log();
    let items = log.catalog.last().unwrap();
    let prices: Vec<&str> = items.iter().map(|item| item.price.as_str()).collect();
    assert_eq!(prices, vec!["500 synapses", "Priceless"]);
    assert_eq!(log.counter, Some(0));
}

#[tokio::test]
async fn test_failed_catalog_fetch_surfaces_notice_and_allows_retry() {
    let service = MockOrderService::with_catalog(vec![card("x", Some(500))]);
    service.fail_catalog();
    let shop = Storefront::empty(service);

    assert!(shop.dispatcher.refresh_catalog().await.is_err());
    assert_eq!(
        shop.log().notices,
        vec!["The shop is temporarily unavailable, please try again"]
    );
    assert!(shop.log().catalog.is_empty());

    shop.service.set_catalog(vec![card("x", Some(500))]);
    shop.dispatcher.refresh_catalog().await.unwrap();
    assert_eq!(shop.service.catalog_calls(), 2);
    assert_eq!(shop.state.cards().len(), 1);
}

// =============================================================================
// Preview and basket
// =============================================================================

#[test]
fn test_preview_label_follows_basket_membership() {
    let shop = Storefront::new(vec![card("x", Some(500))]);

    shop.open_preview("x");
    assert_eq!(shop.state.get_state(), Screen::CardPreview);
    assert_eq!(shop.log().previews.last().unwrap().button, ButtonLabel::Available);
    assert_eq!(shop.log().modal, Some(ModalContent::Preview));

    shop.toggle("x");
    assert_eq!(shop.log().previews.last().unwrap().button, ButtonLabel::InBasket);
    assert_eq!(shop.log().counter, Some(1));

    shop.open_preview("x");
    assert_eq!(shop.log().previews.last().unwrap().button, ButtonLabel::InBasket);

    shop.open_basket();
    let log = shop.log();
    let basket = log.baskets.last().unwrap();
    assert_eq!(basket.total, "500 synapses");
    assert_eq!(basket.items.len(), 1);
    assert!(!basket.disabled);
}

#[test]
fn test_toggle_from_preview_rerenders_basket() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.open_preview("x");
    let before = shop.log().baskets.len();

    shop.toggle("x");
    let log = shop.log();
    assert_eq!(log.baskets.len(), before + 1);
    let basket = log.baskets.last().unwrap();
    assert_eq!(basket.items.len(), 1);
    assert_eq!(basket.items.first().unwrap().id.as_str(), "x");
    assert_eq!(basket.total, "500 synapses");
    assert_eq!(log.counter, Some(1));
}

#[test]
fn test_priceless_card_cannot_be_bought() {
    let shop = Storefront::new(vec![card("free", None)]);

    shop.open_preview("free");
    let log = shop.log();
    let preview = log.previews.last().unwrap();
    assert_eq!(preview.button, ButtonLabel::Unavailable);
    assert!(!preview.button_enabled);
    assert_eq!(preview.price, "Priceless");
}

#[test]
fn test_preview_of_unknown_card_is_ignored() {
    let shop = Storefront::new(vec![card("x", Some(500))]);

    shop.open_preview("ghost");
    assert!(shop.log().previews.is_empty());
    assert_eq!(shop.log().modal, None);
    assert_eq!(shop.state.get_state(), Screen::None);
}

#[test]
fn test_removing_from_open_basket_rerenders_it() {
    let shop = Storefront::new(vec![card("a", Some(100)), card("b", None)]);
    shop.toggle("a");
    shop.toggle("b");
    shop.open_basket();
    assert_eq!(shop.log().baskets.last().unwrap().total, "100 synapses");

    shop.toggle("a");
    let log = shop.log();
    let basket = log.baskets.last().unwrap();
    assert_eq!(basket.items.len(), 1);
    assert_eq!(basket.items.first().unwrap().index, 1);
    assert_eq!(basket.total, "0 synapses");
    assert_eq!(log.counter, Some(1));
}

#[test]
fn test_opening_basket_clears_order_draft() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.fill_checkout();
    assert_ne!(shop.state.get_order(), OrderDraft::default());

    shop.emit(topics::MODAL_CLOSE, &StoreEvent::Empty);
    shop.open_basket();
    assert_eq!(shop.state.get_order(), OrderDraft::default());
}

#[test]
fn test_empty_basket_checkout_is_ignored() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.open_basket();
    assert!(shop.log().baskets.last().unwrap().disabled);

    shop.emit(topics::BASKET_SUBMIT, &StoreEvent::Empty);
    assert_eq!(shop.state.get_state(), Screen::Basket);
    assert!(shop.log().deliveries.is_empty());
}

// =============================================================================
// Overlay
// =============================================================================

#[test]
fn test_overlay_locks_and_unlocks_page() {
    let shop = Storefront::new(vec![card("x", Some(500))]);

    shop.open_preview("x");
    assert!(shop.log().locked);

    shop.emit(topics::MODAL_CLOSE, &StoreEvent::Empty);
    assert!(!shop.log().locked);
    assert_eq!(shop.log().modal, None);
    assert_eq!(shop.state.get_state(), Screen::None);
    assert_eq!(shop.dispatcher.preview(), None);
}

#[test]
fn test_toggle_with_overlay_closed_updates_counter_only() {
    let shop = Storefront::new(vec![card("x", Some(500))]);

    shop.toggle("x");
    assert_eq!(shop.log().counter, Some(1));
    assert!(shop.log().previews.is_empty());
    assert!(shop.log().baskets.is_empty());
}

// =============================================================================
// Order form
// =============================================================================

#[test]
fn test_delivery_form_message_priority() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.open_basket();
    shop.emit(topics::BASKET_SUBMIT, &StoreEvent::Empty);

    assert_eq!(shop.state.get_state(), Screen::OrderForm);
    assert_eq!(shop.log().modal, Some(ModalContent::Delivery));
    {
        let log = shop.log();
        let form = log.deliveries.last().unwrap();
        assert_eq!(form.error.as_deref(), Some(messages::FILL_FIELDS));
        assert!(!form.valid);
    }

    shop.emit(
        topics::PAYMENT_SELECTED,
        &StoreEvent::PaymentSelected(PaymentMethod::Cash),
    );
    {
        let log = shop.log();
        let form = log.deliveries.last().unwrap();
        assert_eq!(form.payment, Some(PaymentMethod::Cash));
        assert_eq!(form.error.as_deref(), Some(messages::ADDRESS));
    }

    shop.edit(FieldId::ADDRESS, "Nevsky 1");
    let log = shop.log();
    let form = log.deliveries.last().unwrap();
    assert_eq!(form.error, None);
    assert!(form.valid);
}

#[test]
fn test_address_only_leaves_payment_message() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.open_basket();
    shop.emit(topics::BASKET_SUBMIT, &StoreEvent::Empty);

    shop.edit(FieldId::ADDRESS, "Nevsky 1");
    let log = shop.log();
    assert_eq!(
        log.deliveries.last().unwrap().error.as_deref(),
        Some(messages::PAYMENT)
    );
}

#[test]
fn test_field_edits_focus_the_owning_form() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.open_basket();
    shop.emit(topics::BASKET_SUBMIT, &StoreEvent::Empty);

    let before = shop.log().contacts.len();
    shop.edit(FieldId::ADDRESS, "Nevsky 1");
    assert_eq!(shop.log().delivery_focus, vec![FieldId::ADDRESS]);
    assert!(shop.log().contacts_focus.is_empty());
    assert_eq!(shop.log().contacts.len(), before + 1);

    shop.edit(FieldId::EMAIL, "a@b.c");
    assert_eq!(shop.log().contacts_focus, vec![FieldId::EMAIL]);
    assert_eq!(shop.log().contacts.last().unwrap().email, "a@b.c");
    assert_eq!(shop.state.get_order().email, "a@b.c");
}

#[test]
fn test_invalid_delivery_submit_stays_on_delivery() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.open_basket();
    shop.emit(topics::BASKET_SUBMIT, &StoreEvent::Empty);

    shop.emit(topics::ORDER_SUBMIT, &StoreEvent::Empty);
    assert_eq!(shop.dispatcher.order_step(), OrderStep::Delivery);
    assert_eq!(shop.log().modal, Some(ModalContent::Delivery));

    shop.edit(FieldId::PAYMENT, "card");
    shop.edit(FieldId::ADDRESS, "Nevsky 1");
    shop.emit(topics::ORDER_SUBMIT, &StoreEvent::Empty);
    assert_eq!(shop.dispatcher.order_step(), OrderStep::Contacts);
    assert_eq!(shop.log().modal, Some(ModalContent::Contacts));
    assert_eq!(
        shop.log().contacts.last().unwrap().error.as_deref(),
        Some(messages::FILL_FIELDS)
    );
}

#[tokio::test]
async fn test_incomplete_contacts_submit_does_not_call_service() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.fill_checkout();
    shop.edit(FieldId::PHONE, "");

    shop.submit_contacts().await;
    assert_eq!(shop.service.submit_calls(), 0);
    assert_eq!(
        shop.log().contacts.last().unwrap().error.as_deref(),
        Some(messages::PHONE)
    );
}

// =============================================================================
// Submission
// =============================================================================

#[tokio::test]
async fn test_successful_order_clears_basket_and_draft() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.service.push_outcome(SubmitOutcome::Accept(OrderResult {
        id: OrderId::new("o1"),
        total: Decimal::from(500),
    }));
    shop.toggle("x");
    shop.fill_checkout();

    shop.submit_contacts().await;

    assert_eq!(shop.state.get_state(), Screen::Success);
    assert_eq!(shop.state.basket_len(), 0);
    assert_eq!(shop.state.get_order(), OrderDraft::default());
    assert!(!shop.dispatcher.is_submitting());

    let request = shop.service.requests().pop().unwrap();
    assert_eq!(request.payment, PaymentMethod::Card);
    assert_eq!(request.address, "Spb Vosstania 1");
    assert_eq!(request.total, Decimal::from(500));

    let log = shop.log();
    assert_eq!(log.successes.last().unwrap().total, "500 synapses");
    assert_eq!(log.modal, Some(ModalContent::Success));
    assert_eq!(log.counter, Some(0));
}

#[tokio::test]
async fn test_success_acknowledged_closes_overlay() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.fill_checkout();
    shop.submit_contacts().await;

    shop.emit(topics::SUCCESS_SUBMIT, &StoreEvent::Empty);
    assert_eq!(shop.state.get_state(), Screen::None);
    assert_eq!(shop.log().modal, None);
    assert!(!shop.log().locked);
}

#[tokio::test]
async fn test_failed_order_keeps_state_and_retry_succeeds() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.service.push_outcome(SubmitOutcome::Reject {
        status: 400,
        message: "Invalid address".to_string(),
    });
    shop.toggle("x");
    shop.fill_checkout();
    let draft = shop.state.get_order();

    shop.submit_contacts().await;

    assert_eq!(shop.state.get_state(), Screen::OrderForm);
    assert_eq!(shop.dispatcher.order_step(), OrderStep::Contacts);
    assert_eq!(shop.state.basket_len(), 1);
    assert_eq!(shop.state.get_order(), draft);
    assert!(!shop.dispatcher.is_submitting());
    {
        let log = shop.log();
        let expected = "The order was rejected: Invalid address";
        assert_eq!(log.contacts.last().unwrap().error.as_deref(), Some(expected));
        assert_eq!(log.notices, vec![expected]);
        assert_eq!(log.modal, Some(ModalContent::Contacts));
    }

    shop.submit_contacts().await;
    assert_eq!(shop.service.submit_calls(), 2);
    assert_eq!(shop.state.get_state(), Screen::Success);
    assert_eq!(shop.log().successes.last().unwrap().total, "500 synapses");
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_ignored() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.fill_checkout();

    shop.drive(|shop| {
        shop.emit(topics::CONTACTS_SUBMIT, &StoreEvent::Empty);
        assert!(shop.dispatcher.is_submitting());
        shop.emit(topics::CONTACTS_SUBMIT, &StoreEvent::Empty);
    })
    .await;

    assert_eq!(shop.service.submit_calls(), 1);
    assert_eq!(shop.log().successes.len(), 1);
    assert!(!shop.dispatcher.is_submitting());
}

#[tokio::test]
async fn test_closing_overlay_during_submit_still_completes_order() {
    let shop = Storefront::new(vec![card("x", Some(500))]);
    shop.toggle("x");
    shop.fill_checkout();

    shop.drive(|shop| {
        shop.emit(topics::CONTACTS_SUBMIT, &StoreEvent::Empty);
        shop.emit(topics::MODAL_CLOSE, &StoreEvent::Empty);
    })
    .await;

    assert_eq!(shop.state.basket_len(), 0);
    assert_eq!(shop.state.get_state(), Screen::Success);
}
