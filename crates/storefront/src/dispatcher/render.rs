//! Derivation of region data from the application state.
//!
//! Pure functions: they read the state and never publish.

use larek_core::{Card, Namespace};

use crate::state::AppState;
use crate::validation::{ValidationResult, form_message};
use crate::views::{
    BasketData, BasketItem, ButtonLabel, CatalogItem, ContactsFormData, DeliveryFormData,
    PreviewData, SuccessData,
};

pub fn catalog_items(state: &AppState, cards: &[Card]) -> Vec<CatalogItem> {
    cards
        .iter()
        .map(|card| CatalogItem {
            id: card.id.clone(),
            title: card.title.clone(),
            category: card.category.clone(),
            image: card.image.clone(),
            price: state.format_currency(card.price),
        })
        .collect()
}

/// `InBasket` wins over price; a priceless card outside the basket is `Unavailable`.
pub fn button_label(state: &AppState, card: &Card) -> ButtonLabel {
    if state.contains(&card.id) {
        ButtonLabel::InBasket
    } else if card.price.is_priceless() {
        ButtonLabel::Unavailable
    } else {
        ButtonLabel::Available
    }
}

pub fn preview(state: &AppState, card: &Card) -> PreviewData {
    let button = button_label(state, card);
    PreviewData {
        id: card.id.clone(),
        title: card.title.clone(),
        description: card.description.clone(),
        category: card.category.clone(),
        image: card.image.clone(),
        price: state.format_currency(card.price),
        button,
        button_enabled: button.is_enabled(),
    }
}

/// Basket rows in insertion order.
///
/// Ids missing from the catalog break a state invariant; they are reported
/// and skipped.
pub fn basket(state: &AppState) -> BasketData {
    let mut missing = Vec::new();
    let items: Vec<BasketItem> = state
        .get_basket_card_id()
        .into_iter()
        .filter_map(|id| match state.get_card(&id) {
            Ok(card) => Some(card),
            Err(err) => {
                err.report();
                missing.push(id);
                None
            }
        })
        .enumerate()
        .map(|(position, card)| BasketItem {
            index: position + 1,
            price: state.format_currency(card.price),
            id: card.id,
            title: card.title,
        })
        .collect();

    debug_assert!(
        missing.is_empty(),
        "basket references cards outside the catalog: {missing:?}"
    );

    BasketData {
        disabled: items.is_empty(),
        items,
        total: state.format_amount(state.get_total()),
    }
}

pub fn delivery_form(state: &AppState, validation: &ValidationResult) -> DeliveryFormData {
    let draft = state.get_order();
    DeliveryFormData {
        payment: draft.payment,
        address: draft.address,
        valid: validation.delivery_valid(),
        error: form_message(validation, Namespace::Order).map(str::to_string),
    }
}

/// Validation messages take precedence over the last submission failure.
pub fn contacts_form(
    state: &AppState,
    validation: &ValidationResult,
    failure: Option<&str>,
) -> ContactsFormData {
    let draft = state.get_order();
    ContactsFormData {
        email: draft.email,
        phone: draft.phone,
        valid: validation.contacts_valid(),
        error: form_message(validation, Namespace::Contacts)
            .or(failure)
            .map(str::to_string),
    }
}

pub fn success(state: &AppState, total: rust_decimal::Decimal) -> SuccessData {
    SuccessData {
        total: state.format_amount(total),
    }
}
