//! Order draft validation and form message selection.
//!
//! Validation is a pure function of the draft. It never blocks editing; it
//! only decides which inline message a form shows and whether its submit
//! button is enabled.

use std::collections::BTreeMap;

use larek_core::{ContactField, DeliveryField, FieldId, Namespace, OrderDraft};

/// User-facing validation messages.
pub mod messages {
    /// Shown when both fields of a form are missing.
    pub const FILL_FIELDS: &str = "Fill in the required fields";
    pub const PAYMENT: &str = "Choose a payment method";
    pub const ADDRESS: &str = "Enter the delivery address";
    pub const EMAIL: &str = "Enter your email";
    pub const PHONE: &str = "Enter your phone number";
}

/// Field-level errors of an order draft.
///
/// A missing key means the field is valid; an empty result means the draft
/// can be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<FieldId, &'static str>,
}

impl ValidationResult {
    /// Returns `true` if no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error message for a field, if it is invalid.
    #[must_use]
    pub fn get(&self, field: FieldId) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    #[must_use]
    pub fn is_invalid(&self, field: FieldId) -> bool {
        self.errors.contains_key(&field)
    }

    /// Returns `true` if every field of the namespace is valid.
    #[must_use]
    pub fn namespace_valid(&self, namespace: Namespace) -> bool {
        !self.errors.keys().any(|field| field.namespace() == namespace)
    }

    #[must_use]
    pub fn delivery_valid(&self) -> bool {
        self.namespace_valid(Namespace::Order)
    }

    #[must_use]
    pub fn contacts_valid(&self) -> bool {
        self.namespace_valid(Namespace::Contacts)
    }

    /// Invalid fields with their messages, in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &'static str)> + '_ {
        self.errors.iter().map(|(field, message)| (*field, *message))
    }

    /// Number of invalid fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

/// Specific message for an invalid field.
#[must_use]
pub const fn field_message(field: FieldId) -> &'static str {
    match field {
        FieldId::Delivery(DeliveryField::Payment) => messages::PAYMENT,
        FieldId::Delivery(DeliveryField::Address) => messages::ADDRESS,
        FieldId::Contact(ContactField::Email) => messages::EMAIL,
        FieldId::Contact(ContactField::Phone) => messages::PHONE,
    }
}

/// Fields of a form, in the order they are checked.
#[must_use]
pub const fn form_fields(namespace: Namespace) -> [FieldId; 2] {
    match namespace {
        Namespace::Order => [FieldId::PAYMENT, FieldId::ADDRESS],
        Namespace::Contacts => [FieldId::EMAIL, FieldId::PHONE],
    }
}

/// Validate the whole draft. Presence is the only rule.
#[must_use]
pub fn validate_order(draft: &OrderDraft) -> ValidationResult {
    let errors = FieldId::ALL
        .into_iter()
        .filter(|field| match field {
            FieldId::Delivery(DeliveryField::Payment) => draft.payment.is_none(),
            other => draft.value(*other).is_empty(),
        })
        .map(|field| (field, field_message(field)))
        .collect();

    ValidationResult { errors }
}

/// Pick the single inline message a form shows.
///
/// Rules are evaluated top-down and the first hit wins:
/// 1. both fields invalid: the generic "fill the fields" message
/// 2. the first-checked field invalid: its message
/// 3. the second field invalid: its message
/// 4. otherwise no message
#[must_use]
pub fn form_message(result: &ValidationResult, namespace: Namespace) -> Option<&'static str> {
    let [first, second] = form_fields(namespace);
    let first_invalid = result.is_invalid(first);
    let second_invalid = result.is_invalid(second);

    let rules = [
        (first_invalid && second_invalid, messages::FILL_FIELDS),
        (first_invalid, field_message(first)),
        (second_invalid, field_message(second)),
    ];

    rules
        .into_iter()
        .find_map(|(hit, message)| hit.then_some(message))
}
