//! Order draft, field identity, and order wire types.
//!
//! The checkout is split across two forms: the delivery form (`order`
//! namespace) and the contacts form (`contacts` namespace). Every editable
//! field is addressed by a [`FieldId`], whose variant doubles as the
//! namespace discriminant used to route edits to the owning form.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CardId, OrderId};

/// Errors that can occur when parsing a [`PaymentMethod`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodError {
    /// The value is not one of the supported methods.
    #[error("unknown payment method: {0:?}")]
    Unknown(String),
}

/// Errors that can occur when parsing a [`FieldId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldIdError {
    /// The name is not one of the order form inputs.
    #[error("unknown order field: {0:?}")]
    Unknown(String),
}

/// How the customer pays for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Online card payment.
    Card,
    /// Cash on delivery.
    Cash,
}

impl PaymentMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "cash" => Ok(Self::Cash),
            other => Err(PaymentMethodError::Unknown(other.to_owned())),
        }
    }
}

/// Logical form a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Delivery form: payment method and address.
    Order,
    /// Contacts form: email and phone.
    Contacts,
}

impl Namespace {
    /// Topic prefix used for field change events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Contacts => "contacts",
        }
    }
}

/// Fields of the delivery form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeliveryField {
    Payment,
    Address,
}

/// Fields of the contacts form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContactField {
    Email,
    Phone,
}

/// Identity of an editable order field, tagged with its namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    Delivery(DeliveryField),
    Contact(ContactField),
}

impl FieldId {
    pub const PAYMENT: Self = Self::Delivery(DeliveryField::Payment);
    pub const ADDRESS: Self = Self::Delivery(DeliveryField::Address);
    pub const EMAIL: Self = Self::Contact(ContactField::Email);
    pub const PHONE: Self = Self::Contact(ContactField::Phone);

    /// Every field, in form order.
    pub const ALL: [Self; 4] = [Self::PAYMENT, Self::ADDRESS, Self::EMAIL, Self::PHONE];

    /// The form that owns this field.
    #[must_use]
    pub const fn namespace(&self) -> Namespace {
        match self {
            Self::Delivery(_) => Namespace::Order,
            Self::Contact(_) => Namespace::Contacts,
        }
    }

    /// Input name of the field, as used on the wire.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Delivery(DeliveryField::Payment) => "payment",
            Self::Delivery(DeliveryField::Address) => "address",
            Self::Contact(ContactField::Email) => "email",
            Self::Contact(ContactField::Phone) => "phone",
        }
    }

    /// Topic emitted when the field is edited, e.g. `order.address:change`.
    #[must_use]
    pub fn change_topic(&self) -> String {
        format!("{}.{}:change", self.namespace().as_str(), self.name())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldId {
    type Err = FieldIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| FieldIdError::Unknown(s.to_owned()))
    }
}

/// The in-progress checkout record.
///
/// Fields start empty and are overwritten in place; validation is computed
/// on demand rather than enforced on write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDraft {
    pub payment: Option<PaymentMethod>,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl OrderDraft {
    /// Overwrite a field by identity.
    ///
    /// A payment value that is not a known method leaves payment unset.
    pub fn set(&mut self, field: FieldId, value: &str) {
        match field {
            FieldId::Delivery(DeliveryField::Payment) => {
                self.payment = value.parse().ok();
            }
            FieldId::Delivery(DeliveryField::Address) => value.clone_into(&mut self.address),
            FieldId::Contact(ContactField::Email) => value.clone_into(&mut self.email),
            FieldId::Contact(ContactField::Phone) => value.clone_into(&mut self.phone),
        }
    }

    /// Current value of a field as text; an unset payment reads as empty.
    #[must_use]
    pub fn value(&self, field: FieldId) -> &str {
        match field {
            FieldId::Delivery(DeliveryField::Payment) => {
                self.payment.as_ref().map_or("", PaymentMethod::as_str)
            }
            FieldId::Delivery(DeliveryField::Address) => &self.address,
            FieldId::Contact(ContactField::Email) => &self.email,
            FieldId::Contact(ContactField::Phone) => &self.phone,
        }
    }

    /// Reset every field to empty/unset.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Order submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub payment: PaymentMethod,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub items: Vec<CardId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Successful order response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}
