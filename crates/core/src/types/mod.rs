//! Core types for Web-Larek.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod card;
pub mod id;
pub mod order;
pub mod price;

pub use card::Card;
pub use id::*;
pub use order::{
    ContactField, DeliveryField, FieldId, FieldIdError, Namespace, OrderDraft, OrderRequest,
    OrderResult, PaymentMethod, PaymentMethodError,
};
pub use price::{CurrencyFormat, Price};
