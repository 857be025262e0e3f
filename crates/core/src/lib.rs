//! Web-Larek Core - Shared domain types.
//!
//! This crate provides the types used by every Web-Larek component:
//! - `storefront` - Reactive storefront core (event bus, state, dispatcher)
//! - `integration-tests` - End-to-end checkout scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no event
//! dispatch, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, catalog cards, and the order draft

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
