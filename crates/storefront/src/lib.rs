//! Web-Larek storefront core.
//!
//! A single-threaded reactive core: an [`events::EventBus`] carries UI and
//! state notifications, [`state::AppState`] owns the catalog, basket and
//! order draft, and the [`dispatcher::Dispatcher`] decides which view region
//! re-renders after each event. Rendering itself is delegated to
//! [`views::Regions`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod services;
pub mod state;
pub mod validation;
pub mod views;
