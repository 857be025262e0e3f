//! Catalog and order services.
//!
//! The dispatcher only knows the [`OrderService`] contract. [`LarekClient`]
//! is the HTTP implementation used by the binary; tests substitute their own.

mod larek;

pub use larek::LarekClient;

use async_trait::async_trait;
use larek_core::{Card, OrderRequest, OrderResult};
use thiserror::Error;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Network collaborator: fetches the catalog and submits orders.
///
/// Futures are not `Send`; they run on the dispatcher's `LocalSet`.
#[async_trait(?Send)]
pub trait OrderService {
    /// Fetch the full catalog.
    async fn fetch_catalog(&self) -> Result<Vec<Card>, ApiError>;

    /// Submit an order and return the accepted order id and total.
    async fn submit_order(&self, order: OrderRequest) -> Result<OrderResult, ApiError>;
}
