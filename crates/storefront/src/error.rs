//! Unified error handling with Sentry integration.
//!
//! Validation failures and formatting never escape the dispatcher as thrown
//! errors; they are rendered inline. Network failures are reported here
//! (tracing + Sentry) before being surfaced to the user.

use larek_core::CardId;
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::ApiError;
use crate::validation::ValidationResult;

/// Application-level error type for the storefront core.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The order draft is incomplete.
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(ValidationResult),

    /// A card id does not exist in the catalog.
    #[error("Card not found: {0}")]
    NotFound(CardId),

    /// Catalog fetch or order submission failed.
    #[error("Network error: {0}")]
    Network(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl StorefrontError {
    /// Text suitable for showing to the customer.
    ///
    /// Internal details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(_) => "Fill in the required fields".to_string(),
            Self::NotFound(_) => "This item is no longer available".to_string(),
            Self::Network(ApiError::Api { status, .. }) if *status >= 500 => {
                "The shop is temporarily unavailable, please try again".to_string()
            }
            Self::Network(ApiError::Api { message, .. }) if !message.is_empty() => {
                format!("The order was rejected: {message}")
            }
            Self::Network(_) => "Could not reach the shop, please try again".to_string(),
            Self::Config(_) => "The shop is misconfigured".to_string(),
        }
    }

    /// Log the error and capture it to Sentry when it is not a user mistake.
    pub fn report(&self) {
        if matches!(self, Self::Network(_) | Self::NotFound(_) | Self::Config(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}
