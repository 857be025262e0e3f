//! HTTP client for the Web-Larek storefront API.
//!
//! - `GET {api}/product/` returns `{ total, items: [Card] }`
//! - `POST {api}/order` accepts an [`OrderRequest`] and returns `{ id, total }`
//!
//! Card image paths are resolved against the CDN base on the way in.

use async_trait::async_trait;
use larek_core::{Card, OrderRequest, OrderResult};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{ApiError, OrderService};
use crate::config::ApiConfig;

/// List envelope used by the API.
#[derive(Debug, Deserialize)]
struct ApiListResponse<T> {
    total: u64,
    items: Vec<T>,
}

/// Error body used by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Storefront API client.
#[derive(Clone)]
pub struct LarekClient {
    client: reqwest::Client,
    api_base: String,
    cdn_base: String,
}

impl LarekClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_base: config.api_base(),
            cdn_base: config.cdn_base(),
        })
    }

    /// Fetch the product list.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get_cards(&self) -> Result<Vec<Card>, ApiError> {
        let url = format!("{}/product/", self.api_base);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;

        let list: ApiListResponse<Card> = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        debug!(
            count = list.items.len(),
            total = list.total,
            "Fetched catalog"
        );

        Ok(list
            .items
            .into_iter()
            .map(|mut card| {
                card.image = resolve_image(&self.cdn_base, &card.image);
                card
            })
            .collect())
    }

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the API rejects the order.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total))]
    pub async fn order_cards(&self, order: &OrderRequest) -> Result<OrderResult, ApiError> {
        let url = format!("{}/order", self.api_base);
        let response = self.client.post(&url).json(order).send().await?;
        let response = check_status(response).await?;

        let result: OrderResult = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        debug!(order_id = %result.id, "Order accepted");
        Ok(result)
    }
}

#[async_trait(?Send)]
impl OrderService for LarekClient {
    async fn fetch_catalog(&self) -> Result<Vec<Card>, ApiError> {
        self.get_cards().await
    }

    async fn submit_order(&self, order: OrderRequest) -> Result<OrderResult, ApiError> {
        self.order_cards(&order).await
    }
}

/// Turn a non-success response into `ApiError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(
        status = %status,
        body = %body.chars().take(500).collect::<String>(),
        "Storefront API returned non-success status"
    );

    Err(ApiError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Extract the message from an `{"error": "..."}` body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map_or_else(|_| body.trim().to_string(), |parsed| parsed.error)
}

/// Prefix a relative image path with the CDN base. Absolute URLs pass through.
fn resolve_image(cdn_base: &str, image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }
    format!(
        "{}/{}",
        cdn_base.trim_end_matches('/'),
        image.trim_start_matches('/')
    )
}
