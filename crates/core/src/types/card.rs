//! Catalog card type.

use serde::{Deserialize, Serialize};

use super::id::CardId;
use super::price::Price;

/// A single catalog item as delivered by the storefront API.
///
/// Cards are immutable once loaded; the catalog is replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub description: String,
    /// Image path, resolved against the CDN by the API client.
    pub image: String,
    pub category: String,
    pub price: Price,
}

impl Card {
    /// Returns `true` if the card can be bought.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        !self.price.is_priceless()
    }
}
