//! View region contracts.
//!
//! Regions are rendering collaborators owned by the dispatcher. They receive
//! fully derived data (validated, formatted) and never read the state or the
//! bus themselves.

use std::fmt;

use larek_core::{CardId, FieldId, PaymentMethod};

/// A region that can be re-rendered from derived data.
pub trait Region<D> {
    fn render(&mut self, data: &D);
}

/// A form region that can move keyboard focus to one of its fields.
pub trait FormRegion<D>: Region<D> {
    fn focus(&mut self, field: FieldId);
}

/// The overlay that hosts preview, basket, forms and success content.
pub trait ModalShell {
    /// Show the overlay with the given content, replacing what was shown.
    fn open(&mut self, content: ModalContent);
    fn close(&mut self);
}

/// Page chrome outside the overlay.
pub trait Page {
    /// Update the basket counter in the header.
    fn set_counter(&mut self, count: usize);
    /// Lock or unlock page scrolling while the overlay is open.
    fn set_locked(&mut self, locked: bool);
}

/// Surface for network failures.
pub trait Notice {
    fn show(&mut self, message: &str);
}

/// Which region the overlay currently hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalContent {
    Preview,
    Basket,
    Delivery,
    Contacts,
    Success,
}

/// Preview button state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonLabel {
    /// The card is in the basket; the button removes it.
    InBasket,
    /// The card has no price and cannot be bought.
    Unavailable,
    Available,
}

impl ButtonLabel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InBasket => "Remove from basket",
            Self::Unavailable => "Unavailable",
            Self::Available => "Buy",
        }
    }

    /// The preview button is clickable unless the card cannot be bought.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for ButtonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gallery tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: CardId,
    pub title: String,
    pub category: String,
    pub image: String,
    /// Formatted price or the priceless label.
    pub price: String,
}

/// Card preview content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewData {
    pub id: CardId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub button: ButtonLabel,
    pub button_enabled: bool,
}

/// One basket row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketItem {
    /// 1-based display position.
    pub index: usize,
    pub id: CardId,
    pub title: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketData {
    pub items: Vec<BasketItem>,
    /// Formatted total.
    pub total: String,
    /// Checkout button disabled (empty basket).
    pub disabled: bool,
}

/// Delivery sub-form: payment method and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFormData {
    pub payment: Option<PaymentMethod>,
    pub address: String,
    /// Submit enabled.
    pub valid: bool,
    pub error: Option<String>,
}

/// Contacts sub-form: email and phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactsFormData {
    pub email: String,
    pub phone: String,
    /// Submit enabled.
    pub valid: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessData {
    /// Formatted total charged.
    pub total: String,
}

/// Every region the dispatcher drives.
pub struct Regions {
    pub catalog: Box<dyn Region<Vec<CatalogItem>>>,
    pub preview: Box<dyn Region<PreviewData>>,
    pub basket: Box<dyn Region<BasketData>>,
    pub delivery: Box<dyn FormRegion<DeliveryFormData>>,
    pub contacts: Box<dyn FormRegion<ContactsFormData>>,
    pub success: Box<dyn Region<SuccessData>>,
    pub modal: Box<dyn ModalShell>,
    pub page: Box<dyn Page>,
    pub notice: Box<dyn Notice>,
}

impl Regions {
    /// Regions that write every render to the log. Used by the headless binary.
    #[must_use]
    pub fn logging() -> Self {
        Self {
            catalog: Box::new(LogRegion::new("catalog")),
            preview: Box::new(LogRegion::new("preview")),
            basket: Box::new(LogRegion::new("basket")),
            delivery: Box::new(LogRegion::new("delivery")),
            contacts: Box::new(LogRegion::new("contacts")),
            success: Box::new(LogRegion::new("success")),
            modal: Box::new(LogRegion::new("modal")),
            page: Box::new(LogRegion::new("page")),
            notice: Box::new(LogRegion::new("notice")),
        }
    }
}

impl fmt::Debug for Regions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Regions").finish_non_exhaustive()
    }
}

/// Region that logs what it is given.
#[derive(Debug, Clone)]
pub struct LogRegion {
    name: &'static str,
}

impl LogRegion {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl<D: fmt::Debug> Region<D> for LogRegion {
    fn render(&mut self, data: &D) {
        tracing::info!(region = self.name, ?data, "render");
    }
}

impl<D: fmt::Debug> FormRegion<D> for LogRegion {
    fn focus(&mut self, field: FieldId) {
        tracing::debug!(region = self.name, %field, "focus");
    }
}

impl ModalShell for LogRegion {
    fn open(&mut self, content: ModalContent) {
        tracing::info!(region = self.name, ?content, "open");
    }

    fn close(&mut self) {
        tracing::info!(region = self.name, "close");
    }
}

impl Page for LogRegion {
    fn set_counter(&mut self, count: usize) {
        tracing::info!(region = self.name, count, "counter");
    }

    fn set_locked(&mut self, locked: bool) {
        tracing::debug!(region = self.name, locked, "scroll lock");
    }
}

impl Notice for LogRegion {
    fn show(&mut self, message: &str) {
        tracing::warn!(region = self.name, message, "notice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_label_enabled() {
        assert!(ButtonLabel::Available.is_enabled());
        assert!(ButtonLabel::InBasket.is_enabled());
        assert!(!ButtonLabel::Unavailable.is_enabled());
    }

    #[test]
    fn test_button_label_display() {
        assert_eq!(ButtonLabel::Available.to_string(), "Buy");
        assert_eq!(ButtonLabel::InBasket.to_string(), "Remove from basket");
    }
}
