//! Order models and buyer-info validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use atelier_core::{
    CancelReason, Color, Email, OrderId, OrderLineId, OrderStatus, ProductId, ReturnReason, Size,
    UserId,
};

/// A placed order.
///
/// Buyer details are a snapshot taken at checkout; `total_amount` is frozen
/// at the same moment. The lifecycle sub-records (cancellation, return,
/// refund) are stamped by the state machine as transitions happen.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Public identifier used in URLs and buyer communication.
    pub public_id: Uuid,
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub email: Email,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub cancel_reason: Option<CancelReason>,
    pub cancel_detail: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub return_reason: Option<ReturnReason>,
    pub return_detail: Option<String>,
    pub return_requested_at: Option<DateTime<Utc>>,
    pub return_approved_at: Option<DateTime<Utc>>,
    pub return_completed_at: Option<DateTime<Utc>>,
    pub refund_amount: Option<Decimal>,
    pub refund_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One variant line of an order, with the price frozen at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Product name at the time of purchase.
    pub product_name: String,
    pub size: Size,
    pub color: Color,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Validation errors for buyer contact details.
#[derive(Debug, Error)]
pub enum BuyerInfoError {
    #[error("full name must not be empty")]
    EmptyName,
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] atelier_core::EmailError),
    #[error("phone number must have at least {0} digits")]
    PhoneTooShort(usize),
    #[error("shipping address must not be empty")]
    EmptyAddress,
}

const MIN_PHONE_DIGITS: usize = 7;

/// Validated buyer details captured at checkout.
#[derive(Debug, Clone)]
pub struct BuyerInfo {
    full_name: String,
    email: Email,
    phone: String,
    address: String,
    notes: Option<String>,
}

impl BuyerInfo {
    /// Validate raw buyer input.
    ///
    /// # Errors
    ///
    /// Returns `BuyerInfoError` if any field fails validation. Checkout
    /// performs no writes when this fails.
    pub fn parse(
        full_name: &str,
        email: &str,
        phone: &str,
        address: &str,
        notes: Option<&str>,
    ) -> Result<Self, BuyerInfoError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(BuyerInfoError::EmptyName);
        }
        let email = Email::parse(email)?;
        let phone = phone.trim();
        if phone.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS {
            return Err(BuyerInfoError::PhoneTooShort(MIN_PHONE_DIGITS));
        }
        let address = address.trim();
        if address.is_empty() {
            return Err(BuyerInfoError::EmptyAddress);
        }
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        Ok(Self {
            full_name: full_name.to_owned(),
            email,
            phone: phone.to_owned(),
            address: address.to_owned(),
            notes: notes.map(str::to_owned),
        })
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buyer_info_valid() {
        let info = BuyerInfo::parse(
            "  Mai Anh  ",
            "mai@example.com",
            "+84 912 345 678",
            "12 Hang Gai, Hanoi",
            Some("  leave at door "),
        )
        .expect("valid buyer info");
        assert_eq!(info.full_name(), "Mai Anh");
        assert_eq!(info.email().as_str(), "mai@example.com");
        assert_eq!(info.notes(), Some("leave at door"));
    }

    #[test]
    fn test_buyer_info_rejects_blank_fields() {
        assert!(matches!(
            BuyerInfo::parse("  ", "a@b.c", "0123456789", "addr", None),
            Err(BuyerInfoError::EmptyName)
        ));
        assert!(matches!(
            BuyerInfo::parse("Mai", "not-an-email", "0123456789", "addr", None),
            Err(BuyerInfoError::InvalidEmail(_))
        ));
        assert!(matches!(
            BuyerInfo::parse("Mai", "a@b.c", "12345", "addr", None),
            Err(BuyerInfoError::PhoneTooShort(_))
        ));
        assert!(matches!(
            BuyerInfo::parse("Mai", "a@b.c", "0123456789", "   ", None),
            Err(BuyerInfoError::EmptyAddress)
        ));
    }

    #[test]
    fn test_empty_notes_become_none() {
        let info = BuyerInfo::parse("Mai", "a@b.c", "0123456789", "addr", Some("   "))
            .expect("valid buyer info");
        assert!(info.notes().is_none());
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            id: OrderLineId::new(1),
            order_id: OrderId::new(1),
            product_id: ProductId::new(1),
            product_name: "Linen Shirt".to_owned(),
            size: Size::M,
            color: Color::White,
            quantity: 3,
            unit_price: "45.50".parse().expect("decimal"),
        };
        assert_eq!(line.line_total().to_string(), "136.50");
    }
}
