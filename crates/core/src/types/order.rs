//! Host order snapshot.
//!
//! The host system owns orders; this is the subset of an order that the
//! Klarna sync reads, plus the provider metadata it writes back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    CaptureId, CountryCode, CurrencyCode, KlarnaOrderId, OrderId, OrderStatus, PaymentVariant,
};

/// A host order as seen by the Klarna sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Host order ID.
    pub id: OrderId,
    /// Payment method tag (e.g. `klarna_payments`).
    pub payment_method: String,
    /// Billing country.
    pub country: CountryCode,
    /// Current host status.
    #[serde(default)]
    pub status: OrderStatus,
    /// Order currency.
    pub currency: CurrencyCode,
    /// Order total including tax, in major units.
    pub total: Decimal,
    /// Total tax, in major units.
    #[serde(default)]
    pub total_tax: Decimal,
    /// Line items, including shipping and fees.
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    /// Klarna metadata stored on the order.
    #[serde(default)]
    pub meta: OrderMeta,
}

impl Order {
    /// The Klarna integration this order was paid through, if any.
    #[must_use]
    pub fn variant(&self) -> Option<PaymentVariant> {
        PaymentVariant::from_payment_method(&self.payment_method)
    }
}

/// Klarna metadata fields persisted on a host order.
///
/// Empty strings loaded from the host are treated as absent by the
/// accessors; the raw fields stay as the host stored them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderMeta {
    /// Klarna order ID assigned at checkout.
    pub klarna_order_id: Option<KlarnaOrderId>,
    /// Capture ID of the latest successful capture or refund.
    pub capture_id: Option<CaptureId>,
    /// Set once the Klarna order has been cancelled from this side.
    pub cancelled: bool,
    /// Set while the order is being rejected through the pending-order
    /// flow, where Klarna has already dropped the authorization.
    pub pending_to_cancelled: bool,
    /// Order-level merchant ID override.
    pub merchant_id: Option<String>,
    /// Order-level shared secret override (may be HTML-escaped).
    pub shared_secret: Option<String>,
}

impl OrderMeta {
    /// Stored Klarna order ID, ignoring empty values.
    #[must_use]
    pub fn klarna_order_id(&self) -> Option<&KlarnaOrderId> {
        self.klarna_order_id.as_ref().filter(|id| !id.as_str().is_empty())
    }

    /// Stored capture ID, ignoring empty values.
    #[must_use]
    pub fn capture_id(&self) -> Option<&CaptureId> {
        self.capture_id.as_ref().filter(|id| !id.as_str().is_empty())
    }
}

/// Kind of order line, serialized with Klarna's `type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderLineKind {
    #[default]
    Physical,
    Digital,
    ShippingFee,
    Discount,
    SalesTax,
    Fee,
    GiftCard,
    Surcharge,
}

/// One line item of a host order, in major units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// SKU or other merchant reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Display name.
    pub name: String,
    /// Line kind.
    #[serde(default)]
    pub kind: OrderLineKind,
    /// Quantity.
    pub quantity: u32,
    /// Unit price including tax.
    pub unit_price: Decimal,
    /// Tax rate in percent (`25` for 25%).
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Line total including tax and after discounts.
    pub total_amount: Decimal,
    /// Tax included in the line total.
    #[serde(default)]
    pub total_tax_amount: Decimal,
    /// Discount applied to the line.
    #[serde(default)]
    pub total_discount_amount: Decimal,
}
