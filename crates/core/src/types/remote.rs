//! Klarna-side order representation.

use serde::{Deserialize, Serialize};

use super::{FraudStatus, KlarnaOrderId, RemoteStatus};

/// A Klarna order as returned by the retrieve endpoint.
///
/// `order_id`, `status` and `fraud_status` are required: a response missing
/// any of them fails to decode instead of being read as an empty status.
/// Amounts are in minor units. Fields this crate does not use are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub order_id: KlarnaOrderId,
    pub status: RemoteStatus,
    pub fraud_status: FraudStatus,
    #[serde(default)]
    pub order_amount: Option<i64>,
    #[serde(default)]
    pub captured_amount: Option<i64>,
    #[serde(default)]
    pub refunded_amount: Option<i64>,
    #[serde(default)]
    pub remaining_authorized_amount: Option<i64>,
    #[serde(default)]
    pub purchase_currency: Option<String>,
}

impl RemoteOrder {
    /// Eligible for capture: not yet captured or cancelled, and cleared by
    /// fraud review.
    #[must_use]
    pub fn can_capture(&self) -> bool {
        !self.status.is_settled() && self.fraud_status == FraudStatus::Accepted
    }
}
