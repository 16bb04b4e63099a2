//! Order lifecycle coordination.
//!
//! The host fires one of four events; the [`Coordinator`] decides whether a
//! Klarna call is warranted and records what happened on the order.
//!
//! # Flow
//!
//! 1. Check local guards (variant, stored IDs, flags, toggles)
//! 2. Retrieve the Klarna order
//! 3. Evaluate its status and fraud status
//! 4. Issue at most one mutating call
//! 5. Record the outcome as an order note and metadata
//!
//! Errors never reach the host: every failure ends as an order note and the
//! order keeps its previous local state.

mod coordinator;
pub mod notes;

pub use coordinator::Coordinator;

use core::fmt;
use std::future::Future;

use kom_core::{FraudStatus, OrderId, RemoteStatus};

use crate::klarna::RefundRequest;

/// Settings keys of the order management toggles.
pub mod toggles {
    pub const AUTO_CANCEL: &str = "kom_auto_cancel";
    pub const AUTO_CAPTURE: &str = "kom_auto_capture";
    pub const AUTO_UPDATE: &str = "kom_auto_update";
}

/// Where an order edit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    /// A person editing the order in the browser.
    Interactive,
    /// Background jobs, REST calls, imports.
    Background,
}

/// Why an event did not lead to a Klarna call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The order was not paid with Klarna.
    NotKlarna,
    /// The order is being rejected through the pending-order flow.
    PendingToCancelled,
    /// The Klarna order was already cancelled from this side.
    AlreadyCancelled,
    /// A capture ID is already stored.
    AlreadyCaptured,
    /// No Klarna order ID is stored.
    NoKlarnaOrder,
    /// The edit did not come from an interactive session.
    NotInteractive,
    /// Line items can only change while the order is on hold.
    NotOnHold,
    /// The order management toggle for this event is off.
    Disabled,
    /// The Klarna order's status rules the operation out.
    RemoteStatus(RemoteStatus),
    /// Klarna's fraud review has not accepted the order.
    FraudStatus(FraudStatus),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotKlarna => write!(f, "not a Klarna order"),
            Self::PendingToCancelled => write!(f, "pending order is being rejected"),
            Self::AlreadyCancelled => write!(f, "already cancelled"),
            Self::AlreadyCaptured => write!(f, "already captured"),
            Self::NoKlarnaOrder => write!(f, "no Klarna order ID"),
            Self::NotInteractive => write!(f, "edit was not interactive"),
            Self::NotOnHold => write!(f, "order is not on hold"),
            Self::Disabled => write!(f, "disabled in settings"),
            Self::RemoteStatus(status) => write!(f, "Klarna order status is {status}"),
            Self::FraudStatus(status) => write!(f, "Klarna fraud status is {status}"),
        }
    }
}

/// What an event led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The Klarna call succeeded and the outcome was recorded.
    Applied,
    /// No Klarna call was made.
    Skipped(SkipReason),
    /// A store or Klarna error ended the flow; the message was noted when
    /// the store allowed it.
    Failed(String),
}

impl LifecycleOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Host lifecycle events, one method per event.
///
/// Adapters wiring the host's event system call these directly. None of
/// them fail: errors are recorded on the order.
pub trait OrderLifecycle: Send + Sync {
    /// The order was cancelled in the host.
    fn on_order_cancelled(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = LifecycleOutcome> + Send;

    /// The order was marked completed in the host.
    fn on_order_completed(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = LifecycleOutcome> + Send;

    /// The order's line items were saved.
    fn on_order_items_saved(
        &self,
        order_id: OrderId,
        origin: EditOrigin,
    ) -> impl Future<Output = LifecycleOutcome> + Send;

    /// A refund was requested. Returns whether Klarna accepted it.
    fn on_refund_requested(
        &self,
        order_id: OrderId,
        refund: &RefundRequest,
    ) -> impl Future<Output = bool> + Send;
}
