//! Lifecycle coordinator.

use kom_core::{Order, OrderId, OrderStatus, RemoteOrder};
use tracing::{error, info, instrument, warn};

use super::{EditOrigin, LifecycleOutcome, OrderLifecycle, SkipReason, notes, toggles};
use crate::klarna::{KlarnaClient, KlarnaError, NoopLog, RefundRequest, ResponseLog, Transport};
use crate::store::{OrderStore, SettingsGroup, SettingsStore};

/// Reacts to host lifecycle events by calling Klarna and recording the
/// outcome on the order.
///
/// Construct one per process (or per test) with explicit collaborators.
/// Guards are check-then-act against the order store; overlapping events
/// for the same order are not serialized here.
pub struct Coordinator<O, S, T, L = NoopLog> {
    orders: O,
    client: KlarnaClient<S, T, L>,
}

impl<O, S, T, L> std::fmt::Debug for Coordinator<O, S, T, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl<O, S, T, L> Coordinator<O, S, T, L> {
    #[must_use]
    pub const fn new(orders: O, client: KlarnaClient<S, T, L>) -> Self {
        Self { orders, client }
    }

    /// The order store.
    #[must_use]
    pub const fn orders(&self) -> &O {
        &self.orders
    }

    /// The Klarna client.
    #[must_use]
    pub const fn client(&self) -> &KlarnaClient<S, T, L> {
        &self.client
    }
}

impl<O, S, T, L> Coordinator<O, S, T, L>
where
    O: OrderStore,
    S: SettingsStore,
    T: Transport,
    L: ResponseLog,
{
    fn load(&self, order_id: OrderId) -> Result<Order, LifecycleOutcome> {
        self.orders.load(order_id).map_err(|e| {
            error!(%order_id, error = %e, "Failed to load order");
            LifecycleOutcome::Failed(e.to_string())
        })
    }

    fn note(&self, order_id: OrderId, text: &str) {
        if let Err(e) = self.orders.add_note(order_id, text) {
            error!(%order_id, error = %e, note = text, "Failed to add order note");
        }
    }

    /// Persist metadata after a successful Klarna call.
    ///
    /// On failure the flow ends: the Klarna side changed but the guard that
    /// keeps the call from repeating was not written.
    fn save_meta(&self, order: &Order, action: &str) -> Result<(), LifecycleOutcome> {
        self.orders.save_meta(order.id, &order.meta).map_err(|e| {
            error!(order_id = %order.id, action, error = %e, "Failed to save order metadata");
            self.note(order.id, &notes::not_recorded(action, &e));
            LifecycleOutcome::Failed(e.to_string())
        })
    }

    fn toggle_enabled(&self, key: &str) -> bool {
        self.client
            .settings()
            .enabled(SettingsGroup::OrderManagement, key)
    }

    /// Note a Klarna failure and turn it into an outcome.
    fn fail(&self, order: &Order, action: &str, err: &KlarnaError) -> LifecycleOutcome {
        warn!(
            order_id = %order.id,
            action,
            status = ?err.status(),
            error = %err,
            "Klarna operation failed"
        );
        self.note(order.id, &notes::failed(action, err));
        LifecycleOutcome::Failed(err.message())
    }

    /// Retrieve the Klarna order, noting failures as `action`.
    async fn retrieve(&self, order: &Order, action: &str) -> Result<RemoteOrder, LifecycleOutcome> {
        self.client
            .retrieve(order)
            .await
            .map_err(|e| self.fail(order, action, &e))
    }

    async fn cancel(&self, order_id: OrderId) -> LifecycleOutcome {
        let mut order = match self.load(order_id) {
            Ok(order) => order,
            Err(outcome) => return outcome,
        };

        let guard = if order.variant().is_none() {
            Some(SkipReason::NotKlarna)
        } else if order.meta.pending_to_cancelled {
            Some(SkipReason::PendingToCancelled)
        } else if order.meta.cancelled {
            Some(SkipReason::AlreadyCancelled)
        } else if order.meta.klarna_order_id().is_none() {
            Some(SkipReason::NoKlarnaOrder)
        } else if !self.toggle_enabled(toggles::AUTO_CANCEL) {
            Some(SkipReason::Disabled)
        } else {
            None
        };
        if let Some(reason) = guard {
            return LifecycleOutcome::Skipped(reason);
        }

        let remote = match self.retrieve(&order, "cancelled").await {
            Ok(remote) => remote,
            Err(outcome) => return outcome,
        };
        if remote.status.is_settled() {
            info!(
                %order_id,
                status = %remote.status,
                "Klarna order already settled, not cancelling"
            );
            return LifecycleOutcome::Skipped(SkipReason::RemoteStatus(remote.status));
        }

        match self.client.cancel(&order, &remote).await {
            Ok(()) => {
                order.meta.cancelled = true;
                if let Err(outcome) = self.save_meta(&order, "cancelled") {
                    return outcome;
                }
                self.note(order_id, &notes::cancelled());
                info!(%order_id, "Klarna order cancelled");
                LifecycleOutcome::Applied
            }
            Err(e) => self.fail(&order, "cancelled", &e),
        }
    }

    async fn update(&self, order_id: OrderId, origin: EditOrigin) -> LifecycleOutcome {
        if origin != EditOrigin::Interactive {
            return LifecycleOutcome::Skipped(SkipReason::NotInteractive);
        }

        let order = match self.load(order_id) {
            Ok(order) => order,
            Err(outcome) => return outcome,
        };

        let guard = if order.variant().is_none() {
            Some(SkipReason::NotKlarna)
        } else if order.status != OrderStatus::OnHold {
            Some(SkipReason::NotOnHold)
        } else if order.meta.klarna_order_id().is_none() {
            Some(SkipReason::NoKlarnaOrder)
        } else if !self.toggle_enabled(toggles::AUTO_UPDATE) {
            Some(SkipReason::Disabled)
        } else {
            None
        };
        if let Some(reason) = guard {
            return LifecycleOutcome::Skipped(reason);
        }

        let remote = match self.retrieve(&order, "updated").await {
            Ok(remote) => remote,
            Err(outcome) => return outcome,
        };
        if remote.status.is_settled() {
            return LifecycleOutcome::Skipped(SkipReason::RemoteStatus(remote.status));
        }

        match self
            .client
            .update_order_lines(&order, &remote, &order.lines)
            .await
        {
            Ok(()) => {
                self.note(order_id, &notes::updated());
                info!(%order_id, "Klarna order lines updated");
                LifecycleOutcome::Applied
            }
            Err(e) => self.fail(&order, "updated", &e),
        }
    }

    async fn capture(&self, order_id: OrderId) -> LifecycleOutcome {
        let mut order = match self.load(order_id) {
            Ok(order) => order,
            Err(outcome) => return outcome,
        };

        let guard = if order.variant().is_none() {
            Some(SkipReason::NotKlarna)
        } else if order.meta.capture_id().is_some() {
            Some(SkipReason::AlreadyCaptured)
        } else if order.meta.klarna_order_id().is_none() {
            Some(SkipReason::NoKlarnaOrder)
        } else if !self.toggle_enabled(toggles::AUTO_CAPTURE) {
            Some(SkipReason::Disabled)
        } else {
            None
        };
        if let Some(reason) = guard {
            return LifecycleOutcome::Skipped(reason);
        }

        let remote = match self.retrieve(&order, "captured").await {
            Ok(remote) => remote,
            Err(outcome) => return outcome,
        };
        if !remote.can_capture() {
            if remote.status.is_settled() {
                return LifecycleOutcome::Skipped(SkipReason::RemoteStatus(remote.status));
            }
            self.note(order_id, &notes::fraud_hold(remote.fraud_status));
            return LifecycleOutcome::Skipped(SkipReason::FraudStatus(remote.fraud_status));
        }

        match self.client.capture(&order, &remote).await {
            Ok(capture_id) => {
                let note = notes::captured(&capture_id, order.total, &order.currency);
                info!(%order_id, %capture_id, "Klarna order captured");
                order.meta.capture_id = Some(capture_id);
                if let Err(outcome) = self.save_meta(&order, "captured") {
                    return outcome;
                }
                self.note(order_id, &note);
                LifecycleOutcome::Applied
            }
            Err(e @ KlarnaError::MissingCaptureId) => {
                warn!(%order_id, "Klarna capture accepted without a capture ID");
                self.note(
                    order_id,
                    &notes::captured_without_id(order.total, &order.currency),
                );
                LifecycleOutcome::Failed(e.message())
            }
            Err(e) => self.fail(&order, "captured", &e),
        }
    }

    async fn refund(&self, order_id: OrderId, refund: &RefundRequest) -> bool {
        let Ok(mut order) = self.load(order_id) else {
            return false;
        };

        if order.variant().is_none() || order.meta.capture_id().is_none() {
            return false;
        }

        let Ok(remote) = self.retrieve(&order, "refunded").await else {
            return false;
        };
        if !remote.status.is_captured() {
            info!(
                %order_id,
                status = %remote.status,
                "Klarna order not captured, not refunding"
            );
            return false;
        }

        match self.client.refund(&order, &remote, refund).await {
            Ok(capture_id) => {
                if let Some(capture_id) = capture_id {
                    order.meta.capture_id = Some(capture_id);
                    if self.save_meta(&order, "refunded").is_err() {
                        return false;
                    }
                }
                self.note(
                    order_id,
                    &notes::refunded(refund.amount, &order.currency, refund.reason.as_deref()),
                );
                info!(%order_id, amount = %refund.amount, "Klarna order refunded");
                true
            }
            Err(e) => {
                self.fail(&order, "refunded", &e);
                false
            }
        }
    }
}

impl<O, S, T, L> OrderLifecycle for Coordinator<O, S, T, L>
where
    O: OrderStore,
    S: SettingsStore,
    T: Transport,
    L: ResponseLog,
{
    #[instrument(skip(self))]
    async fn on_order_cancelled(&self, order_id: OrderId) -> LifecycleOutcome {
        self.cancel(order_id).await
    }

    #[instrument(skip(self))]
    async fn on_order_completed(&self, order_id: OrderId) -> LifecycleOutcome {
        self.capture(order_id).await
    }

    #[instrument(skip(self))]
    async fn on_order_items_saved(
        &self,
        order_id: OrderId,
        origin: EditOrigin,
    ) -> LifecycleOutcome {
        self.update(order_id, origin).await
    }

    #[instrument(skip(self, refund), fields(amount = %refund.amount))]
    async fn on_refund_requested(&self, order_id: OrderId, refund: &RefundRequest) -> bool {
        self.refund(order_id, refund).await
    }
}
