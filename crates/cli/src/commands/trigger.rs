//! Fire a lifecycle event against the orders file.

use std::sync::Arc;

use kom::klarna::RefundRequest;
use kom::{Coordinator, EditOrigin, KomConfig, LifecycleOutcome, MemoryOrderStore, OrderLifecycle};
use kom_core::OrderId;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::Files;

/// Event to fire.
pub enum Event {
    Cancel(OrderId),
    Complete(OrderId),
    /// Order and whether the edit came from a background job.
    ItemsSaved(OrderId, bool),
    Refund(OrderId, Decimal, Option<String>),
}

impl Event {
    const fn order_id(&self) -> OrderId {
        match self {
            Self::Cancel(id)
            | Self::Complete(id)
            | Self::ItemsSaved(id, _)
            | Self::Refund(id, ..) => *id,
        }
    }
}

/// Run one event and save the orders file.
///
/// The file is written back even when the event failed, since failures are
/// recorded as order notes.
///
/// # Errors
///
/// Returns an error if the files cannot be read or written.
pub async fn run(
    files: &Files,
    config: &KomConfig,
    event: Event,
) -> Result<(), Box<dyn std::error::Error>> {
    let orders = Arc::new(MemoryOrderStore::load_file(&files.orders)?);
    let client = super::client(files, config)?;
    let coordinator = Coordinator::new(Arc::clone(&orders), client);

    let order_id = event.order_id();

    match event {
        Event::Cancel(id) => report(id, "cancel", &coordinator.on_order_cancelled(id).await),
        Event::Complete(id) => report(id, "complete", &coordinator.on_order_completed(id).await),
        Event::ItemsSaved(id, background) => {
            let origin = if background {
                EditOrigin::Background
            } else {
                EditOrigin::Interactive
            };
            report(id, "items-saved", &coordinator.on_order_items_saved(id, origin).await);
        }
        Event::Refund(id, amount, reason) => {
            let mut refund = RefundRequest::amount(amount);
            if let Some(reason) = reason {
                refund = refund.with_reason(reason);
            }
            if coordinator.on_refund_requested(id, &refund).await {
                info!(%id, %amount, "Refund accepted by Klarna");
            } else {
                warn!(%id, %amount, "Refund not performed");
            }
        }
    }

    for note in orders.notes(order_id) {
        info!("  [{}] {}", note.created_at.format("%Y-%m-%d %H:%M:%S"), note.text);
    }

    orders.save_file(&files.orders)?;
    Ok(())
}

fn report(id: OrderId, event: &str, outcome: &LifecycleOutcome) {
    match outcome {
        LifecycleOutcome::Applied => info!(%id, event, "Applied"),
        LifecycleOutcome::Skipped(reason) => info!(%id, event, %reason, "Skipped"),
        LifecycleOutcome::Failed(message) => warn!(%id, event, error = %message, "Failed"),
    }
}
