//! Integration tests for order cancellation and non-Klarna orders.

#![allow(clippy::unwrap_used)]

use kom::klarna::RefundRequest;
use kom::lifecycle::toggles;
use kom::store::SettingsGroup;
use kom::{EditOrigin, LifecycleOutcome, OrderLifecycle, SkipReason};
use kom_core::{OrderId, OrderStatus, RemoteStatus};
use kom_integration_tests::{Harness, ScriptedTransport, klarna_order, remote_order};
use rust_decimal::Decimal;

const ORDER: OrderId = OrderId::new(2001);

fn harness(transport: ScriptedTransport) -> Harness {
    Harness::new(
        klarna_order(2001, "SE", "SEK", Decimal::new(99900, 2)),
        transport,
    )
}

// =============================================================================
// Unsupported Order Tests
// =============================================================================

#[tokio::test]
async fn test_non_klarna_order_is_untouched() {
    let mut order = klarna_order(2001, "SE", "SEK", Decimal::new(99900, 2));
    order.payment_method = "bacs".to_string();
    order.status = OrderStatus::OnHold;
    let before = order.clone();
    let h = Harness::new(order, ScriptedTransport::new());

    assert_eq!(
        h.coordinator.on_order_cancelled(ORDER).await,
        LifecycleOutcome::Skipped(SkipReason::NotKlarna)
    );
    assert_eq!(
        h.coordinator.on_order_completed(ORDER).await,
        LifecycleOutcome::Skipped(SkipReason::NotKlarna)
    );
    assert_eq!(
        h.coordinator
            .on_order_items_saved(ORDER, EditOrigin::Interactive)
            .await,
        LifecycleOutcome::Skipped(SkipReason::NotKlarna)
    );
    let refund = RefundRequest::amount(Decimal::new(10, 0));
    assert!(!h.coordinator.on_refund_requested(ORDER, &refund).await);

    assert!(h.transport.sent().is_empty());
    assert!(h.notes(ORDER).is_empty());
    assert_eq!(h.order(ORDER), before);
}

#[tokio::test]
async fn test_unknown_order_fails_without_calls() {
    let h = harness(ScriptedTransport::new());
    let outcome = h.coordinator.on_order_cancelled(OrderId::new(1)).await;
    assert!(matches!(outcome, LifecycleOutcome::Failed(_)));
    assert!(h.transport.sent().is_empty());
}

// =============================================================================
// Cancel Tests
// =============================================================================

#[tokio::test]
async fn test_cancel_authorized_order() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, &remote_order("kid-2001", "AUTHORIZED", "ACCEPTED"))
            .respond(204, ""),
    );

    assert_eq!(
        h.coordinator.on_order_cancelled(ORDER).await,
        LifecycleOutcome::Applied
    );

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].method, reqwest::Method::POST);
    assert_eq!(
        sent[1].url.as_str(),
        "https://api.klarna.com/ordermanagement/v1/orders/kid-2001/cancel"
    );
    assert!(h.order(ORDER).meta.cancelled);
    assert_eq!(h.notes(ORDER), vec!["Klarna order cancelled."]);
}

#[tokio::test]
async fn test_cancel_skipped_for_settled_statuses() {
    for (status, expected) in [
        ("CAPTURED", RemoteStatus::Captured),
        ("PART_CAPTURED", RemoteStatus::PartCaptured),
        ("CANCELLED", RemoteStatus::Cancelled),
    ] {
        let h = harness(
            ScriptedTransport::new().respond(200, &remote_order("kid-2001", status, "ACCEPTED")),
        );

        assert_eq!(
            h.coordinator.on_order_cancelled(ORDER).await,
            LifecycleOutcome::Skipped(SkipReason::RemoteStatus(expected))
        );
        assert_eq!(h.transport.sent().len(), 1, "only the retrieve for {status}");
        assert!(!h.order(ORDER).meta.cancelled);
        assert!(h.notes(ORDER).is_empty());
    }
}

#[tokio::test]
async fn test_cancel_once() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, &remote_order("kid-2001", "AUTHORIZED", "ACCEPTED"))
            .respond(204, ""),
    );

    assert!(h.coordinator.on_order_cancelled(ORDER).await.is_applied());
    assert_eq!(
        h.coordinator.on_order_cancelled(ORDER).await,
        LifecycleOutcome::Skipped(SkipReason::AlreadyCancelled)
    );
    assert_eq!(h.transport.sent().len(), 2);
}

#[tokio::test]
async fn test_cancel_skipped_for_pending_rejection() {
    let mut order = klarna_order(2001, "SE", "SEK", Decimal::new(99900, 2));
    order.meta.pending_to_cancelled = true;
    let h = Harness::new(order, ScriptedTransport::new());

    assert_eq!(
        h.coordinator.on_order_cancelled(ORDER).await,
        LifecycleOutcome::Skipped(SkipReason::PendingToCancelled)
    );
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn test_cancel_without_klarna_order_id() {
    let mut order = klarna_order(2001, "SE", "SEK", Decimal::new(99900, 2));
    order.meta.klarna_order_id = None;
    let h = Harness::new(order, ScriptedTransport::new());

    assert_eq!(
        h.coordinator.on_order_cancelled(ORDER).await,
        LifecycleOutcome::Skipped(SkipReason::NoKlarnaOrder)
    );
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn test_cancel_toggle_off() {
    let h = harness(ScriptedTransport::new());
    h.settings
        .set(SettingsGroup::OrderManagement, toggles::AUTO_CANCEL, "no");

    assert_eq!(
        h.coordinator.on_order_cancelled(ORDER).await,
        LifecycleOutcome::Skipped(SkipReason::Disabled)
    );
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn test_cancel_retrieve_failure_is_noted() {
    let h = harness(ScriptedTransport::new().respond(
        404,
        r#"{"error_code":"NO_SUCH_ORDER","error_messages":["Order not found"]}"#,
    ));

    assert_eq!(
        h.coordinator.on_order_cancelled(ORDER).await,
        LifecycleOutcome::Failed("Order not found".to_string())
    );
    assert!(!h.order(ORDER).meta.cancelled);
    assert_eq!(
        h.notes(ORDER),
        vec!["Klarna order could not be cancelled. Order not found"]
    );
}

#[tokio::test]
async fn test_cancel_api_error_is_noted() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, &remote_order("kid-2001", "AUTHORIZED", "ACCEPTED"))
            .respond(
                403,
                r#"{"error_code":"NOT_ALLOWED","error_messages":["Cancel not allowed"]}"#,
            ),
    );

    assert_eq!(
        h.coordinator.on_order_cancelled(ORDER).await,
        LifecycleOutcome::Failed("Cancel not allowed".to_string())
    );
    assert_eq!(h.transport.sent().len(), 2);
    assert!(!h.order(ORDER).meta.cancelled);
    assert_eq!(
        h.notes(ORDER),
        vec!["Klarna order could not be cancelled. Cancel not allowed"]
    );
}

#[tokio::test]
async fn test_cancel_fails_when_order_cannot_be_saved() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, &remote_order("kid-2001", "AUTHORIZED", "ACCEPTED"))
            .respond(204, ""),
    );
    h.store.refuse_meta_writes();

    let outcome = h.coordinator.on_order_cancelled(ORDER).await;
    assert!(matches!(outcome, LifecycleOutcome::Failed(ref msg) if msg.contains("read-only")));
    assert!(!h.order(ORDER).meta.cancelled);

    let notes = h.notes(ORDER);
    assert_eq!(notes.len(), 1, "no success note: {notes:?}");
    assert!(notes[0].starts_with("Klarna order cancelled, but the order could not be updated"));
}
