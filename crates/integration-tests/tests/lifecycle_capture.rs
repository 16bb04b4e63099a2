//! Integration tests for order completion and capture.

#![allow(clippy::unwrap_used)]

use kom::klarna::HttpResponse;
use kom::lifecycle::toggles;
use kom::store::SettingsGroup;
use kom::{LifecycleOutcome, OrderLifecycle, SkipReason};
use kom_core::{FraudStatus, OrderId, PaymentVariant};
use kom_integration_tests::{Harness, ScriptedTransport, klarna_order, remote_order};
use reqwest::header::HeaderValue;
use rust_decimal::Decimal;

const ORDER: OrderId = OrderId::new(1001);

fn harness(transport: ScriptedTransport) -> Harness {
    Harness::new(
        klarna_order(1001, "US", "USD", Decimal::new(12500, 2)),
        transport,
    )
}

// =============================================================================
// Capture Tests
// =============================================================================

#[tokio::test]
async fn test_capture_on_completion() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, &remote_order("kid-1001", "AUTHORIZED", "ACCEPTED"))
            .respond(201, r#"{"capture_id":"abc"}"#),
    );

    let outcome = h.coordinator.on_order_completed(ORDER).await;
    assert_eq!(outcome, LifecycleOutcome::Applied);

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0].url.as_str(),
        "https://api-na.klarna.com/ordermanagement/v1/orders/kid-1001"
    );
    assert_eq!(
        sent[1].url.as_str(),
        "https://api-na.klarna.com/ordermanagement/v1/orders/kid-1001/captures"
    );
    assert_eq!(sent[1].body.as_ref().unwrap()["captured_amount"], 12500);

    assert_eq!(h.order(ORDER).meta.capture_id().unwrap().as_str(), "abc");
    assert_eq!(
        h.notes(ORDER),
        vec!["Klarna order captured. Capture amount: 125.00 USD. Capture ID: abc"]
    );
}

#[tokio::test]
async fn test_capture_id_from_header() {
    let transport =
        ScriptedTransport::new().respond(200, &remote_order("kid-1001", "AUTHORIZED", "ACCEPTED"));
    let mut created = HttpResponse::new(201, "");
    created
        .headers
        .insert("Capture-Id", HeaderValue::from_static("cap-from-header"));
    transport.push(created);
    let h = harness(transport);

    assert!(h.coordinator.on_order_completed(ORDER).await.is_applied());
    assert_eq!(
        h.order(ORDER).meta.capture_id().unwrap().as_str(),
        "cap-from-header"
    );
}

#[tokio::test]
async fn test_capture_is_idempotent() {
    let mut order = klarna_order(1001, "US", "USD", Decimal::new(12500, 2));
    order.meta.capture_id = Some("existing".into());
    let h = Harness::new(order, ScriptedTransport::new());

    for _ in 0..3 {
        assert_eq!(
            h.coordinator.on_order_completed(ORDER).await,
            LifecycleOutcome::Skipped(SkipReason::AlreadyCaptured)
        );
    }
    assert!(h.transport.sent().is_empty());
    assert_eq!(h.order(ORDER).meta.capture_id().unwrap().as_str(), "existing");
}

#[tokio::test]
async fn test_capture_skipped_for_settled_remote() {
    for status in ["CAPTURED", "PART_CAPTURED", "CANCELLED"] {
        let h = harness(
            ScriptedTransport::new().respond(200, &remote_order("kid-1001", status, "ACCEPTED")),
        );
        let outcome = h.coordinator.on_order_completed(ORDER).await;
        assert!(
            matches!(outcome, LifecycleOutcome::Skipped(SkipReason::RemoteStatus(_))),
            "status {status}: {outcome:?}"
        );
        assert_eq!(h.transport.sent().len(), 1);
    }
}

#[tokio::test]
async fn test_capture_blocked_by_fraud_review() {
    for (fraud, expected) in [
        ("PENDING", FraudStatus::Pending),
        ("REJECTED", FraudStatus::Rejected),
    ] {
        let h = harness(
            ScriptedTransport::new().respond(200, &remote_order("kid-1001", "AUTHORIZED", fraud)),
        );
        assert_eq!(
            h.coordinator.on_order_completed(ORDER).await,
            LifecycleOutcome::Skipped(SkipReason::FraudStatus(expected))
        );
        assert_eq!(h.transport.sent().len(), 1);
        assert!(h.order(ORDER).meta.capture_id().is_none());
        assert_eq!(h.notes(ORDER).len(), 1);
    }
}

#[tokio::test]
async fn test_capture_api_error_is_noted() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, &remote_order("kid-1001", "AUTHORIZED", "ACCEPTED"))
            .respond(
                403,
                r#"{"error_code":"CAPTURE_NOT_ALLOWED","error_messages":["Capture not allowed."],"correlation_id":"c1"}"#,
            ),
    );

    let outcome = h.coordinator.on_order_completed(ORDER).await;
    assert_eq!(outcome, LifecycleOutcome::Failed("Capture not allowed.".to_string()));
    assert!(h.order(ORDER).meta.capture_id().is_none());
    assert_eq!(
        h.notes(ORDER),
        vec!["Klarna order could not be captured. Capture not allowed."]
    );
}

#[tokio::test]
async fn test_capture_transport_error_is_noted() {
    // Retrieve succeeds; nothing is scripted for the capture call.
    let h = harness(
        ScriptedTransport::new().respond(200, &remote_order("kid-1001", "AUTHORIZED", "ACCEPTED")),
    );

    let outcome = h.coordinator.on_order_completed(ORDER).await;
    assert!(matches!(outcome, LifecycleOutcome::Failed(_)));
    assert_eq!(h.notes(ORDER).len(), 1);
    assert!(h.notes(ORDER)[0].starts_with("Klarna order could not be captured."));
}

#[tokio::test]
async fn test_capture_missing_credentials_never_calls() {
    let h = harness(ScriptedTransport::new());
    h.settings.remove(
        SettingsGroup::Variant(PaymentVariant::KlarnaPayments),
        "shared_secret_us",
    );

    let outcome = h.coordinator.on_order_completed(ORDER).await;
    assert!(matches!(outcome, LifecycleOutcome::Failed(_)));
    assert!(h.transport.sent().is_empty());
    assert_eq!(h.notes(ORDER).len(), 1);
    assert!(h.notes(ORDER)[0].contains("missing credentials"));
}

#[tokio::test]
async fn test_capture_toggle_off() {
    let h = harness(ScriptedTransport::new());
    h.settings
        .set(SettingsGroup::OrderManagement, toggles::AUTO_CAPTURE, "no");

    assert_eq!(
        h.coordinator.on_order_completed(ORDER).await,
        LifecycleOutcome::Skipped(SkipReason::Disabled)
    );
    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn test_retrieve_without_fraud_status_fails_closed() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, r#"{"order_id":"kid-1001","status":"AUTHORIZED"}"#),
    );

    let outcome = h.coordinator.on_order_completed(ORDER).await;
    assert!(matches!(outcome, LifecycleOutcome::Failed(_)));
    assert_eq!(h.transport.sent().len(), 1);
    assert!(h.order(ORDER).meta.capture_id().is_none());
}

// =============================================================================
// Recording Failure Tests
// =============================================================================

#[tokio::test]
async fn test_capture_without_id_is_flagged() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, &remote_order("kid-1001", "AUTHORIZED", "ACCEPTED"))
            .respond(201, ""),
    );

    let outcome = h.coordinator.on_order_completed(ORDER).await;
    assert!(matches!(outcome, LifecycleOutcome::Failed(_)));
    assert!(h.order(ORDER).meta.capture_id().is_none());

    let notes = h.notes(ORDER);
    assert_eq!(notes.len(), 1);
    assert!(notes[0].starts_with("Klarna order captured with 125.00 USD, but no capture ID"));
    assert!(!notes[0].contains("could not be captured"));
}

#[tokio::test]
async fn test_capture_fails_when_order_cannot_be_saved() {
    let h = harness(
        ScriptedTransport::new()
            .respond(200, &remote_order("kid-1001", "AUTHORIZED", "ACCEPTED"))
            .respond(201, r#"{"capture_id":"abc"}"#),
    );
    h.store.refuse_meta_writes();

    let outcome = h.coordinator.on_order_completed(ORDER).await;
    assert!(matches!(outcome, LifecycleOutcome::Failed(ref msg) if msg.contains("read-only")));
    assert_eq!(h.transport.sent().len(), 2);
    assert!(h.order(ORDER).meta.capture_id().is_none());

    let notes = h.notes(ORDER);
    assert_eq!(notes.len(), 1, "no success note: {notes:?}");
    assert!(notes[0].starts_with("Klarna order captured, but the order could not be updated"));
}
