//! Order note texts.

use kom_core::{CaptureId, CurrencyCode, FraudStatus};
use rust_decimal::Decimal;

use crate::klarna::KlarnaError;
use crate::store::StoreError;

#[must_use]
pub fn cancelled() -> String {
    "Klarna order cancelled.".to_owned()
}

#[must_use]
pub fn updated() -> String {
    "Klarna order updated.".to_owned()
}

#[must_use]
pub fn captured(capture_id: &CaptureId, amount: Decimal, currency: &CurrencyCode) -> String {
    format!(
        "Klarna order captured. Capture amount: {}. Capture ID: {capture_id}",
        currency.format_amount(amount)
    )
}

#[must_use]
pub fn refunded(amount: Decimal, currency: &CurrencyCode, reason: Option<&str>) -> String {
    let mut note = format!(
        "Klarna order refunded with {}.",
        currency.format_amount(amount)
    );
    if let Some(reason) = reason.filter(|r| !r.is_empty()) {
        note.push_str(" Reason: ");
        note.push_str(reason);
    }
    note
}

/// Klarna took the capture but the response carried no id to store.
#[must_use]
pub fn captured_without_id(amount: Decimal, currency: &CurrencyCode) -> String {
    format!(
        "Klarna order captured with {}, but no capture ID was returned. \
         Check the order in the Klarna merchant portal.",
        currency.format_amount(amount)
    )
}

/// The Klarna call succeeded but the order could not be updated locally.
#[must_use]
pub fn not_recorded(action: &str, error: &StoreError) -> String {
    format!("Klarna order {action}, but the order could not be updated: {error}")
}

#[must_use]
pub fn fraud_hold(status: FraudStatus) -> String {
    format!("Klarna order could not be captured. Fraud status: {status}.")
}

/// Note for a failed operation; `action` is a verb such as `capture`.
#[must_use]
pub fn failed(action: &str, error: &KlarnaError) -> String {
    format!("Klarna order could not be {action}. {}", error.message())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_note_includes_id_and_amount() {
        let usd = CurrencyCode::parse("USD").unwrap();
        let note = captured(&CaptureId::from("abc"), Decimal::new(12500, 2), &usd);
        assert_eq!(
            note,
            "Klarna order captured. Capture amount: 125.00 USD. Capture ID: abc"
        );
    }

    #[test]
    fn test_refunded_note() {
        let sek = CurrencyCode::parse("SEK").unwrap();
        assert_eq!(
            refunded(Decimal::new(50, 0), &sek, Some("customer request")),
            "Klarna order refunded with 50.00 SEK. Reason: customer request"
        );
        assert_eq!(
            refunded(Decimal::new(50, 0), &sek, Some("")),
            "Klarna order refunded with 50.00 SEK."
        );
    }

    #[test]
    fn test_failed_note_uses_error_message() {
        let err = KlarnaError::Api {
            status: 403,
            message: "Not allowed".to_string(),
            context: String::new(),
        };
        assert_eq!(
            failed("captured", &err),
            "Klarna order could not be captured. Not allowed"
        );
    }

    #[test]
    fn test_captured_without_id_is_distinct_from_failure() {
        let usd = CurrencyCode::parse("USD").unwrap();
        let note = captured_without_id(Decimal::new(12500, 2), &usd);
        assert!(note.starts_with("Klarna order captured with 125.00 USD, but no capture ID"));
        assert!(!note.contains("could not be captured"));
    }
}
