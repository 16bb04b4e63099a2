//! Klarna request errors.

use kom_core::{KlarnaOrderId, MoneyError, OrderId, PaymentVariant};
use thiserror::Error;

use super::transport::TransportError;

/// Errors returned by [`KlarnaClient`](super::KlarnaClient).
///
/// The client never recovers from any of these; callers decide what to do.
#[derive(Debug, Error)]
pub enum KlarnaError {
    /// The order was not paid through a Klarna integration.
    #[error("Order {0} was not paid with Klarna")]
    UnsupportedOrder(OrderId),

    /// No Klarna order ID is stored on the order.
    #[error("Order {0} has no Klarna order ID")]
    MissingKlarnaOrderId(OrderId),

    /// The Klarna order ID cannot be used as a URL path segment.
    #[error("Invalid Klarna order ID '{0}'")]
    InvalidKlarnaOrderId(KlarnaOrderId),

    /// Neither the order nor the settings carry a merchant ID and shared secret.
    #[error("Klarna missing credentials for {variant}")]
    MissingCredentials {
        /// Variant whose settings were searched.
        variant: PaymentVariant,
    },

    /// The HTTP layer failed before a response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Klarna answered with a non-2xx status.
    #[error("Klarna API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Klarna's error messages, or a generic message.
        message: String,
        /// Request method, URL and body, for diagnostics.
        context: String,
    },

    /// Klarna accepted a capture but returned no capture ID.
    #[error("Klarna accepted the capture but returned no capture ID")]
    MissingCaptureId,

    /// A 2xx response could not be decoded.
    #[error("Invalid Klarna response: {0}")]
    Decode(String),

    /// An amount could not be converted to minor units.
    #[error("Invalid amount: {0}")]
    Amount(#[from] MoneyError),

    /// A header value (user agent, authorization) is not valid HTTP.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl KlarnaError {
    /// Human-readable message, suitable for an order note.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status code, for API errors.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
