//! Supported Klarna payment integrations.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::CountryCode;

/// Which Klarna integration an order was paid through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentVariant {
    /// Klarna Payments (`klarna_payments`).
    #[serde(rename = "klarna_payments")]
    KlarnaPayments,
    /// Klarna Checkout (`kco`).
    #[serde(rename = "kco")]
    KlarnaCheckout,
}

impl PaymentVariant {
    /// Resolve a variant from a host payment method tag.
    #[must_use]
    pub fn from_payment_method(method: &str) -> Option<Self> {
        match method {
            "klarna_payments" => Some(Self::KlarnaPayments),
            "kco" => Some(Self::KlarnaCheckout),
            _ => None,
        }
    }

    /// The payment method tag the host stores on the order.
    #[must_use]
    pub const fn payment_method(&self) -> &'static str {
        match self {
            Self::KlarnaPayments => "klarna_payments",
            Self::KlarnaCheckout => "kco",
        }
    }

    /// Country segment of the credential settings keys.
    ///
    /// Klarna Payments stores credentials per country; Klarna Checkout only
    /// splits between the US and everyone else.
    #[must_use]
    pub fn country_bucket(&self, country: &CountryCode) -> String {
        match self {
            Self::KlarnaPayments => country.to_lowercase(),
            Self::KlarnaCheckout if country.is("US") => "us".to_owned(),
            Self::KlarnaCheckout => "eu".to_owned(),
        }
    }
}

impl fmt::Display for PaymentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.payment_method())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_payment_method() {
        assert_eq!(
            PaymentVariant::from_payment_method("klarna_payments"),
            Some(PaymentVariant::KlarnaPayments)
        );
        assert_eq!(
            PaymentVariant::from_payment_method("kco"),
            Some(PaymentVariant::KlarnaCheckout)
        );
        assert_eq!(PaymentVariant::from_payment_method("stripe"), None);
        assert_eq!(PaymentVariant::from_payment_method(""), None);
    }

    #[test]
    fn test_country_bucket() {
        let se = CountryCode::parse("SE").unwrap();
        let us = CountryCode::parse("US").unwrap();
        assert_eq!(PaymentVariant::KlarnaPayments.country_bucket(&se), "se");
        assert_eq!(PaymentVariant::KlarnaPayments.country_bucket(&us), "us");
        assert_eq!(PaymentVariant::KlarnaCheckout.country_bucket(&se), "eu");
        assert_eq!(PaymentVariant::KlarnaCheckout.country_bucket(&us), "us");
    }
}
