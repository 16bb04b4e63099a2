//! Merchant credential resolution.
//!
//! Each component (`merchant_id`, `shared_secret`) comes from the order's
//! own metadata when set there, and otherwise from the variant settings
//! under `<test_>component_<country-bucket>`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kom_core::{Order, PaymentVariant};
use secrecy::{ExposeSecret, SecretString};

use super::KlarnaError;
use super::endpoint::Environment;
use crate::store::{SettingsGroup, SettingsStore};

/// Merchant ID and shared secret for one order.
#[derive(Clone)]
pub struct Credentials {
    merchant_id: String,
    shared_secret: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("merchant_id", &self.merchant_id)
            .field("shared_secret", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Create credentials from known values.
    #[must_use]
    pub const fn new(merchant_id: String, shared_secret: SecretString) -> Self {
        Self {
            merchant_id,
            shared_secret,
        }
    }

    /// Resolve credentials for an order.
    ///
    /// # Errors
    ///
    /// Returns [`KlarnaError::MissingCredentials`] when either component is
    /// missing or empty in both sources.
    pub fn resolve<S: SettingsStore + ?Sized>(
        order: &Order,
        variant: PaymentVariant,
        environment: Environment,
        settings: &S,
    ) -> Result<Self, KlarnaError> {
        let bucket = variant.country_bucket(&order.country);
        let component = |name: &str, order_value: Option<&String>| {
            non_empty(order_value.cloned()).or_else(|| {
                let key = format!("{}{name}_{bucket}", environment.settings_prefix());
                non_empty(settings.get(SettingsGroup::Variant(variant), &key))
            })
        };

        let merchant_id = component("merchant_id", order.meta.merchant_id.as_ref());
        let shared_secret = component("shared_secret", order.meta.shared_secret.as_ref());

        match (merchant_id, shared_secret) {
            (Some(merchant_id), Some(secret)) => Ok(Self {
                merchant_id,
                shared_secret: SecretString::from(secret),
            }),
            _ => Err(KlarnaError::MissingCredentials { variant }),
        }
    }

    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// `Authorization` header value: HTTP Basic over `merchant_id:secret`.
    ///
    /// The secret is HTML-unescaped first since hosts may store it escaped.
    #[must_use]
    pub fn authorization(&self) -> String {
        let secret = html_unescape(self.shared_secret.expose_secret());
        let token = STANDARD.encode(format!("{}:{secret}", self.merchant_id));
        format!("Basic {token}")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Undo HTML special-character escaping.
///
/// `&amp;` is replaced last so `&amp;lt;` decodes to `&lt;`, not `<`.
fn html_unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
