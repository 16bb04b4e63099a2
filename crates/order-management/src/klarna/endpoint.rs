//! Klarna API hostnames.
//!
//! The base URL is `https://api<region><.playground>.klarna.com/`: the
//! region suffix picks the processing region, the playground segment the
//! sandbox.

use kom_core::{CountryCode, PaymentVariant};
use url::Url;

use crate::store::{SettingsGroup, SettingsStore};

/// Settings key holding the test mode flag.
pub const TESTMODE_KEY: &str = "testmode";

/// Klarna processing region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRegion {
    /// Default region, no suffix.
    Europe,
    /// `-na`
    NorthAmerica,
    /// `-oc`
    Oceania,
}

impl ApiRegion {
    /// Region serving orders billed to `country`.
    #[must_use]
    pub fn for_country(country: &CountryCode) -> Self {
        match country.as_str() {
            "CA" | "US" => Self::NorthAmerica,
            "AU" | "NZ" => Self::Oceania,
            _ => Self::Europe,
        }
    }

    /// Hostname suffix following `api`.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Europe => "",
            Self::NorthAmerica => "-na",
            Self::Oceania => "-oc",
        }
    }
}

/// Klarna environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Sandbox (`.playground`).
    Playground,
    /// Live.
    Production,
}

impl Environment {
    /// Environment configured for a variant.
    ///
    /// Playground unless the variant's `testmode` setting is exactly `no`.
    /// Order-level credential overrides do not influence this.
    pub fn for_variant<S: SettingsStore + ?Sized>(settings: &S, variant: PaymentVariant) -> Self {
        match settings
            .get(SettingsGroup::Variant(variant), TESTMODE_KEY)
            .as_deref()
        {
            Some("no") => Self::Production,
            _ => Self::Playground,
        }
    }

    /// Hostname segment preceding `.klarna.com`.
    #[must_use]
    pub const fn host_segment(&self) -> &'static str {
        match self {
            Self::Playground => ".playground",
            Self::Production => "",
        }
    }

    /// Prefix for credential settings keys.
    #[must_use]
    pub const fn settings_prefix(&self) -> &'static str {
        match self {
            Self::Playground => "test_",
            Self::Production => "",
        }
    }
}

/// Build the API base URL for a region and environment.
///
/// # Errors
///
/// Only fails if the assembled string is not a URL, which the fixed pattern
/// rules out; the error is kept so callers never have to unwrap.
pub fn base_url(region: ApiRegion, environment: Environment) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "https://api{}{}.klarna.com/",
        region.suffix(),
        environment.host_segment()
    ))
}
