//! Klarna order management API client.
//!
//! Builds authenticated, region-aware requests against Klarna's order
//! management API and normalizes the responses.
//!
//! # Architecture
//!
//! - [`endpoint`] picks the hostname: region from the billing country,
//!   playground unless the variant's `testmode` setting is `no`
//! - [`credentials`] resolves the merchant ID and shared secret per order
//! - [`request`] turns an [`Operation`] into a [`RequestSpec`]
//! - [`transport`] sends it; [`response`] interprets what came back
//! - [`KlarnaClient`] ties these together, one HTTP call per operation
//!
//! # API Reference
//!
//! - Base URL: `https://api<region><.playground>.klarna.com/`
//! - Authentication: HTTP Basic with merchant ID and shared secret
//! - Amounts: integer minor units

pub mod client;
pub mod credentials;
pub mod endpoint;
mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{DEFAULT_USER_AGENT, KlarnaClient};
pub use credentials::Credentials;
pub use endpoint::{ApiRegion, Environment, base_url};
pub use error::KlarnaError;
pub use request::{Operation, OperationKind, RefundRequest, RequestSpec};
pub use response::{NoopLog, ResponseLog, TracingLog};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
