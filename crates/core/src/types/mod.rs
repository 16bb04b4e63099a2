//! Core types for Klarna order management.
//!
//! This module provides type-safe wrappers for the host order and for the
//! provider-side view of it.

pub mod country;
pub mod id;
pub mod money;
pub mod order;
pub mod remote;
pub mod status;
pub mod variant;

pub use country::{CountryCode, CountryError};
pub use id::*;
pub use money::{CurrencyCode, MoneyError, to_minor_units};
pub use order::{Order, OrderLine, OrderLineKind, OrderMeta};
pub use remote::RemoteOrder;
pub use status::*;
pub use variant::PaymentVariant;
