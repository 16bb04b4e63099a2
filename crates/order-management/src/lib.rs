//! Klarna order management library.
//!
//! Keeps Klarna orders in step with the host shop: cancels the authorization
//! when an order is cancelled, captures when it completes, pushes line item
//! edits while it is on hold and forwards refunds.
//!
//! # Modules
//!
//! - [`klarna`] - Request builder, dispatcher and response interpretation
//! - [`lifecycle`] - Coordinator reacting to host order events
//! - [`store`] - Order and settings store traits with in-memory backends
//! - [`config`] - Environment configuration
//!
//! # Security
//!
//! Shared secrets are held as [`secrecy::SecretString`] and redacted from
//! `Debug` output. The `Authorization` header is marked sensitive.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod klarna;
pub mod lifecycle;
pub mod store;

pub use config::{ConfigError, KomConfig};
pub use klarna::{KlarnaClient, KlarnaError, RefundRequest};
pub use lifecycle::{Coordinator, EditOrigin, LifecycleOutcome, OrderLifecycle, SkipReason};
pub use store::{MemoryOrderStore, MemorySettings, OrderStore, SettingsStore, StoreError};
