//! Host collaborators: the order store and the settings store.
//!
//! The host system owns orders and settings. The coordinator only reaches
//! them through these traits, so an adapter can back them with whatever the
//! host persists to. [`MemoryOrderStore`] and [`MemorySettings`] are the
//! in-process implementations used by the CLI and tests.

mod memory;

pub use memory::{MemoryOrderStore, MemorySettings, OrderNote};

use core::fmt;

use kom_core::{Order, OrderId, OrderMeta, PaymentVariant};
use thiserror::Error;

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No order with this ID.
    #[error("Order {0} not found")]
    NotFound(OrderId),

    /// YAML (de)serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Reading or writing a backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A settings group name was not recognized.
    #[error("Unknown settings group: {0}")]
    UnknownGroup(String),
}

/// Access to host orders.
pub trait OrderStore: Send + Sync {
    /// Load a snapshot of an order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the order does not exist.
    fn load(&self, id: OrderId) -> Result<Order, StoreError>;

    /// Persist the Klarna metadata of an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the write fails.
    fn save_meta(&self, id: OrderId, meta: &OrderMeta) -> Result<(), StoreError>;

    /// Append a human-readable note to an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the write fails.
    fn add_note(&self, id: OrderId, note: &str) -> Result<(), StoreError>;
}

/// Settings groups, one per Klarna integration plus order management itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsGroup {
    /// Settings of a payment integration (credentials, test mode).
    Variant(PaymentVariant),
    /// Order management toggles.
    OrderManagement,
}

impl SettingsGroup {
    /// Name used in settings files.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Variant(variant) => variant.payment_method(),
            Self::OrderManagement => "kom",
        }
    }

    /// Parse a group from its settings file name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownGroup`] for any other name.
    pub fn parse(name: &str) -> Result<Self, StoreError> {
        if name == "kom" {
            return Ok(Self::OrderManagement);
        }
        PaymentVariant::from_payment_method(name)
            .map(Self::Variant)
            .ok_or_else(|| StoreError::UnknownGroup(name.to_owned()))
    }
}

impl fmt::Display for SettingsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only access to plugin settings.
pub trait SettingsStore: Send + Sync {
    /// Value of `key` in `group`, if set.
    fn get(&self, group: SettingsGroup, key: &str) -> Option<String>;

    /// Whether a `yes`/`no` toggle is enabled, treating unset as enabled.
    fn enabled(&self, group: SettingsGroup, key: &str) -> bool {
        self.get(group, key).as_deref() != Some("no")
    }
}

impl<T: OrderStore + ?Sized> OrderStore for std::sync::Arc<T> {
    fn load(&self, id: OrderId) -> Result<Order, StoreError> {
        (**self).load(id)
    }

    fn save_meta(&self, id: OrderId, meta: &OrderMeta) -> Result<(), StoreError> {
        (**self).save_meta(id, meta)
    }

    fn add_note(&self, id: OrderId, note: &str) -> Result<(), StoreError> {
        (**self).add_note(id, note)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for std::sync::Arc<T> {
    fn get(&self, group: SettingsGroup, key: &str) -> Option<String> {
        (**self).get(group, key)
    }
}
