//! In-memory stores, optionally loaded from and saved to YAML files.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use kom_core::{Order, OrderId, OrderMeta};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{OrderStore, SettingsGroup, SettingsStore, StoreError};

/// A note appended to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNote {
    pub created_at: DateTime<Utc>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredOrder {
    order: Order,
    #[serde(default)]
    notes: Vec<OrderNote>,
}

/// Order store kept in memory.
///
/// The YAML form is a list of `{ order, notes }` entries, which is what the
/// CLI reads and writes.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<BTreeMap<OrderId, StoredOrder>>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given orders.
    #[must_use]
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let store = Self::new();
        for order in orders {
            store.insert(order);
        }
        store
    }

    /// Insert or replace an order, keeping its notes.
    pub fn insert(&self, order: Order) {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        match orders.get_mut(&order.id) {
            Some(stored) => stored.order = order,
            None => {
                orders.insert(
                    order.id,
                    StoredOrder {
                        order,
                        notes: Vec::new(),
                    },
                );
            }
        }
    }

    /// Current snapshot of an order.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<Order> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|stored| stored.order.clone())
    }

    /// Notes on an order, oldest first.
    #[must_use]
    pub fn notes(&self, id: OrderId) -> Vec<OrderNote> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|stored| stored.notes.clone())
            .unwrap_or_default()
    }

    /// Parse a store from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Yaml`] if the document is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, StoreError> {
        let entries: Vec<StoredOrder> = serde_yaml::from_str(yaml)?;
        let orders = entries
            .into_iter()
            .map(|entry| (entry.order.id, entry))
            .collect();
        Ok(Self {
            orders: RwLock::new(orders),
        })
    }

    /// Serialize the store to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Yaml`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, StoreError> {
        let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
        let entries: Vec<&StoredOrder> = orders.values().collect();
        Ok(serde_yaml::to_string(&entries)?)
    }

    /// Load a store from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> Result<Self, StoreError> {
        let yaml = std::fs::read_to_string(path)?;
        let store = Self::from_yaml(&yaml)?;
        debug!(path = %path.display(), "Loaded orders file");
        Ok(store)
    }

    /// Write the store to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_file(&self, path: &Path) -> Result<(), StoreError> {
        std::fs::write(path, self.to_yaml()?)?;
        debug!(path = %path.display(), "Saved orders file");
        Ok(())
    }
}

impl OrderStore for MemoryOrderStore {
    fn load(&self, id: OrderId) -> Result<Order, StoreError> {
        self.get(id).ok_or(StoreError::NotFound(id))
    }

    fn save_meta(&self, id: OrderId, meta: &OrderMeta) -> Result<(), StoreError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let stored = orders.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        stored.order.meta = meta.clone();
        Ok(())
    }

    fn add_note(&self, id: OrderId, note: &str) -> Result<(), StoreError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let stored = orders.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        stored.notes.push(OrderNote {
            created_at: Utc::now(),
            text: note.to_owned(),
        });
        Ok(())
    }
}

/// Settings kept in memory.
///
/// The YAML form maps group names (`klarna_payments`, `kco`, `kom`) to
/// string key/value tables:
///
/// ```yaml
/// klarna_payments:
///   testmode: "no"
///   merchant_id_us: "K123456"
///   shared_secret_us: "sharedsecret"
/// kom:
///   kom_auto_capture: "yes"
/// ```
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<(SettingsGroup, String), String>>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value.
    pub fn set(&self, group: SettingsGroup, key: &str, value: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((group, key.to_owned()), value.to_owned());
    }

    /// Remove a value.
    pub fn remove(&self, group: SettingsGroup, key: &str) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(group, key.to_owned()));
    }

    /// Parse settings from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or names an unknown
    /// group.
    pub fn from_yaml(yaml: &str) -> Result<Self, StoreError> {
        let groups: HashMap<String, HashMap<String, String>> = serde_yaml::from_str(yaml)?;
        let settings = Self::new();
        for (name, values) in groups {
            let group = SettingsGroup::parse(&name)?;
            for (key, value) in values {
                settings.set(group, &key, &value);
            }
        }
        Ok(settings)
    }

    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> Result<Self, StoreError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, group: SettingsGroup, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(group, key.to_owned()))
            .cloned()
    }
}
