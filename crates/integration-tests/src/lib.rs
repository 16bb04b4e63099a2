//! Integration tests for Klarna order management.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kom-integration-tests
//! ```
//!
//! No network access is needed: every test drives the coordinator through a
//! [`ScriptedTransport`] that replays canned Klarna responses and records the
//! requests it was handed.
//!
//! # Test Categories
//!
//! - `request_builder` - Endpoints, credentials and request bodies
//! - `lifecycle_capture` - Completion and capture
//! - `lifecycle_cancel` - Cancellation and unsupported orders
//! - `lifecycle_refund` - Refunds and line item updates

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use kom::klarna::{HttpResponse, KlarnaClient, RequestSpec, Transport, TransportError};
use kom::store::SettingsGroup;
use kom::{Coordinator, MemoryOrderStore, MemorySettings, OrderStore, StoreError};
use kom_core::{CountryCode, CurrencyCode, Order, OrderId, OrderMeta, OrderStatus, PaymentVariant};
use rust_decimal::Decimal;

/// Transport replaying queued responses in order.
///
/// Clones share the same queue and request log. Once the queue is empty every
/// send fails with a connection error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Script>>,
}

#[derive(Debug, Default)]
struct Script {
    responses: Vec<HttpResponse>,
    sent: Vec<RequestSpec>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    #[must_use]
    pub fn respond(self, status: u16, body: &str) -> Self {
        self.push(HttpResponse::new(status, body));
        self
    }

    /// Queue a prepared response.
    pub fn push(&self, response: HttpResponse) {
        self.lock().responses.push(response);
    }

    /// Requests sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<RequestSpec> {
        self.lock().sent.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestSpec) -> Result<HttpResponse, TransportError> {
        let mut script = self.lock();
        script.sent.push(request.clone());
        if script.responses.is_empty() {
            return Err(TransportError::Connection(format!(
                "no response scripted for {} {}",
                request.method, request.url
            )));
        }
        Ok(script.responses.remove(0))
    }
}

/// In-memory order store whose metadata writes can be switched off.
///
/// Loads and notes always go through, so a test can still read what the
/// coordinator recorded after a failed write.
#[derive(Debug, Clone, Default)]
pub struct SwitchableStore {
    inner: Arc<MemoryOrderStore>,
    refuse_meta: Arc<AtomicBool>,
}

impl SwitchableStore {
    #[must_use]
    pub fn new(inner: Arc<MemoryOrderStore>) -> Self {
        Self {
            inner,
            refuse_meta: Arc::default(),
        }
    }

    /// Make every following `save_meta` fail with an I/O error.
    pub fn refuse_meta_writes(&self) {
        self.refuse_meta.store(true, Ordering::SeqCst);
    }
}

impl OrderStore for SwitchableStore {
    fn load(&self, id: OrderId) -> Result<Order, StoreError> {
        self.inner.load(id)
    }

    fn save_meta(&self, id: OrderId, meta: &OrderMeta) -> Result<(), StoreError> {
        if self.refuse_meta.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("orders file is read-only").into());
        }
        self.inner.save_meta(id, meta)
    }

    fn add_note(&self, id: OrderId, note: &str) -> Result<(), StoreError> {
        self.inner.add_note(id, note)
    }
}

/// Coordinator wired to in-memory stores and a scripted transport.
pub type TestCoordinator = Coordinator<SwitchableStore, Arc<MemorySettings>, ScriptedTransport>;

/// Everything a lifecycle test needs to arrange and assert.
pub struct Harness {
    pub coordinator: TestCoordinator,
    pub orders: Arc<MemoryOrderStore>,
    pub store: SwitchableStore,
    pub settings: Arc<MemorySettings>,
    pub transport: ScriptedTransport,
}

impl Harness {
    /// Build a harness holding `order`, production credentials for the US
    /// and EU buckets of both variants, and the given transport.
    #[must_use]
    pub fn new(order: Order, transport: ScriptedTransport) -> Self {
        let orders = Arc::new(MemoryOrderStore::with_orders([order]));
        let store = SwitchableStore::new(Arc::clone(&orders));
        let settings = Arc::new(live_settings());
        let client = KlarnaClient::new(Arc::clone(&settings), transport.clone());
        Self {
            coordinator: Coordinator::new(store.clone(), client),
            orders,
            store,
            settings,
            transport,
        }
    }

    /// Current snapshot of an order.
    ///
    /// # Panics
    ///
    /// Panics if the order is not in the store.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Order {
        self.orders.get(id).unwrap_or_else(|| panic!("order {id} not in store"))
    }

    /// Note texts on an order, oldest first.
    #[must_use]
    pub fn notes(&self, id: OrderId) -> Vec<String> {
        self.orders.notes(id).into_iter().map(|n| n.text).collect()
    }
}

/// Settings with `testmode = no` and live credentials for both variants.
#[must_use]
pub fn live_settings() -> MemorySettings {
    let settings = MemorySettings::new();

    let kp = SettingsGroup::Variant(PaymentVariant::KlarnaPayments);
    settings.set(kp, "testmode", "no");
    for bucket in ["us", "se", "de", "au"] {
        settings.set(kp, &format!("merchant_id_{bucket}"), &format!("KP_{bucket}"));
        settings.set(kp, &format!("shared_secret_{bucket}"), "kp-secret");
    }

    let kco = SettingsGroup::Variant(PaymentVariant::KlarnaCheckout);
    settings.set(kco, "testmode", "no");
    for bucket in ["us", "eu"] {
        settings.set(kco, &format!("merchant_id_{bucket}"), &format!("KCO_{bucket}"));
        settings.set(kco, &format!("shared_secret_{bucket}"), "kco-secret");
    }

    settings
}

/// A Klarna Payments order with a stored Klarna order ID.
///
/// # Panics
///
/// Panics if `country` or `currency` is not a valid code.
#[must_use]
pub fn klarna_order(id: i64, country: &str, currency: &str, total: Decimal) -> Order {
    Order {
        id: OrderId::new(id),
        payment_method: PaymentVariant::KlarnaPayments.payment_method().to_owned(),
        country: CountryCode::parse(country).unwrap_or_else(|e| panic!("{e}")),
        status: OrderStatus::Processing,
        currency: CurrencyCode::parse(currency).unwrap_or_else(|e| panic!("{e}")),
        total,
        total_tax: Decimal::ZERO,
        lines: Vec::new(),
        meta: OrderMeta {
            klarna_order_id: Some(format!("kid-{id}").into()),
            ..OrderMeta::default()
        },
    }
}

/// JSON body of a retrieve response.
#[must_use]
pub fn remote_order(id: &str, status: &str, fraud_status: &str) -> String {
    serde_json::json!({
        "order_id": id,
        "status": status,
        "fraud_status": fraud_status,
    })
    .to_string()
}
