//! Klarna order management API client.
//!
//! Resolves variant, environment and credentials per order, builds the
//! request, sends it once through the transport and decodes the result.

use kom_core::{CaptureId, Order, OrderLine, PaymentVariant, RemoteOrder};
use tracing::{debug, instrument};

use super::KlarnaError;
use super::credentials::Credentials;
use super::endpoint::Environment;
use super::request::{Operation, RefundRequest, RequestSpec};
use super::response::{NoopLog, ResponseLog, interpret};
use super::transport::{HttpResponse, Transport};
use crate::store::SettingsStore;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("kom/", env!("CARGO_PKG_VERSION"));

/// Decoded 2xx response.
struct Payload {
    body: serde_json::Value,
    response: HttpResponse,
}

impl Payload {
    /// `capture_id` from the body, falling back to the `Capture-Id` header.
    fn capture_id(&self) -> Option<CaptureId> {
        self.body
            .get("capture_id")
            .and_then(serde_json::Value::as_str)
            .or_else(|| self.response.header("Capture-Id"))
            .filter(|id| !id.is_empty())
            .map(CaptureId::from)
    }
}

/// Klarna order management client.
///
/// Every call resolves everything it needs from the order and the settings
/// store; the client itself holds no per-order state.
pub struct KlarnaClient<S, T, L = NoopLog> {
    settings: S,
    transport: T,
    log: L,
    user_agent: String,
}

impl<S, T, L> std::fmt::Debug for KlarnaClient<S, T, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KlarnaClient")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl<S, T> KlarnaClient<S, T, NoopLog> {
    /// Create a client that discards responses after interpreting them.
    #[must_use]
    pub fn new(settings: S, transport: T) -> Self {
        Self {
            settings,
            transport,
            log: NoopLog,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl<S, T, L> KlarnaClient<S, T, L> {
    /// Replace the response log.
    #[must_use]
    pub fn with_log<L2>(self, log: L2) -> KlarnaClient<S, T, L2> {
        KlarnaClient {
            settings: self.settings,
            transport: self.transport,
            log,
            user_agent: self.user_agent,
        }
    }

    /// Replace the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The settings store this client reads.
    #[must_use]
    pub const fn settings(&self) -> &S {
        &self.settings
    }
}

impl<S, T, L> KlarnaClient<S, T, L>
where
    S: SettingsStore,
    T: Transport,
    L: ResponseLog,
{
    /// Environment the variant's settings select.
    pub fn environment(&self, variant: PaymentVariant) -> Environment {
        Environment::for_variant(&self.settings, variant)
    }

    /// Build the request for an operation without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`KlarnaError::UnsupportedOrder`] for non-Klarna orders,
    /// [`KlarnaError::MissingCredentials`] when no credentials resolve, or a
    /// request construction error.
    pub fn prepare(
        &self,
        order: &Order,
        operation: &Operation<'_>,
    ) -> Result<RequestSpec, KlarnaError> {
        let variant = order
            .variant()
            .ok_or(KlarnaError::UnsupportedOrder(order.id))?;
        let environment = self.environment(variant);
        let credentials = Credentials::resolve(order, variant, environment, &self.settings)?;
        RequestSpec::build(operation, order, environment, &credentials, &self.user_agent)
    }

    async fn execute(
        &self,
        order: &Order,
        operation: &Operation<'_>,
    ) -> Result<Payload, KlarnaError> {
        let request = self.prepare(order, operation)?;
        debug!(operation = %request.operation, url = %request.url, "Sending Klarna request");

        let result = self.transport.send(&request).await;
        self.log.record(&request, result.as_ref());
        let response = result?;

        let body = interpret(&request, &response)?;
        Ok(Payload { body, response })
    }

    /// Fetch the current Klarna order.
    ///
    /// # Errors
    ///
    /// Returns any request error, or [`KlarnaError::Decode`] if the order
    /// lacks a status, fraud status or ID.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn retrieve(&self, order: &Order) -> Result<RemoteOrder, KlarnaError> {
        let payload = self.execute(order, &Operation::Retrieve).await?;
        serde_json::from_value(payload.body)
            .map_err(|e| KlarnaError::Decode(format!("invalid Klarna order: {e}")))
    }

    /// Cancel the order's remaining authorization.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    #[instrument(
        skip(self, order, remote),
        fields(order_id = %order.id, klarna_order_id = %remote.order_id)
    )]
    pub async fn cancel(&self, order: &Order, remote: &RemoteOrder) -> Result<(), KlarnaError> {
        self.execute(order, &Operation::Cancel { remote }).await?;
        Ok(())
    }

    /// Capture the order total.
    ///
    /// # Errors
    ///
    /// Returns any request error, or [`KlarnaError::MissingCaptureId`] if
    /// Klarna accepted the capture without reporting its ID.
    #[instrument(
        skip(self, order, remote),
        fields(order_id = %order.id, klarna_order_id = %remote.order_id)
    )]
    pub async fn capture(
        &self,
        order: &Order,
        remote: &RemoteOrder,
    ) -> Result<CaptureId, KlarnaError> {
        let payload = self.execute(order, &Operation::Capture { remote }).await?;
        payload.capture_id().ok_or(KlarnaError::MissingCaptureId)
    }

    /// Replace the authorized order lines.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    #[instrument(
        skip(self, order, remote, lines),
        fields(order_id = %order.id, lines = lines.len())
    )]
    pub async fn update_order_lines(
        &self,
        order: &Order,
        remote: &RemoteOrder,
        lines: &[OrderLine],
    ) -> Result<(), KlarnaError> {
        self.execute(order, &Operation::UpdateOrderLines { remote, lines })
            .await?;
        Ok(())
    }

    /// Refund against a captured order.
    ///
    /// Returns the new capture ID when Klarna reports one.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    #[instrument(
        skip(self, order, remote, refund),
        fields(order_id = %order.id, amount = %refund.amount)
    )]
    pub async fn refund(
        &self,
        order: &Order,
        remote: &RemoteOrder,
        refund: &RefundRequest,
    ) -> Result<Option<CaptureId>, KlarnaError> {
        let payload = self.execute(order, &Operation::Refund { remote, refund }).await?;
        Ok(payload.capture_id())
    }
}
