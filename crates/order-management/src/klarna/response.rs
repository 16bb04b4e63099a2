//! Response interpretation and the response log hook.

use serde::Deserialize;
use tracing::{debug, warn};

use super::KlarnaError;
use super::request::RequestSpec;
use super::transport::{HttpResponse, TransportError};

/// Error body returned by the order management API.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    correlation_id: Option<String>,
}

/// Turn a raw response into a JSON payload or an API error.
///
/// An empty 2xx body is an acknowledgement and decodes to `null`.
///
/// # Errors
///
/// Returns [`KlarnaError::Api`] for non-2xx statuses and
/// [`KlarnaError::Decode`] if a 2xx body is not JSON.
pub fn interpret(
    request: &RequestSpec,
    response: &HttpResponse,
) -> Result<serde_json::Value, KlarnaError> {
    if !response.is_success() {
        let body: ApiErrorBody = serde_json::from_str(&response.body).unwrap_or_default();
        let message = if body.error_messages.is_empty() {
            format!("API Error {}", response.status)
        } else {
            body.error_messages.join("; ")
        };

        warn!(
            operation = %request.operation,
            status = response.status,
            error_code = ?body.error_code,
            correlation_id = ?body.correlation_id,
            "Klarna API error"
        );

        return Err(KlarnaError::Api {
            status: response.status,
            message,
            context: request.context(),
        });
    }

    if response.body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }

    serde_json::from_str(&response.body).map_err(|e| {
        KlarnaError::Decode(format!(
            "{} returned invalid JSON: {e}",
            request.operation
        ))
    })
}

/// Hook receiving every response, successful or not.
pub trait ResponseLog: Send + Sync {
    /// Called once per dispatched request, before interpretation.
    fn record(&self, request: &RequestSpec, response: Result<&HttpResponse, &TransportError>);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLog;

impl ResponseLog for NoopLog {
    fn record(&self, _request: &RequestSpec, _response: Result<&HttpResponse, &TransportError>) {}
}

/// Emits one `tracing` event per response.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ResponseLog for TracingLog {
    fn record(&self, request: &RequestSpec, response: Result<&HttpResponse, &TransportError>) {
        match response {
            Ok(response) => debug!(
                operation = %request.operation,
                method = %request.method,
                url = %request.url,
                status = response.status,
                body = %response.body,
                "Klarna response"
            ),
            Err(error) => warn!(
                operation = %request.operation,
                method = %request.method,
                url = %request.url,
                error = %error,
                "Klarna request failed"
            ),
        }
    }
}
