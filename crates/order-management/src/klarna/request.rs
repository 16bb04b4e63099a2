//! Request construction for the order management API.
//!
//! A [`RequestSpec`] is a pure function of the operation, the order, the
//! resolved environment and the resolved credentials. Nothing here touches
//! the network or the stores.

use core::fmt;

use kom_core::{
    KlarnaOrderId, MoneyError, Order, OrderLine, OrderLineKind, RemoteOrder, to_minor_units,
};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use rust_decimal::Decimal;
use serde::Serialize;
use url::Url;

use super::KlarnaError;
use super::credentials::Credentials;
use super::endpoint::{ApiRegion, Environment, base_url};

/// Operation names, as used in logs and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Retrieve,
    Cancel,
    Capture,
    UpdateOrderLines,
    Refund,
}

impl OperationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Cancel => "cancel",
            Self::Capture => "capture",
            Self::UpdateOrderLines => "update_order_lines",
            Self::Refund => "refund",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A refund to issue against a captured order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    /// Amount in major units.
    pub amount: Decimal,
    /// Free-text reason, sent as the refund description.
    pub reason: Option<String>,
    /// Refunded lines; empty for an amount-only refund.
    pub lines: Vec<OrderLine>,
}

impl RefundRequest {
    /// Amount-only refund.
    #[must_use]
    pub fn amount(amount: Decimal) -> Self {
        Self {
            amount,
            reason: None,
            lines: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_lines(mut self, lines: Vec<OrderLine>) -> Self {
        self.lines = lines;
        self
    }
}

/// An operation and its operation-specific inputs.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Fetch the Klarna order stored on the host order.
    Retrieve,
    /// Cancel the remaining authorization.
    Cancel { remote: &'a RemoteOrder },
    /// Capture the order total.
    Capture { remote: &'a RemoteOrder },
    /// Replace the authorized order lines.
    UpdateOrderLines {
        remote: &'a RemoteOrder,
        lines: &'a [OrderLine],
    },
    /// Refund part or all of the captured amount.
    Refund {
        remote: &'a RemoteOrder,
        refund: &'a RefundRequest,
    },
}

impl Operation<'_> {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Retrieve => OperationKind::Retrieve,
            Self::Cancel { .. } => OperationKind::Cancel,
            Self::Capture { .. } => OperationKind::Capture,
            Self::UpdateOrderLines { .. } => OperationKind::UpdateOrderLines,
            Self::Refund { .. } => OperationKind::Refund,
        }
    }

    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Retrieve => Method::GET,
            Self::UpdateOrderLines { .. } => Method::PATCH,
            Self::Cancel { .. } | Self::Capture { .. } | Self::Refund { .. } => Method::POST,
        }
    }

    /// Klarna order ID the request targets.
    fn klarna_order_id<'o>(&'o self, order: &'o Order) -> Result<&'o KlarnaOrderId, KlarnaError> {
        match self {
            Self::Retrieve => order
                .meta
                .klarna_order_id()
                .ok_or(KlarnaError::MissingKlarnaOrderId(order.id)),
            Self::Cancel { remote }
            | Self::Capture { remote }
            | Self::UpdateOrderLines { remote, .. }
            | Self::Refund { remote, .. } => Ok(&remote.order_id),
        }
    }

    /// Path segment after the order ID, if any.
    const fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Retrieve => None,
            Self::Cancel { .. } => Some("cancel"),
            Self::Capture { .. } => Some("captures"),
            Self::UpdateOrderLines { .. } => Some("authorization"),
            Self::Refund { .. } => Some("refunds"),
        }
    }

    /// Request URL under `base`.
    ///
    /// The order ID is pushed as a single percent-encoded segment, so a
    /// stored ID can never change which endpoint is addressed.
    fn url(&self, base: Url, order_id: &KlarnaOrderId) -> Result<Url, KlarnaError> {
        // Dot segments would be dropped rather than encoded.
        if matches!(order_id.as_str(), "" | "." | "..") {
            return Err(KlarnaError::InvalidKlarnaOrderId(order_id.clone()));
        }
        let mut url = base;
        url.path_segments_mut()
            .map_err(|()| KlarnaError::Decode("base URL cannot carry a path".to_owned()))?
            .pop_if_empty()
            .extend(["ordermanagement", "v1", "orders", order_id.as_str()])
            .extend(self.suffix());
        Ok(url)
    }

    fn body(&self, order: &Order) -> Result<Option<serde_json::Value>, KlarnaError> {
        let body = match self {
            Self::Retrieve | Self::Cancel { .. } => return Ok(None),
            Self::Capture { .. } => serde_json::to_value(CaptureBody {
                captured_amount: to_minor_units(order.total)?,
                order_lines: klarna_lines(&order.lines)?,
            }),
            Self::UpdateOrderLines { lines, .. } => serde_json::to_value(UpdateAuthorizationBody {
                order_amount: to_minor_units(order.total)?,
                order_tax_amount: to_minor_units(order.total_tax)?,
                order_lines: klarna_lines(lines)?,
            }),
            Self::Refund { refund, .. } => serde_json::to_value(RefundBody {
                refunded_amount: to_minor_units(refund.amount)?,
                description: refund.reason.as_deref(),
                order_lines: klarna_lines(&refund.lines)?,
            }),
        };
        body.map(Some)
            .map_err(|e| KlarnaError::Decode(format!("failed to encode request body: {e}")))
    }
}

/// A fully built HTTP request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub operation: OperationKind,
    pub method: Method,
    pub url: Url,
    /// Includes `Authorization`, marked sensitive so it never prints.
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl RequestSpec {
    /// Build the request for `operation` on `order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the order has no Klarna order ID (retrieve only),
    /// an amount is out of range, or a header value is invalid.
    pub fn build(
        operation: &Operation<'_>,
        order: &Order,
        environment: Environment,
        credentials: &Credentials,
        user_agent: &str,
    ) -> Result<Self, KlarnaError> {
        let base = base_url(ApiRegion::for_country(&order.country), environment)
            .map_err(|e| KlarnaError::Decode(format!("invalid base URL: {e}")))?;
        let url = operation.url(base, operation.klarna_order_id(order)?)?;

        let mut authorization = HeaderValue::from_str(&credentials.authorization())?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);

        Ok(Self {
            operation: operation.kind(),
            method: operation.method(),
            url,
            headers,
            body: operation.body(order)?,
        })
    }

    /// Method, URL and body on one line, for error diagnostics.
    ///
    /// Headers are left out so credentials never end up in order notes.
    #[must_use]
    pub fn context(&self) -> String {
        let body = self
            .body
            .as_ref()
            .map_or_else(|| "-".to_owned(), serde_json::Value::to_string);
        format!("{} {} {body}", self.method, self.url)
    }
}

#[derive(Serialize)]
struct CaptureBody<'a> {
    captured_amount: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    order_lines: Vec<KlarnaOrderLine<'a>>,
}

#[derive(Serialize)]
struct UpdateAuthorizationBody<'a> {
    order_amount: i64,
    order_tax_amount: i64,
    order_lines: Vec<KlarnaOrderLine<'a>>,
}

#[derive(Serialize)]
struct RefundBody<'a> {
    refunded_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    order_lines: Vec<KlarnaOrderLine<'a>>,
}

/// Order line in Klarna's wire format (minor units, tax rate x100).
#[derive(Debug, Serialize)]
struct KlarnaOrderLine<'a> {
    #[serde(rename = "type")]
    kind: OrderLineKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<&'a str>,
    name: &'a str,
    quantity: u32,
    unit_price: i64,
    tax_rate: i64,
    total_amount: i64,
    total_discount_amount: i64,
    total_tax_amount: i64,
}

fn klarna_lines(lines: &[OrderLine]) -> Result<Vec<KlarnaOrderLine<'_>>, MoneyError> {
    lines
        .iter()
        .map(|line| {
            Ok(KlarnaOrderLine {
                kind: line.kind,
                reference: line.reference.as_deref(),
                name: &line.name,
                quantity: line.quantity,
                unit_price: to_minor_units(line.unit_price)?,
                tax_rate: to_minor_units(line.tax_rate)?,
                total_amount: to_minor_units(line.total_amount)?,
                total_discount_amount: to_minor_units(line.total_discount_amount)?,
                total_tax_amount: to_minor_units(line.total_tax_amount)?,
            })
        })
        .collect()
}
