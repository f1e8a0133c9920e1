use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::models::OrderId;

// ============================================================================
// Error Taxonomy
// ============================================================================
//
// FetchError: what went wrong at the transport level (one remote request).
// ApiError:   the single shape handed to the invocation adapter, tagged with
//             the scope of the failing operation and the subject identifier.
//
// ============================================================================

/// Failure of a single remote request
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Remote API returned status {status}")]
    Status { status: u16, body: Value },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Line item pagination exceeded {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },
}

impl FetchError {
    /// HTTP status carried by the failure, if the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Request(e) => e.status().map(|s| s.as_u16()),
            FetchError::Decode(_) | FetchError::PageLimitExceeded { .. } => None,
        }
    }

    /// Decoded error body returned by the remote API
    pub fn remote_body(&self) -> Option<&Value> {
        match self {
            FetchError::Status { body, .. } if !body.is_null() => Some(body),
            _ => None,
        }
    }
}

/// Names the operation that produced an `ApiError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Scope {
    #[serde(rename = "get order")]
    Order,
    #[serde(rename = "get order products")]
    OrderProducts,
    #[serde(rename = "get order shipping address")]
    OrderShippingAddress,
    #[serde(rename = "get order shipments")]
    OrderShipments,
    #[serde(rename = "get order coupons")]
    OrderCoupons,
    #[serde(rename = "get order transactions")]
    OrderTransactions,
    #[serde(rename = "get order customer")]
    OrderCustomer,
    #[serde(rename = "get order by id")]
    OrderById,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Order => "get order",
            Scope::OrderProducts => "get order products",
            Scope::OrderShippingAddress => "get order shipping address",
            Scope::OrderShipments => "get order shipments",
            Scope::OrderCoupons => "get order coupons",
            Scope::OrderTransactions => "get order transactions",
            Scope::OrderCustomer => "get order customer",
            Scope::OrderById => "get order by id",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const GENERIC_STATUS: u16 = 500;

/// Scoped failure of one aggregation attempt. Never retried.
#[derive(Debug, thiserror::Error)]
#[error("{scope}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub scope: Scope,
    pub message: String,
    pub identifier: String,
    pub data: Map<String, Value>,
    #[source]
    pub source: Option<FetchError>,
}

impl ApiError {
    /// Wrap a failed order-scoped fetch
    pub fn order(scope: Scope, order_id: &OrderId, source: FetchError) -> Self {
        Self::wrap(scope, "order_id", order_id.as_str(), source)
    }

    /// Wrap a failed customer lookup
    pub fn customer(customer_id: u64, source: FetchError) -> Self {
        Self::wrap(Scope::OrderCustomer, "customer_id", &customer_id.to_string(), source)
    }

    /// Blank or missing order identifier on the inbound message
    pub fn invalid_identifier(raw: &str) -> Self {
        Self {
            status: GENERIC_STATUS,
            scope: Scope::OrderById,
            message: format!("'{}' is not a valid order id", raw),
            identifier: raw.to_string(),
            data: Map::new(),
            source: None,
        }
    }

    /// Failure that did not come from a scoped fetch
    pub fn unexpected(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: GENERIC_STATUS,
            scope: Scope::OrderById,
            message: message.into(),
            identifier: identifier.into(),
            data: Map::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    fn wrap(scope: Scope, subject_key: &str, identifier: &str, source: FetchError) -> Self {
        let mut data = Map::new();
        data.insert(subject_key.to_string(), Value::String(identifier.to_string()));
        if let Some(body) = source.remote_body() {
            data.insert("errors".to_string(), body.clone());
        }

        Self {
            status: source.status().unwrap_or(GENERIC_STATUS),
            scope,
            message: format!("Failed to {} {}: {}", scope, identifier, source),
            identifier: identifier.to_string(),
            data,
            source: Some(source),
        }
    }

    /// Outbound error payload rendered by the invocation adapter
    pub fn to_payload(&self) -> Value {
        let payload = ErrorPayload {
            status: self.status,
            message: &self.message,
            scope: self.scope,
            identifier: &self.identifier,
            data: &self.data,
        };

        serde_json::to_value(payload).unwrap_or_else(|_| {
            serde_json::json!({ "status": self.status, "scope": self.scope.as_str() })
        })
    }
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    status: u16,
    message: &'a str,
    scope: Scope,
    identifier: &'a str,
    data: &'a Map<String, Value>,
}
