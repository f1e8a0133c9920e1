use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::aggregator::OrderAggregator;
use crate::errors::{ApiError, Scope};
use crate::metrics::Metrics;
use crate::models::{ComposedOrder, OrderId};

use super::options::{AgentOptions, OutputMode};

const SUCCESS_STATUS: u16 = 200;

/// Result of handling one inbound message
#[derive(Debug, Clone)]
pub struct EventOutcome {
    pub payload: Value,
    /// Scope and message of the failure, when the payload is an error
    pub failure: Option<(Scope, String)>,
}

#[cfg(test)]
impl EventOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

// ============================================================================
// Order Agent - one inbound message in, exactly one payload out
// ============================================================================

pub struct OrderAgent {
    aggregator: OrderAggregator,
    options: AgentOptions,
    metrics: Option<Arc<Metrics>>,
}

impl OrderAgent {
    pub fn new(aggregator: OrderAggregator, options: AgentOptions) -> Self {
        Self {
            aggregator,
            options,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run against the configured order id
    pub async fn check(&self) -> EventOutcome {
        self.handle(Value::Object(Map::new())).await
    }

    pub async fn handle(&self, message: Value) -> EventOutcome {
        let result = match self.resolve_order_id(&message) {
            Ok(order_id) => self.aggregate(&order_id).await,
            Err(e) => {
                tracing::warn!(identifier = %e.identifier, "Rejecting event without a usable order id");
                Err(e)
            }
        };

        self.render(&message, result)
    }

    async fn aggregate(&self, order_id: &OrderId) -> Result<Value, ApiError> {
        let span = tracing::info_span!(
            "aggregate_order",
            order_id = %order_id,
            attempt_id = %Uuid::new_v4()
        );
        let started = Instant::now();

        let result = self
            .aggregator
            .aggregate(order_id)
            .instrument(span)
            .await
            .and_then(|order| order_body(order_id, &order));

        if let Some(metrics) = &self.metrics {
            let failed_scope = result.as_ref().err().map(|e| e.scope);
            metrics.record_aggregation(started.elapsed().as_secs_f64(), failed_scope);
        }

        result
    }

    /// The message's `id` wins over the configured order id. A blank id is
    /// an error on its own; nothing is fetched for it.
    fn resolve_order_id(&self, message: &Value) -> Result<OrderId, ApiError> {
        let raw = match message.get("id") {
            Some(id) => id.clone(),
            None => Value::String(self.options.order_id.clone()),
        };

        OrderId::from_value(&raw).ok_or_else(|| {
            let shown = match &raw {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            ApiError::invalid_identifier(&shown)
        })
    }

    fn render(&self, message: &Value, result: Result<Value, ApiError>) -> EventOutcome {
        let (body, failure) = match result {
            Ok(order) => {
                let mut body = Map::new();
                body.insert("order".to_string(), order);
                body.insert("status".to_string(), Value::from(SUCCESS_STATUS));
                (Value::Object(body), None)
            }
            Err(e) => {
                tracing::error!(
                    scope = %e.scope,
                    status = e.status,
                    identifier = %e.identifier,
                    error = %e,
                    "❌ Order aggregation failed"
                );
                (e.to_payload(), Some((e.scope, e.to_string())))
            }
        };

        let payload = match self.options.mode {
            OutputMode::Clean => body,
            OutputMode::Merge => merge(message, body),
        };

        EventOutcome { payload, failure }
    }
}

fn order_body(order_id: &OrderId, order: &ComposedOrder) -> Result<Value, ApiError> {
    serde_json::to_value(order).map_err(|e| {
        ApiError::unexpected(order_id.as_str(), format!("Failed to render order {}: {}", order_id, e))
    })
}

/// Inbound fields first, result keys layered on top
fn merge(message: &Value, body: Value) -> Value {
    match (message, body) {
        (Value::Object(inbound), Value::Object(result)) => {
            let mut merged = inbound.clone();
            merged.extend(result);
            Value::Object(merged)
        }
        (_, body) => body,
    }
}
