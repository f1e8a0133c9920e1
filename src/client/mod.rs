// ============================================================================
// Store API Clients
// ============================================================================
//
// - routes/    - Resource path resolution and per-resource route table
// - transport/ - Abstract authenticated GET plus the reqwest implementation
// - order/     - Order fetch and the order sub-resource fetchers
// - customer/  - Customer lookup
//
// ============================================================================

mod customer;
mod order;
mod routes;
mod transport;

pub use customer::CustomerClient;
pub use order::OrderClient;
pub use routes::{ResourceKind, Routes};
pub use transport::{HttpTransport, Query, ReqwestTransport};

use serde_json::Value;
use std::sync::Arc;

use crate::errors::FetchError;
use crate::metrics::Metrics;

/// Shared request plumbing for one store: transport, routes and metrics.
/// Immutable after construction and cheap to clone.
#[derive(Clone)]
pub struct StoreClient {
    transport: Arc<dyn HttpTransport>,
    routes: Arc<Routes>,
    metrics: Option<Arc<Metrics>>,
}

impl StoreClient {
    pub fn new(transport: Arc<dyn HttpTransport>, routes: Routes) -> Self {
        Self {
            transport,
            routes: Arc::new(routes),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub(crate) fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_deref()
    }

    pub(crate) async fn get(
        &self,
        kind: ResourceKind,
        params: &[(&str, &str)],
        sub_path: Option<&str>,
        query: &[(String, String)],
    ) -> Result<Value, FetchError> {
        let path = self.routes.path(kind, params, sub_path);

        if let Some(metrics) = &self.metrics {
            let resource = sub_path.unwrap_or(match kind {
                ResourceKind::Order => "order",
                ResourceKind::Customer => "customer",
            });
            metrics.remote_requests_total.with_label_values(&[resource]).inc();
        }

        self.transport.get(&path, query).await
    }
}

/// Collection body; an empty (`null`) body is an empty collection
pub(crate) fn collection<T: serde::de::DeserializeOwned>(body: Value) -> Result<Vec<T>, FetchError> {
    match body {
        Value::Null => Ok(Vec::new()),
        other => Ok(serde_json::from_value(other)?),
    }
}

/// Unwrap the `{ "data": ... }` envelope used by v3 endpoints
pub(crate) fn data_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    enum Reply {
        Body(Value),
        Status(u16, Value),
    }

    /// In-memory transport: replays scripted replies per path, in order,
    /// and records every request it receives.
    #[derive(Default)]
    pub struct FakeTransport {
        replies: Mutex<HashMap<String, VecDeque<Reply>>>,
        requests: Mutex<Vec<(String, Query)>>,
    }

    impl FakeTransport {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn respond(&self, path: &str, body: Value) {
            self.push(path, Reply::Body(body));
        }

        pub fn fail(&self, path: &str, status: u16, body: Value) {
            self.push(path, Reply::Status(status, body));
        }

        fn push(&self, path: &str, reply: Reply) {
            self.replies
                .lock()
                .unwrap()
                .entry(path.to_string())
                .or_default()
                .push_back(reply);
        }

        pub fn requests(&self) -> Vec<(String, Query)> {
            self.requests.lock().unwrap().clone()
        }

        pub fn paths(&self) -> Vec<String> {
            self.requests().into_iter().map(|(path, _)| path).collect()
        }

        pub fn count(&self, path: &str) -> usize {
            self.paths().iter().filter(|p| p.as_str() == path).count()
        }
    }

    #[async_trait]
    impl HttpTransport for FakeTransport {
        async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, FetchError> {
            self.requests
                .lock()
                .unwrap()
                .push((path.to_string(), query.to_vec()));

            let reply = self
                .replies
                .lock()
                .unwrap()
                .get_mut(path)
                .and_then(VecDeque::pop_front);

            match reply {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Status(status, body)) => Err(FetchError::Status { status, body }),
                None => Err(FetchError::Status {
                    status: 404,
                    body: serde_json::json!({ "title": format!("no scripted reply for {path}") }),
                }),
            }
        }
    }

    pub const STORE: &str = "abc123";

    pub fn store_client(transport: Arc<FakeTransport>) -> StoreClient {
        StoreClient::new(transport, Routes::new(STORE))
    }

    pub fn order_path(order_id: &str, sub: Option<&str>) -> String {
        let version = if sub == Some("transactions") { "v3" } else { "v2" };
        match sub {
            Some(sub) => format!("/stores/{STORE}/{version}/orders/{order_id}/{sub}"),
            None => format!("/stores/{STORE}/{version}/orders/{order_id}"),
        }
    }

    pub fn customers_path() -> String {
        format!("/stores/{STORE}/v3/customers")
    }
}
