use serde_json::Value;

use crate::errors::{ApiError, FetchError, Scope};
use crate::models::{Address, Order, OrderId};

use super::routes::{API_VERSION, ORDER_ID};
use super::{collection, data_envelope, ResourceKind, StoreClient};

/// Line items requested per page. The remote API signals the last page only
/// by returning fewer items than this.
pub const LINE_ITEM_PAGE_SIZE: u32 = 50;

// ============================================================================
// Order Client - order record plus its sub-resource collections
// ============================================================================

pub struct OrderClient {
    store: StoreClient,
    page_size: u32,
    max_pages: u32,
}

impl OrderClient {
    pub fn new(store: StoreClient, max_pages: u32) -> Self {
        Self {
            store,
            page_size: LINE_ITEM_PAGE_SIZE,
            max_pages: max_pages.max(1),
        }
    }

    async fn fetch(
        &self,
        order_id: &OrderId,
        api_version: Option<&str>,
        sub_path: Option<&str>,
        query: &[(String, String)],
    ) -> Result<Value, FetchError> {
        let mut params = vec![(ORDER_ID, order_id.as_str())];
        if let Some(version) = api_version {
            params.push((API_VERSION, version));
        }
        self.store.get(ResourceKind::Order, &params, sub_path, query).await
    }

    pub async fn get(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        let body = self
            .fetch(order_id, None, None, &[])
            .await
            .map_err(|e| ApiError::order(Scope::Order, order_id, e))?;

        serde_json::from_value(body).map_err(|e| ApiError::order(Scope::Order, order_id, e.into()))
    }

    /// Every line item on the order, walking pages until a short page
    pub async fn get_products(&self, order_id: &OrderId) -> Result<Vec<Value>, ApiError> {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            if page > self.max_pages {
                tracing::error!(
                    order_id = %order_id,
                    max_pages = self.max_pages,
                    "Line item pagination did not terminate"
                );
                return Err(ApiError::order(
                    Scope::OrderProducts,
                    order_id,
                    FetchError::PageLimitExceeded { max_pages: self.max_pages },
                )
                .with_context("page", page)
                .with_context("limit", self.page_size)
                .with_context("max_pages", self.max_pages));
            }

            let batch = self.get_products_page(order_id, page).await?;
            let full = batch.len() == self.page_size as usize;
            items.extend(batch);

            if !full {
                break;
            }
            page += 1;
        }

        tracing::debug!(order_id = %order_id, pages = page, items = items.len(), "Fetched line items");
        Ok(items)
    }

    async fn get_products_page(&self, order_id: &OrderId, page: u32) -> Result<Vec<Value>, ApiError> {
        let query = vec![
            ("limit".to_string(), self.page_size.to_string()),
            ("page".to_string(), page.to_string()),
        ];

        tracing::debug!(order_id = %order_id, page = page, limit = self.page_size, "Requesting line item page");

        if let Some(metrics) = self.store.metrics() {
            metrics.line_item_pages_total.inc();
        }

        self.fetch(order_id, None, Some("products"), &query)
            .await
            .and_then(collection)
            .map_err(|e| {
                ApiError::order(Scope::OrderProducts, order_id, e)
                    .with_context("page", page)
                    .with_context("limit", self.page_size)
            })
    }

    /// Shipping addresses with their region normalized
    pub async fn get_shipping_addresses(&self, order_id: &OrderId) -> Result<Vec<Address>, ApiError> {
        let mut addresses: Vec<Address> = self
            .get_collection(order_id, Scope::OrderShippingAddress, None, "shipping_addresses")
            .await?;

        for address in &mut addresses {
            address.normalize_region();
        }
        Ok(addresses)
    }

    pub async fn get_shipments(&self, order_id: &OrderId) -> Result<Vec<Value>, ApiError> {
        self.get_collection(order_id, Scope::OrderShipments, None, "shipments").await
    }

    pub async fn get_coupons(&self, order_id: &OrderId) -> Result<Vec<Value>, ApiError> {
        self.get_collection(order_id, Scope::OrderCoupons, None, "coupons").await
    }

    /// Transactions live on the v3 API, wrapped in a `data` envelope
    pub async fn get_transactions(&self, order_id: &OrderId) -> Result<Vec<Value>, ApiError> {
        self.get_collection(order_id, Scope::OrderTransactions, Some("v3"), "transactions")
            .await
    }

    async fn get_collection<T: serde::de::DeserializeOwned>(
        &self,
        order_id: &OrderId,
        scope: Scope,
        api_version: Option<&str>,
        sub_path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let body = self
            .fetch(order_id, api_version, Some(sub_path), &[])
            .await
            .map_err(|e| ApiError::order(scope, order_id, e))?;

        let body = if api_version == Some("v3") { data_envelope(body) } else { body };

        collection(body).map_err(|e| ApiError::order(scope, order_id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{order_path, store_client, FakeTransport};
    use serde_json::json;

    fn items(range: std::ops::Range<u32>) -> Value {
        Value::Array(range.map(|i| json!({ "id": i })).collect())
    }

    fn order_id() -> OrderId {
        OrderId::new("100").unwrap()
    }

    #[tokio::test]
    async fn test_products_walks_pages_in_order() {
        let transport = FakeTransport::new();
        let path = order_path("100", Some("products"));
        transport.respond(&path, items(0..50));
        transport.respond(&path, items(50..62));

        let client = OrderClient::new(store_client(transport.clone()), 100);
        let products = client.get_products(&order_id()).await.unwrap();

        assert_eq!(products.len(), 62);
        assert_eq!(products[0]["id"], json!(0));
        assert_eq!(products[61]["id"], json!(61));
        assert_eq!(transport.count(&path), 2);

        let queries: Vec<_> = transport.requests().into_iter().map(|(_, q)| q).collect();
        assert_eq!(
            queries[1],
            vec![("limit".to_string(), "50".to_string()), ("page".to_string(), "2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_full_trailing_page_needs_empty_page() {
        let transport = FakeTransport::new();
        let path = order_path("100", Some("products"));
        transport.respond(&path, items(0..50));
        transport.respond(&path, Value::Null);

        let client = OrderClient::new(store_client(transport.clone()), 100);
        let products = client.get_products(&order_id()).await.unwrap();

        assert_eq!(products.len(), 50);
        assert_eq!(transport.count(&path), 2);
    }

    #[tokio::test]
    async fn test_products_failure_reports_page() {
        let transport = FakeTransport::new();
        let path = order_path("100", Some("products"));
        transport.respond(&path, items(0..50));
        transport.fail(&path, 502, json!("Bad Gateway"));

        let client = OrderClient::new(store_client(transport), 100);
        let err = client.get_products(&order_id()).await.unwrap_err();

        assert_eq!(err.scope, Scope::OrderProducts);
        assert_eq!(err.status, 502);
        assert_eq!(err.data["page"], json!(2));
        assert_eq!(err.data["limit"], json!(50));
    }

    #[tokio::test]
    async fn test_products_page_ceiling() {
        let transport = FakeTransport::new();
        let path = order_path("100", Some("products"));
        for _ in 0..3 {
            transport.respond(&path, items(0..50));
        }

        let client = OrderClient::new(store_client(transport.clone()), 2);
        let err = client.get_products(&order_id()).await.unwrap_err();

        assert_eq!(transport.count(&path), 2);
        assert_eq!(err.scope, Scope::OrderProducts);
        assert_eq!(err.status, 500);
        assert!(matches!(err.source, Some(FetchError::PageLimitExceeded { max_pages: 2 })));
    }

    #[tokio::test]
    async fn test_shipping_addresses_are_normalized() {
        let transport = FakeTransport::new();
        transport.respond(
            &order_path("100", Some("shipping_addresses")),
            json!([
                { "id": 1, "country": "United States", "state": "California" },
                { "id": 2, "country": "Freedonia", "state": "Anywhere" }
            ]),
        );

        let client = OrderClient::new(store_client(transport), 100);
        let addresses = client.get_shipping_addresses(&order_id()).await.unwrap();

        assert_eq!(addresses[0].state_code(), Some("CA"));
        assert_eq!(addresses[1].state_code(), Some("Anywhere"));
    }

    #[tokio::test]
    async fn test_shipping_addresses_keep_null_fields() {
        let transport = FakeTransport::new();
        transport.respond(
            &order_path("100", Some("shipping_addresses")),
            json!([{ "id": 1, "country": "United States", "state": null, "zip": "1" }]),
        );

        let client = OrderClient::new(store_client(transport), 100);
        let addresses = client.get_shipping_addresses(&order_id()).await.unwrap();

        assert_eq!(
            serde_json::to_value(&addresses).unwrap(),
            json!([{ "id": 1, "country": "United States", "state": null, "zip": "1" }])
        );
    }

    #[tokio::test]
    async fn test_transactions_use_v3_envelope() {
        let transport = FakeTransport::new();
        transport.respond(
            &order_path("100", Some("transactions")),
            json!({ "data": [{ "id": 9, "event": "purchase" }], "meta": {} }),
        );

        let client = OrderClient::new(store_client(transport), 100);
        let transactions = client.get_transactions(&order_id()).await.unwrap();

        assert_eq!(transactions, vec![json!({ "id": 9, "event": "purchase" })]);
    }

    #[tokio::test]
    async fn test_no_content_is_empty_collection() {
        let transport = FakeTransport::new();
        transport.respond(&order_path("100", Some("coupons")), Value::Null);

        let client = OrderClient::new(store_client(transport), 100);
        assert!(client.get_coupons(&order_id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shipments_failure_is_scoped() {
        let transport = FakeTransport::new();
        transport.fail(&order_path("100", Some("shipments")), 401, json!([{ "status": 401 }]));

        let client = OrderClient::new(store_client(transport), 100);
        let err = client.get_shipments(&order_id()).await.unwrap_err();

        assert_eq!(err.scope, Scope::OrderShipments);
        assert_eq!(err.identifier, "100");
        assert_eq!(err.data["errors"], json!([{ "status": 401 }]));
    }

    #[tokio::test]
    async fn test_get_order_decodes_record() {
        let transport = FakeTransport::new();
        transport.respond(&order_path("100", None), json!({ "id": 100, "customer_id": 7, "status": "Shipped" }));

        let client = OrderClient::new(store_client(transport), 100);
        let order = client.get(&order_id()).await.unwrap();

        assert_eq!(order.id, 100);
        assert_eq!(order.customer_id, 7);
        assert_eq!(order.fields["status"], json!("Shipped"));
    }
}
