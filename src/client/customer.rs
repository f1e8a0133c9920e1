use crate::errors::ApiError;
use crate::models::Customer;

use super::{collection, data_envelope, ResourceKind, StoreClient};

const INCLUDE: &str = "attributes,formfields";

pub struct CustomerClient {
    store: StoreClient,
}

impl CustomerClient {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// The customers endpoint answers with a list even for an id filter.
    /// The id is unique, so only the first match is used; no match yields
    /// a customer carrying just the id.
    pub async fn get(&self, customer_id: u64) -> Result<Customer, ApiError> {
        let query = vec![
            ("id:in".to_string(), customer_id.to_string()),
            ("include".to_string(), INCLUDE.to_string()),
        ];

        let body = self
            .store
            .get(ResourceKind::Customer, &[], None, &query)
            .await
            .map_err(|e| ApiError::customer(customer_id, e))?;

        let matches: Vec<Customer> =
            collection(data_envelope(body)).map_err(|e| ApiError::customer(customer_id, e))?;

        match matches.into_iter().next() {
            Some(customer) => Ok(customer),
            None => {
                tracing::debug!(customer_id = customer_id, "Customer lookup matched nothing");
                Ok(Customer::guest(customer_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{customers_path, store_client, FakeTransport};
    use crate::errors::Scope;
    use serde_json::json;

    #[tokio::test]
    async fn test_first_match_wins() {
        let transport = FakeTransport::new();
        transport.respond(
            &customers_path(),
            json!({ "data": [
                { "id": 7, "email": "first@example.test" },
                { "id": 8, "email": "second@example.test" }
            ] }),
        );

        let client = CustomerClient::new(store_client(transport.clone()));
        let customer = client.get(7).await.unwrap();

        assert_eq!(customer.id, 7);
        assert_eq!(customer.fields["email"], json!("first@example.test"));

        let (_, query) = &transport.requests()[0];
        assert!(query.contains(&("id:in".to_string(), "7".to_string())));
        assert!(query.contains(&("include".to_string(), "attributes,formfields".to_string())));
    }

    #[tokio::test]
    async fn test_no_match_yields_guest() {
        let transport = FakeTransport::new();
        transport.respond(&customers_path(), json!({ "data": [] }));

        let client = CustomerClient::new(store_client(transport));
        assert_eq!(client.get(0).await.unwrap(), Customer::guest(0));
    }

    #[tokio::test]
    async fn test_failure_is_scoped_to_customer() {
        let transport = FakeTransport::new();
        transport.fail(&customers_path(), 403, json!({ "title": "Forbidden" }));

        let client = CustomerClient::new(store_client(transport));
        let err = client.get(7).await.unwrap_err();

        assert_eq!(err.scope, Scope::OrderCustomer);
        assert_eq!(err.status, 403);
        assert_eq!(err.identifier, "7");
    }
}
