use crate::client::{CustomerClient, OrderClient, StoreClient};
use crate::errors::{ApiError, Scope};
use crate::models::{ComposedOrder, OrderId};

// ============================================================================
// Order Aggregator
// ============================================================================
//
// Orchestrates: Order → line items → shipping addresses → coupons →
//               transactions → shipments → customer → ComposedOrder
//
// Sequential and fail-fast: the first failing fetch ends the attempt and its
// ApiError is returned unchanged. No partial order is ever produced.
//
// ============================================================================

/// Progress of one aggregation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationState {
    Start,
    OrderFetched,
    SubResourcesFetching,
    Assembled,
    Failed(Scope),
}

impl AggregationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AggregationState::Assembled | AggregationState::Failed(_))
    }
}

struct Attempt<'a> {
    order_id: &'a OrderId,
    state: AggregationState,
}

impl<'a> Attempt<'a> {
    fn new(order_id: &'a OrderId) -> Self {
        Self {
            order_id,
            state: AggregationState::Start,
        }
    }

    fn advance(&mut self, next: AggregationState) {
        debug_assert!(!self.state.is_terminal(), "no transition out of a terminal state");
        tracing::debug!(
            order_id = %self.order_id,
            from = ?self.state,
            to = ?next,
            "Aggregation state transition"
        );
        self.state = next;
    }

    /// Record the outcome of a fetch, moving to `Failed` on error
    fn check<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result {
            self.advance(AggregationState::Failed(e.scope));
        }
        result
    }
}

pub struct OrderAggregator {
    orders: OrderClient,
    customers: CustomerClient,
}

impl OrderAggregator {
    pub fn new(store: StoreClient, max_line_item_pages: u32) -> Self {
        Self {
            orders: OrderClient::new(store.clone(), max_line_item_pages),
            customers: CustomerClient::new(store),
        }
    }

    /// Fetch the order and every related sub-resource into one record
    pub async fn aggregate(&self, order_id: &OrderId) -> Result<ComposedOrder, ApiError> {
        let mut attempt = Attempt::new(order_id);

        let order = attempt.check(self.orders.get(order_id).await)?;
        attempt.advance(AggregationState::OrderFetched);

        tracing::info!(
            order_id = %order_id,
            customer_id = order.customer_id,
            "Order fetched, resolving sub-resources"
        );

        attempt.advance(AggregationState::SubResourcesFetching);
        let products = attempt.check(self.orders.get_products(order_id).await)?;
        let shipping_addresses = attempt.check(self.orders.get_shipping_addresses(order_id).await)?;
        let coupons = attempt.check(self.orders.get_coupons(order_id).await)?;
        let transactions = attempt.check(self.orders.get_transactions(order_id).await)?;
        let shipments = attempt.check(self.orders.get_shipments(order_id).await)?;
        let customer = attempt.check(self.customers.get(order.customer_id).await)?;

        let composed = ComposedOrder::assemble(
            order,
            products,
            coupons,
            shipping_addresses,
            transactions,
            shipments,
            customer,
        );
        attempt.advance(AggregationState::Assembled);

        tracing::info!(
            order_id = %order_id,
            products = composed.products.len(),
            shipments = composed.shipments.len(),
            "✅ Order assembled"
        );

        Ok(composed)
    }
}
