use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::region;

// ============================================================================
// Domain Models
// ============================================================================
//
// Remote records are kept loosely typed: the fields the aggregation depends
// on are named, everything else rides along in a flattened map so the
// composed output carries the order exactly as the store returned it.
//
// ============================================================================

/// Order identifier as received on an inbound message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Returns `None` for blank identifiers
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Accepts numeric or string ids
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::new(s.as_str()),
            Value::Number(n) => Self::new(n.to_string()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Billing or shipping address. Kept as the raw remote map so keys the
/// store sent as `null` survive the round trip.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct Address {
    fields: Map<String, Value>,
}

impl Address {
    pub fn country(&self) -> Option<&str> {
        self.fields.get("country").and_then(Value::as_str)
    }

    pub fn state(&self) -> Option<&str> {
        self.fields.get("state").and_then(Value::as_str)
    }

    #[cfg(test)]
    pub fn state_code(&self) -> Option<&str> {
        self.fields.get("state_code").and_then(Value::as_str)
    }

    /// Derive `state_code` from the country and free-text state.
    /// Falls back to the original state text; never fails.
    pub fn normalize_region(&mut self) {
        if let Some(state) = self.state() {
            let code = region::state_code(self.country().unwrap_or_default(), state);
            self.fields.insert("state_code".to_string(), Value::String(code));
        }
    }
}

impl From<Map<String, Value>> for Address {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<Address> for Map<String, Value> {
    fn from(address: Address) -> Self {
        address.fields
    }
}

/// Order record as returned by the orders endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub customer_id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Order {
    /// Keys the composed record owns; the remote order carries resource
    /// links under some of them.
    pub const COMPOSED_KEYS: [&'static str; 6] = [
        "products",
        "coupons",
        "shipping_addresses",
        "transactions",
        "shipments",
        "customer",
    ];
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: u64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Customer {
    /// Stand-in for orders whose customer lookup matched nothing
    /// (guest checkouts use customer id 0)
    pub fn guest(id: u64) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }
}

/// Order with every sub-resource attached
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ComposedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub products: Vec<Value>,
    pub coupons: Vec<Value>,
    pub shipping_addresses: Vec<Address>,
    pub transactions: Vec<Value>,
    pub shipments: Vec<Value>,
    pub customer: Customer,
}

impl ComposedOrder {
    /// Builds the composed record, normalizing the billing address and
    /// dropping remote keys the composed fields replace.
    pub fn assemble(
        mut order: Order,
        products: Vec<Value>,
        coupons: Vec<Value>,
        shipping_addresses: Vec<Address>,
        transactions: Vec<Value>,
        shipments: Vec<Value>,
        customer: Customer,
    ) -> Self {
        for key in Order::COMPOSED_KEYS {
            order.fields.remove(key);
        }
        if let Some(Value::Object(billing)) = order.fields.get_mut("billing_address") {
            let mut address = Address::from(std::mem::take(billing));
            address.normalize_region();
            *billing = address.into();
        }

        Self {
            order,
            products,
            coupons,
            shipping_addresses,
            transactions,
            shipments,
            customer,
        }
    }
}
