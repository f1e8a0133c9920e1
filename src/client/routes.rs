use std::collections::HashMap;

// ============================================================================
// Resource Path Resolver
// ============================================================================
//
// Route templates hold `:name` placeholders. Supplied placeholders are
// substituted, unsupplied ones are dropped together with their segment:
//
//   ":api_version/orders/:order_id" + {order_id: 5} + "products"
//     -> "v2/orders/5/products"
//
// ============================================================================

pub const API_VERSION: &str = "api_version";
pub const ORDER_ID: &str = "order_id";
pub const DEFAULT_API_VERSION: &str = "v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Order,
    Customer,
}

impl ResourceKind {
    pub fn default_template(&self) -> &'static str {
        match self {
            ResourceKind::Order => ":api_version/orders/:order_id",
            ResourceKind::Customer => "v3/customers",
        }
    }
}

/// Substitute placeholders in `template`, append `sub_path`, and remove
/// every placeholder that was not supplied (or supplied empty).
pub fn resolve_path(template: &str, params: &[(&str, &str)], sub_path: Option<&str>) -> String {
    let mut raw = template.trim_end_matches('/').to_string();
    if let Some(sub) = sub_path.map(|s| s.trim_matches('/')).filter(|s| !s.is_empty()) {
        raw.push('/');
        raw.push_str(sub);
    }

    let lookup = |name: &str| -> Option<String> {
        let supplied = params
            .iter()
            .find(|(key, value)| *key == name && !value.is_empty())
            .map(|(_, value)| value.to_string());

        match supplied {
            Some(value) => Some(value),
            None if name == API_VERSION => Some(DEFAULT_API_VERSION.to_string()),
            None => None,
        }
    };

    raw.split('/')
        .filter_map(|segment| match segment.strip_prefix(':') {
            Some(name) => lookup(name),
            None => Some(segment.to_string()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Route table for one store, fixed at construction
#[derive(Debug, Clone)]
pub struct Routes {
    store_hash: String,
    templates: HashMap<ResourceKind, String>,
}

impl Routes {
    pub fn new(store_hash: impl Into<String>) -> Self {
        let templates = [ResourceKind::Order, ResourceKind::Customer]
            .into_iter()
            .map(|kind| (kind, kind.default_template().to_string()))
            .collect();

        Self {
            store_hash: store_hash.into(),
            templates,
        }
    }

    #[cfg(test)]
    pub fn with_template(mut self, kind: ResourceKind, template: impl Into<String>) -> Self {
        self.templates.insert(kind, template.into());
        self
    }

    /// Absolute request path: `/stores/{store_hash}/{resolved template}`
    pub fn path(&self, kind: ResourceKind, params: &[(&str, &str)], sub_path: Option<&str>) -> String {
        let template = self
            .templates
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_template());

        let full = format!("/stores/{}/{}", self.store_hash, template.trim_start_matches('/'));
        resolve_path(&full, params, sub_path)
    }
}
