use std::time::Duration;

use crate::agent::{AgentOptions, OutputMode};

// ============================================================================
// Configuration
// ============================================================================
//
// Everything is read from the environment once at startup and is immutable
// afterwards. Required fields are reported together.
//
// ============================================================================

pub const DEFAULT_ENDPOINT: &str = "https://api.bigcommerce.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_LINE_ITEM_PAGES: u32 = 1000;
const DEFAULT_METRICS_PORT: u16 = 9090;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the remote store API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub store_hash: String,
    pub client_id: String,
    pub access_token: String,
    pub timeout: Duration,
    pub max_line_item_pages: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub agent: AgentOptions,
    /// `None` disables the metrics server
    pub metrics_port: Option<u16>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mode = match read("BIGCOMMERCE_OUTPUT_MODE") {
            Some(raw) => raw.parse::<OutputMode>().map_err(|reason| ConfigError::Invalid {
                field: "BIGCOMMERCE_OUTPUT_MODE",
                reason,
            })?,
            None => OutputMode::default(),
        };

        let agent = AgentOptions {
            store_hash: read("BIGCOMMERCE_STORE_HASH").unwrap_or_default(),
            client_id: read("BIGCOMMERCE_CLIENT_ID").unwrap_or_default(),
            access_token: read("BIGCOMMERCE_ACCESS_TOKEN").unwrap_or_default(),
            order_id: read("BIGCOMMERCE_ORDER_ID").unwrap_or_default(),
            mode,
        };

        let missing = agent.validate();
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields(missing));
        }

        let timeout_secs = parse_or(read("BIGCOMMERCE_TIMEOUT_SECS"), "BIGCOMMERCE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let max_line_item_pages = parse_or(
            read("BIGCOMMERCE_MAX_LINE_ITEM_PAGES"),
            "BIGCOMMERCE_MAX_LINE_ITEM_PAGES",
            DEFAULT_MAX_LINE_ITEM_PAGES,
        )?;
        if max_line_item_pages == 0 {
            return Err(ConfigError::Invalid {
                field: "BIGCOMMERCE_MAX_LINE_ITEM_PAGES",
                reason: "must be at least 1".to_string(),
            });
        }
        let metrics_port = parse_or(read("METRICS_PORT"), "METRICS_PORT", DEFAULT_METRICS_PORT)?;

        let client = ClientConfig {
            endpoint: read("BIGCOMMERCE_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            store_hash: agent.store_hash.clone(),
            client_id: agent.client_id.clone(),
            access_token: agent.access_token.clone(),
            timeout: Duration::from_secs(timeout_secs),
            max_line_item_pages,
        };

        Ok(Self {
            client,
            agent,
            metrics_port: (metrics_port != 0).then_some(metrics_port),
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, field: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            field,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("BIGCOMMERCE_STORE_HASH", "abc123"),
        ("BIGCOMMERCE_CLIENT_ID", "client"),
        ("BIGCOMMERCE_ACCESS_TOKEN", "token"),
        ("BIGCOMMERCE_ORDER_ID", "100"),
    ];

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.client.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.client.timeout, Duration::from_secs(30));
        assert_eq!(config.client.max_line_item_pages, 1000);
        assert_eq!(config.agent.mode, OutputMode::Clean);
        assert_eq!(config.metrics_port, Some(9090));
    }

    #[test]
    fn test_all_missing_fields_reported() {
        let err = AppConfig::from_lookup(lookup(&[("BIGCOMMERCE_CLIENT_ID", "client")])).unwrap_err();

        match err {
            ConfigError::MissingFields(fields) => {
                assert_eq!(fields.len(), 3);
                assert!(fields.iter().any(|f| f.contains("store_hash")));
                assert!(fields.iter().any(|f| f.contains("access_token")));
                assert!(fields.iter().any(|f| f.contains("order_id")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_merge_mode_and_disabled_metrics() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("BIGCOMMERCE_OUTPUT_MODE", "merge"));
        pairs.push(("METRICS_PORT", "0"));

        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.agent.mode, OutputMode::Merge);
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("BIGCOMMERCE_OUTPUT_MODE", "verbose"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { field: "BIGCOMMERCE_OUTPUT_MODE", .. })
        ));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("BIGCOMMERCE_MAX_LINE_ITEM_PAGES", "0"));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::Invalid { field: "BIGCOMMERCE_MAX_LINE_ITEM_PAGES", .. })
        ));
    }
}
