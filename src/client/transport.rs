use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::config::{ClientConfig, ConfigError};
use crate::errors::FetchError;

// ============================================================================
// HTTP Access Layer
// ============================================================================

pub type Query = Vec<(String, String)>;

/// Authenticated GET against the store API returning the decoded JSON body.
///
/// An empty body (the API answers `204 No Content` for empty collections)
/// decodes to `Value::Null`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, FetchError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-auth-client"),
            header_value("client_id", &config.client_id)?,
        );
        headers.insert(
            HeaderName::from_static("x-auth-token"),
            header_value("access_token", &config.access_token)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

fn header_value(field: &'static str, raw: &str) -> Result<HeaderValue, ConfigError> {
    let mut value = HeaderValue::from_str(raw).map_err(|e| ConfigError::Invalid {
        field,
        reason: e.to_string(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.endpoint, path);

        tracing::debug!(path = %path, query = ?query, "GET");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            tracing::warn!(
                path = %path,
                status = status.as_u16(),
                "Remote API returned an error status"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: decode_error_body(&bytes),
            });
        }

        decode_body(&bytes)
    }
}

pub(crate) fn decode_body(bytes: &[u8]) -> Result<Value, FetchError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Error bodies are kept even when they are not JSON
fn decode_error_body(bytes: &[u8]) -> Value {
    decode_body(bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(decode_body(b"").unwrap(), Value::Null);
        assert_eq!(decode_body(b"  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_json_body_decoded() {
        assert_eq!(decode_body(br#"[{"id":1}]"#).unwrap(), json!([{ "id": 1 }]));
        assert!(matches!(decode_body(b"<html>"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_error_body_falls_back_to_text() {
        assert_eq!(decode_error_body(b"Bad Gateway"), json!("Bad Gateway"));
        assert_eq!(
            decode_error_body(br#"[{"status":404}]"#),
            json!([{ "status": 404 }])
        );
    }

    #[test]
    fn test_transport_rejects_unprintable_credentials() {
        let config = ClientConfig {
            endpoint: "https://api.example.test/".to_string(),
            store_hash: "abc".to_string(),
            client_id: "client\nid".to_string(),
            access_token: "token".to_string(),
            timeout: Duration::from_secs(5),
            max_line_item_pages: 10,
        };

        assert!(matches!(
            ReqwestTransport::new(&config),
            Err(ConfigError::Invalid { field: "client_id", .. })
        ));
    }
}
