use std::str::FromStr;

/// Shape of the emitted payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Payload stands alone
    #[default]
    Clean,
    /// Payload is layered over the inbound message's own fields
    Merge,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clean" => Ok(OutputMode::Clean),
            "merge" => Ok(OutputMode::Merge),
            other => Err(format!("'{}' is not an output mode (expected clean or merge)", other)),
        }
    }
}

/// Options the invocation adapter is configured with
#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
    pub store_hash: String,
    pub client_id: String,
    pub access_token: String,
    /// Used when an inbound message carries no `id`
    pub order_id: String,
    pub mode: OutputMode,
}

impl AgentOptions {
    /// One message per missing required field; empty when valid
    pub fn validate(&self) -> Vec<String> {
        [
            ("store_hash", &self.store_hash),
            ("client_id", &self.client_id),
            ("access_token", &self.access_token),
            ("order_id", &self.order_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| format!("{} is a required field", field))
        .collect()
    }
}
