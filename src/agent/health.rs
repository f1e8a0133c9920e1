use chrono::{DateTime, Utc};

// ============================================================================
// Agent Health
// ============================================================================
//
// The agent is working when its most recent event completed without error.
// A run of failures escalates it from degraded to unhealthy.
//
// ============================================================================

/// Consecutive error payloads before the agent reports unhealthy
pub const UNHEALTHY_AFTER: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded(_) => "degraded",
            HealthStatus::Unhealthy(_) => "unhealthy",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Tracks the outcome of the events an agent has handled
#[derive(Debug, Clone)]
pub struct AgentHealth {
    name: String,
    consecutive_failures: u32,
    current: ComponentHealth,
}

impl AgentHealth {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let current = ComponentHealth::new(name.clone(), HealthStatus::Healthy)
            .with_details("no events received yet");

        Self {
            name,
            consecutive_failures: 0,
            current,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.current = ComponentHealth::new(self.name.clone(), HealthStatus::Healthy);
    }

    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.consecutive_failures += 1;
        let reason = reason.into();

        let status = if self.consecutive_failures >= UNHEALTHY_AFTER {
            HealthStatus::Unhealthy(reason)
        } else {
            HealthStatus::Degraded(reason)
        };

        self.current = ComponentHealth::new(self.name.clone(), status)
            .with_details(format!("{} consecutive failed events", self.consecutive_failures));
    }

    pub fn snapshot(&self) -> ComponentHealth {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_healthy_without_events() {
        let health = AgentHealth::new("agent").snapshot();
        assert!(health.status.is_healthy());
        assert_eq!(health.details.as_deref(), Some("no events received yet"));
    }

    #[test]
    fn test_failure_degrades_then_escalates() {
        let mut health = AgentHealth::new("agent");

        health.record_failure("get order: 404");
        assert_eq!(health.snapshot().status, HealthStatus::Degraded("get order: 404".to_string()));

        for _ in 1..UNHEALTHY_AFTER {
            health.record_failure("get order: 500");
        }
        assert!(health.snapshot().status.is_unhealthy());
    }

    #[test]
    fn test_success_recovers() {
        let mut health = AgentHealth::new("agent");
        health.record_failure("get order coupons: 500");
        health.record_success();

        let snapshot = health.snapshot();
        assert!(snapshot.status.is_healthy());
        assert!(snapshot.details.is_none());
        assert_eq!(snapshot.name, "agent");
    }
}
