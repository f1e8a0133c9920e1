use actix::prelude::*;
use serde_json::Value;
use std::sync::Arc;

use super::handler::{EventOutcome, OrderAgent};
use super::health::{AgentHealth, ComponentHealth};

// ============================================================================
// Actor Messages
// ============================================================================

/// One inbound message; replies with the payload to emit
#[derive(Message)]
#[rtype(result = "Value")]
pub struct HandleEvent {
    pub message: Value,
}

/// Handle the configured order id, as if an empty message arrived
#[derive(Message)]
#[rtype(result = "Value")]
pub struct RunCheck;

#[derive(Message)]
#[rtype(result = "ComponentHealth")]
pub struct GetAgentHealth;

// ============================================================================
// Order Agent Actor - invocation adapter around one OrderAgent
// ============================================================================
//
// Events are independent: each HandleEvent runs its own aggregation, and
// several may be in flight at once. The actor only owns the health record.
//
// ============================================================================

pub struct OrderAgentActor {
    agent: Arc<OrderAgent>,
    health: AgentHealth,
}

impl OrderAgentActor {
    pub fn new(agent: OrderAgent) -> Self {
        Self {
            agent: Arc::new(agent),
            health: AgentHealth::new("order_agent"),
        }
    }

    fn record(&mut self, outcome: &EventOutcome) {
        match &outcome.failure {
            None => self.health.record_success(),
            Some((scope, message)) => {
                tracing::debug!(scope = %scope, "Recording failed event");
                self.health.record_failure(message.clone());
            }
        }
    }
}

impl Actor for OrderAgentActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("OrderAgentActor started");
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<HandleEvent> for OrderAgentActor {
    type Result = ResponseActFuture<Self, Value>;

    fn handle(&mut self, msg: HandleEvent, _: &mut Self::Context) -> Self::Result {
        let agent = self.agent.clone();

        Box::pin(
            async move { agent.handle(msg.message).await }
                .into_actor(self)
                .map(|outcome, act, _ctx| {
                    act.record(&outcome);
                    outcome.payload
                }),
        )
    }
}

impl Handler<RunCheck> for OrderAgentActor {
    type Result = ResponseActFuture<Self, Value>;

    fn handle(&mut self, _: RunCheck, _: &mut Self::Context) -> Self::Result {
        let agent = self.agent.clone();

        Box::pin(
            async move { agent.check().await }
                .into_actor(self)
                .map(|outcome, act, _ctx| {
                    act.record(&outcome);
                    outcome.payload
                }),
        )
    }
}

impl Handler<GetAgentHealth> for OrderAgentActor {
    type Result = MessageResult<GetAgentHealth>;

    fn handle(&mut self, _: GetAgentHealth, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.health.snapshot())
    }
}
