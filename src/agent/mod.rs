// ============================================================================
// Invocation Adapter
// ============================================================================
//
// Receives inbound messages carrying an order id, runs the aggregator and
// renders exactly one success or error payload per message.
//
// - options/ - Agent options and output mode
// - handler/ - Message → aggregation → payload
// - health/  - "Working" status derived from recent outcomes
// - actor/   - Actix actor hosting the agent
//
// ============================================================================

mod actor;
mod handler;
mod health;
mod options;

pub use actor::{GetAgentHealth, HandleEvent, OrderAgentActor, RunCheck};
pub use handler::OrderAgent;
pub use options::{AgentOptions, OutputMode};
