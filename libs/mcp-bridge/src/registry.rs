//! Agent listing/invocation capability interface (spec §4.6, §9): the
//! bridge never talks A2A HTTP/JSON-RPC directly, it only depends on this
//! trait, the same separation the core keeps from the agent framework.

use async_trait::async_trait;
use kagent_shared::error::KagentError;
use kagent_shared::model::{Message, Task};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[async_trait]
pub trait AgentCaller: Send + Sync {
    /// Lists the agents visible to the caller, scoped however the
    /// concrete implementation enforces namespace authorization.
    async fn list_agents(&self) -> Result<Vec<AgentSummary>, KagentError>;

    /// Sends `message` to the named agent within `context_id` and waits
    /// for the resulting task to reach a non-running state.
    async fn invoke_agent(
        &self,
        namespace: &str,
        name: &str,
        message: Message,
        context_id: &str,
    ) -> Result<Task, KagentError>;
}
