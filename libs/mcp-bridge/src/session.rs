//! MCP session → A2A context-id registry (spec §4.6): each `(mcp_session_id,
//! agent)` pair remembers the context id of its last turn so a follow-up
//! `invoke_agent` call continues the same A2A conversation. Writes are
//! last-writer-wins; there is no merge semantics across concurrent turns.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct AgentRef {
    pub namespace: String,
    pub name: String,
}

#[derive(Default, Clone)]
pub struct McpSessionRegistry {
    contexts: Arc<RwLock<HashMap<(String, AgentRef), String>>>,
}

impl McpSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the context id this MCP session uses for `agent`. A later
    /// call with the same key overwrites the earlier one.
    pub async fn set_context(&self, mcp_session_id: &str, agent: &AgentRef, context_id: impl Into<String>) {
        self.contexts
            .write()
            .await
            .insert((mcp_session_id.to_string(), agent.clone()), context_id.into());
    }

    pub async fn get_context(&self, mcp_session_id: &str, agent: &AgentRef) -> Option<String> {
        self.contexts
            .read()
            .await
            .get(&(mcp_session_id.to_string(), agent.clone()))
            .cloned()
    }

    /// Drops every context this MCP session owns. Called when the
    /// transport reports the session closed (spec §4.6 cleanup hook).
    pub async fn on_unregister_session(&self, mcp_session_id: &str) {
        self.contexts.write().await.retain(|(session, _), _| session != mcp_session_id);
    }
}
