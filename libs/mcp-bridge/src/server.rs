//! The MCP tool surface kagent exposes to MCP clients (spec §4.6): two
//! tools, `list_agents` and `invoke_agent`, built on `rmcp`'s tool-router
//! macros the way the teacher's remote-tools container is (remote_tools.rs).

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, schemars, tool, tool_handler, tool_router};
use serde::Deserialize;

use kagent_shared::model::Message;

use crate::registry::AgentCaller;
use crate::session::{AgentRef, McpSessionRegistry};

#[derive(Clone)]
pub struct KagentToolContainer {
    caller: Arc<dyn AgentCaller>,
    sessions: McpSessionRegistry,
    tool_router: ToolRouter<Self>,
}

impl KagentToolContainer {
    pub fn new(caller: Arc<dyn AgentCaller>) -> Self {
        Self {
            caller,
            sessions: McpSessionRegistry::new(),
            tool_router: Self::tool_router(),
        }
    }

    pub fn sessions(&self) -> &McpSessionRegistry {
        &self.sessions
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct InvokeAgentRequest {
    #[schemars(description = "Namespace the target agent is deployed in.")]
    pub namespace: String,
    #[schemars(description = "Name of the target agent.")]
    pub name: String,
    #[schemars(description = "Message text to send to the agent.")]
    pub message: String,
    #[schemars(
        description = "This MCP session's id. Reused to continue the same A2A conversation with the agent across calls."
    )]
    pub mcp_session_id: String,
}

#[tool_router]
impl KagentToolContainer {
    #[tool(
        description = "Lists the agents kagent currently manages, across every namespace this MCP session is authorized to see."
    )]
    pub async fn list_agents(&self) -> Result<CallToolResult, McpError> {
        match self.caller.list_agents().await {
            Ok(agents) => {
                let entries: Vec<serde_json::Value> = agents
                    .iter()
                    .map(|agent| {
                        serde_json::json!({
                            "ref": format!("{}/{}", agent.namespace, agent.name),
                            "description": agent.description,
                        })
                    })
                    .collect();
                let structured = serde_json::json!({ "agents": entries });
                let payload = serde_json::to_string(&structured).unwrap_or_else(|_| "{\"agents\":[]}".to_string());

                let fallback = if agents.is_empty() {
                    "No agents available.".to_string()
                } else {
                    agents
                        .iter()
                        .map(|agent| match &agent.description {
                            Some(description) => format!("{}/{} — {description}", agent.namespace, agent.name),
                            None => format!("{}/{}", agent.namespace, agent.name),
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                };

                Ok(CallToolResult::success(vec![Content::text(payload), Content::text(fallback)]))
            }
            Err(error) => Ok(CallToolResult::error(vec![
                Content::text("LIST_AGENTS_ERROR"),
                Content::text(error.to_string()),
            ])),
        }
    }

    #[tool(
        description = "Sends a message to a kagent-managed agent and waits for its response. Reuses the A2A context from this MCP session's prior call to the same agent, if any."
    )]
    pub async fn invoke_agent(&self, Parameters(request): Parameters<InvokeAgentRequest>) -> Result<CallToolResult, McpError> {
        let agent = AgentRef {
            namespace: request.namespace.clone(),
            name: request.name.clone(),
        };
        let context_id = self
            .sessions
            .get_context(&request.mcp_session_id, &agent)
            .await
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let message = Message::user_text(request.message);
        match self
            .caller
            .invoke_agent(&request.namespace, &request.name, message, &context_id)
            .await
        {
            Ok(task) => {
                self.sessions
                    .set_context(&request.mcp_session_id, &agent, task.context_id.clone())
                    .await;
                let status_text = task.status.message.as_ref().map(Message::text_concat).unwrap_or_default();
                let artifacts_text: String = task
                    .artifacts
                    .iter()
                    .map(|artifact| artifact.parts.iter().filter_map(kagent_shared::model::Part::as_text).collect::<String>())
                    .collect();
                Ok(CallToolResult::success(vec![Content::text(format!("{status_text}{artifacts_text}"))]))
            }
            Err(error) => Ok(CallToolResult::error(vec![
                Content::text("INVOKE_AGENT_ERROR"),
                Content::text(error.to_string()),
            ])),
        }
    }
}

#[tool_handler]
impl ServerHandler for KagentToolContainer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Exposes the agents kagent manages as MCP tools: list_agents to discover them, invoke_agent to send a message and get the reply.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..ServerInfo::default()
        }
    }
}
