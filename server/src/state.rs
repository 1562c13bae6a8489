//! Shared, `Arc`-held application state (spec §9 "global state").

use std::sync::Arc;

use kagent_a2a::TaskManager;
use kagent_mcp_bridge::McpSessionRegistry;

use crate::config::AppConfig;
use crate::framework::HttpFrameworkExecutor;

pub type AppExecutor = Arc<dyn kagent_a2a::FrameworkExecutor>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub task_manager: Arc<TaskManager<AppExecutor>>,
    pub mcp_sessions: McpSessionRegistry,
    pub agent_namespace: String,
    pub agent_name: String,
}

pub fn default_framework_executor(endpoint: impl Into<String>) -> AppExecutor {
    Arc::new(HttpFrameworkExecutor::new(reqwest::Client::new(), endpoint))
}
