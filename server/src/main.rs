//! kagent control-plane server binary (spec §9): wires config, persistence,
//! the A2A task manager, the MCP bridge, and auth/audit middleware into one
//! axum `Router`, the way the teacher's gateway binary composes its API.

mod agent_card;
mod agent_client;
mod auth;
mod config;
mod framework;
mod mcp;
mod rpc;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use kagent_a2a::TaskManager;
use kagent_mcp_bridge::{AgentSummary, KagentToolContainer};
use kagent_persistence::{
    InMemoryPushConfigStore, InMemorySessionService, InMemoryTaskStore, PushConfigStore, RestClient, RestPushConfigStore,
    RestSessionService, RestTaskStore, SessionService, TaskStore,
};
use tracing_subscriber::EnvFilter;

use crate::agent_client::{HttpAgentCaller, StaticAgentDirectory};
use crate::config::AppConfig;
use crate::state::{AppState, default_framework_executor};

fn persistence_base_url() -> Option<String> {
    std::env::var("KAGENT_PERSISTENCE_URL").ok().filter(|v| !v.is_empty())
}

fn build_stores(http: reqwest::Client) -> (Arc<dyn TaskStore>, Arc<dyn PushConfigStore>, Arc<dyn SessionService>) {
    match persistence_base_url() {
        Some(base_url) => {
            let token = std::env::var("KAGENT_PERSISTENCE_TOKEN").ok().filter(|v| !v.is_empty());
            let client = RestClient::new(http, base_url, token);
            (
                Arc::new(RestTaskStore::new(client.clone())),
                Arc::new(RestPushConfigStore::new(client.clone())),
                Arc::new(RestSessionService::new(client)),
            )
        }
        None => (
            Arc::new(InMemoryTaskStore::default()),
            Arc::new(InMemoryPushConfigStore::default()),
            Arc::new(InMemorySessionService::default()),
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).json().init();

    let config = Arc::new(AppConfig::from_env());
    let agent_namespace = std::env::var("KAGENT_AGENT_NAMESPACE").unwrap_or_else(|_| "default".to_string());
    let agent_name = std::env::var("KAGENT_AGENT_NAME").unwrap_or_else(|_| "agent".to_string());
    let bind_addr = std::env::var("KAGENT_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let framework_endpoint = std::env::var("KAGENT_FRAMEWORK_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:9000/invoke".to_string());

    let http = reqwest::Client::new();
    let (task_store, push_store, sessions) = build_stores(http.clone());

    let executor = default_framework_executor(framework_endpoint);
    let app_name = format!("{agent_namespace}/{agent_name}");
    let task_manager = Arc::new(TaskManager::new(executor, task_store, push_store, sessions, app_name));

    let directory = StaticAgentDirectory::new(vec![AgentSummary {
        namespace: agent_namespace.clone(),
        name: agent_name.clone(),
        description: None,
    }]);
    let self_base_url = std::env::var("KAGENT_SELF_BASE_URL").unwrap_or_else(|_| format!("http://{bind_addr}"));
    let caller = Arc::new(HttpAgentCaller::new(http, self_base_url, directory));
    let mcp_container = KagentToolContainer::new(caller);

    let state = AppState {
        config: config.clone(),
        task_manager,
        mcp_sessions: mcp_container.sessions().clone(),
        agent_namespace: agent_namespace.clone(),
        agent_name: agent_name.clone(),
    };

    let agent_path = format!("/a2a/{agent_namespace}/{agent_name}/");
    let agent_card_path = format!("/a2a/{agent_namespace}/{agent_name}/.well-known/agent.json");

    let app = Router::new()
        .route(&agent_path, post(rpc::rpc_handler))
        .route(&agent_card_path, get(agent_card::agent_card_handler))
        .nest_service("/mcp", mcp::mcp_service(mcp_container))
        .layer(axum::middleware::from_fn_with_state(config.audit, kagent_audit::audit_middleware))
        .layer(axum::middleware::from_fn_with_state(config.clone(), auth::auth_middleware))
        .with_state(state);

    tracing::info!(%bind_addr, %agent_namespace, %agent_name, "kagent-server starting");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<std::net::SocketAddr>()).await?;
    Ok(())
}
