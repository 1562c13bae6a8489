//! The well-known agent card (spec §6): served unauthenticated under this
//! process's agent path.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
}

#[derive(Debug, Serialize)]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub capabilities: AgentCapabilities,
}

pub async fn agent_card_handler(State(state): State<AppState>) -> Json<AgentCard> {
    Json(AgentCard {
        name: state.agent_name.clone(),
        description: format!("kagent agent {}/{}", state.agent_namespace, state.agent_name),
        url: format!("/a2a/{}/{}/", state.agent_namespace, state.agent_name),
        version: env!("CARGO_PKG_VERSION").to_string(),
        capabilities: AgentCapabilities { streaming: true, push_notifications: true },
    })
}
