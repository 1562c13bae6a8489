//! A2A JSON-RPC 2.0 surface (spec §6): `message/send`, `message/stream`,
//! `tasks/get`, `tasks/cancel`, `tasks/resubscribe`,
//! `tasks/pushNotificationConfig/{set,get,list,delete}`. Streaming methods
//! respond as Server-Sent Events, `data: <json>` per event, terminated by
//! the `[DONE]` sentinel the client watches for.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use futures::stream::{self, Stream, StreamExt};
use kagent_a2a::jsonrpc::{self, JsonRpcError};
use kagent_audit::AuditIdentity;
use kagent_shared::error::KagentError;
use kagent_shared::model::{Message, PushConfig};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: serde_json::Value,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    fn ok(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    fn err(id: serde_json::Value, error: JsonRpcError) -> Self {
        Self { jsonrpc: "2.0", id, result: None, error: Some(error) }
    }
}

#[derive(Debug, Deserialize)]
struct TaskIdParams {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageParams {
    message: Message,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushConfigGetDeleteParams {
    task_id: String,
    config_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushConfigListParams {
    task_id: String,
}

const STREAMING_METHODS: &[&str] = &["message/stream", "tasks/resubscribe"];

pub async fn rpc_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<AuditIdentity>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    if STREAMING_METHODS.contains(&request.method.as_str()) {
        return dispatch_streaming(state, identity, request).await.into_response();
    }

    let id = request.id.clone();
    match dispatch_unary(&state, &identity, &request).await {
        Ok(result) => Json(JsonRpcResponse::ok(id, result)).into_response(),
        Err(error) => Json(JsonRpcResponse::err(id, jsonrpc::from_kagent_error(&error))).into_response(),
    }
}

async fn dispatch_unary(state: &AppState, identity: &AuditIdentity, request: &JsonRpcRequest) -> Result<serde_json::Value, KagentError> {
    match request.method.as_str() {
        "message/send" => {
            let params: SendMessageParams = parse_params(&request.params)?;
            let task = state.task_manager.on_send_message(params.message, &identity.user_id).await?;
            Ok(serde_json::to_value(task).map_err(KagentError::transient)?)
        }
        "tasks/get" => {
            // `Option<Task>`: a missing task serializes to a `null` JSON-RPC
            // success result, never an error (spec §7 NotFound policy).
            let params: TaskIdParams = parse_params(&request.params)?;
            let task = state.task_manager.on_get_task(&params.id).await?;
            Ok(serde_json::to_value(task).map_err(KagentError::transient)?)
        }
        "tasks/cancel" => {
            let params: TaskIdParams = parse_params(&request.params)?;
            let task = state.task_manager.on_cancel_task(&params.id).await?;
            Ok(serde_json::to_value(task).map_err(KagentError::transient)?)
        }
        "tasks/pushNotificationConfig/set" => {
            let config: PushConfig = parse_params(&request.params)?;
            state.task_manager.on_set_push_notification_config(config).await?;
            Ok(serde_json::Value::Null)
        }
        "tasks/pushNotificationConfig/get" => {
            let params: PushConfigGetDeleteParams = parse_params(&request.params)?;
            let config = state
                .task_manager
                .on_get_push_notification_config(&params.task_id, &params.config_id)
                .await?;
            Ok(serde_json::to_value(config).map_err(KagentError::transient)?)
        }
        "tasks/pushNotificationConfig/list" => {
            let params: PushConfigListParams = parse_params(&request.params)?;
            let configs = state.task_manager.on_list_push_notification_configs(&params.task_id).await?;
            Ok(serde_json::to_value(configs).map_err(KagentError::transient)?)
        }
        "tasks/pushNotificationConfig/delete" => {
            let params: PushConfigGetDeleteParams = parse_params(&request.params)?;
            state
                .task_manager
                .on_delete_push_notification_config(&params.task_id, &params.config_id)
                .await?;
            Ok(serde_json::Value::Null)
        }
        other => Err(KagentError::validation(format!("unsupported method: {other}"))),
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: &serde_json::Value) -> Result<T, KagentError> {
    serde_json::from_value(params.clone()).map_err(|error| KagentError::validation(format!("invalid params: {error}")))
}

async fn dispatch_streaming(state: AppState, identity: AuditIdentity, request: JsonRpcRequest) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let id = request.id.clone();
    let events = match request.method.as_str() {
        "message/stream" => match parse_params::<SendMessageParams>(&request.params) {
            Ok(params) => state.task_manager.on_send_message_stream(params.message, &identity.user_id).await,
            Err(error) => Err(error),
        },
        "tasks/resubscribe" => match parse_params::<TaskIdParams>(&request.params) {
            Ok(params) => state.task_manager.on_resubscribe(&params.id).await,
            Err(error) => Err(error),
        },
        _ => unreachable!("dispatch_streaming only called for STREAMING_METHODS"),
    };

    let done = stream::once(async { Ok(Event::default().data("[DONE]")) });

    let body: std::pin::Pin<Box<dyn Stream<Item = Result<Event, std::convert::Infallible>> + Send>> = match events {
        Ok(stream) => Box::pin(
            stream
                .map(move |event| {
                    let payload = JsonRpcResponse::ok(id.clone(), serde_json::to_value(&event).unwrap_or(serde_json::Value::Null));
                    Ok(Event::default().json_data(payload).unwrap_or_else(|_| Event::default().data("{}")))
                })
                .chain(done),
        ),
        Err(error) => {
            let payload = JsonRpcResponse::err(id, jsonrpc::from_kagent_error(&error));
            let single = stream::once(async move { Ok(Event::default().json_data(payload).unwrap_or_else(|_| Event::default().data("{}"))) });
            Box::pin(single.chain(done))
        }
    };

    Sse::new(body).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use futures::stream::BoxStream;
    use kagent_a2a::{FrameworkError, FrameworkExecutor, TaskManager};
    use kagent_mcp_bridge::McpSessionRegistry;
    use kagent_persistence::{InMemoryPushConfigStore, InMemorySessionService, InMemoryTaskStore};
    use kagent_shared::model::{EventContent, EventPart, FrameworkEvent};
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::config::AppConfig;
    use crate::state::AppExecutor;

    struct OneShotText(&'static str);

    #[async_trait]
    impl FrameworkExecutor for OneShotText {
        async fn execute(
            &self,
            _message: Message,
            _context_id: &str,
            _task_id: &str,
            _cancel: CancellationToken,
        ) -> Result<BoxStream<'static, Result<FrameworkEvent, FrameworkError>>, KagentError> {
            let event = FrameworkEvent {
                invocation_id: "inv1".to_string(),
                author: "agent".to_string(),
                partial: false,
                content: EventContent {
                    parts: vec![EventPart::Text { text: self.0.to_string() }],
                },
                long_running_tool_ids: vec![],
                error_code: None,
            };
            Ok(Box::pin(futures::stream::iter(vec![Ok(event)])))
        }
    }

    fn test_state() -> AppState {
        let executor: AppExecutor = Arc::new(OneShotText("hello"));
        let task_manager = Arc::new(TaskManager::new(
            executor,
            Arc::new(InMemoryTaskStore::default()),
            Arc::new(InMemoryPushConfigStore::default()),
            Arc::new(InMemorySessionService::default()),
            "kagent",
        ));
        AppState {
            config: Arc::new(AppConfig::from_env()),
            task_manager,
            mcp_sessions: McpSessionRegistry::new(),
            agent_namespace: "default".to_string(),
            agent_name: "agent".to_string(),
        }
    }

    #[tokio::test]
    async fn message_send_returns_a_completed_task() {
        let state = test_state();
        let identity = AuditIdentity::anonymous();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: serde_json::json!(1),
            method: "message/send".to_string(),
            params: serde_json::json!({"message": Message::user_text("hi")}),
        };
        let result = dispatch_unary(&state, &identity, &request).await.expect("dispatch");
        assert_eq!(result["status"]["state"], "completed");
    }

    #[tokio::test]
    async fn unsupported_method_is_a_validation_error() {
        let state = test_state();
        let identity = AuditIdentity::anonymous();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: serde_json::json!(1),
            method: "tasks/doesNotExist".to_string(),
            params: serde_json::Value::Null,
        };
        let error = dispatch_unary(&state, &identity, &request).await.unwrap_err();
        assert!(matches!(error, KagentError::Validation(_)));
    }

    #[tokio::test]
    async fn tasks_get_returns_a_null_result_for_an_unknown_id() {
        let state = test_state();
        let identity = AuditIdentity::anonymous();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: serde_json::json!(1),
            method: "tasks/get".to_string(),
            params: serde_json::json!({"id": "missing"}),
        };
        let result = dispatch_unary(&state, &identity, &request).await.expect("dispatch");
        assert!(result.is_null());
    }
}
