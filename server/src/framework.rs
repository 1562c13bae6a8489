//! The default `FrameworkExecutor` (spec §9 "framework-as-capability"): the
//! actual agent framework (ADK/LangGraph/OpenAI Agents/CrewAI) runs as a
//! separate process kagent calls over HTTP, POSTing the turn and reading
//! back a stream of framework events as Server-Sent Events — this crate
//! never runs model inference itself (spec §1 Non-goals).

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::stream::{BoxStream, StreamExt};
use kagent_a2a::{FrameworkError, FrameworkExecutor};
use kagent_shared::error::KagentError;
use kagent_shared::model::{FrameworkEvent, Message};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, serde::Serialize)]
struct InvokeRequest<'a> {
    message: &'a Message,
    context_id: &'a str,
    task_id: &'a str,
}

pub struct HttpFrameworkExecutor {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFrameworkExecutor {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }
}

#[async_trait]
impl FrameworkExecutor for HttpFrameworkExecutor {
    async fn execute(
        &self,
        message: Message,
        context_id: &str,
        task_id: &str,
        _cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<FrameworkEvent, FrameworkError>>, KagentError> {
        let body = InvokeRequest { message: &message, context_id, task_id };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(KagentError::transient)?;

        if !response.status().is_success() {
            return Err(KagentError::transient(std::io::Error::other(format!(
                "framework endpoint returned {}",
                response.status()
            ))));
        }

        let events = response.bytes_stream().eventsource().filter_map(|item| async move {
            let event = match item {
                Ok(event) => event,
                Err(error) => {
                    return Some(Err(FrameworkError {
                        error_code: "UNAVAILABLE".to_string(),
                        message: error.to_string(),
                    }));
                }
            };
            if event.data.trim().is_empty() {
                return None;
            }
            match serde_json::from_str::<FrameworkEvent>(&event.data) {
                Ok(framework_event) => Some(Ok(framework_event)),
                Err(error) => Some(Err(FrameworkError {
                    error_code: "INVALID_ARGUMENT".to_string(),
                    message: format!("malformed framework event: {error}"),
                })),
            }
        });

        Ok(Box::pin(events))
    }
}
