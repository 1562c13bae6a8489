//! Streaming Executor (spec §4.2): drives the agent-framework capability
//! trait to completion, gates long-running tool calls through HITL, and
//! feeds every converted event into a `TaskSavingEventQueue`.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use kagent_shared::error::{KagentError, error_code_to_message};
use kagent_shared::model::{EventPart, FrameworkEvent, Message, TaskState, TaskStatus};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::converter::{convert_event, EventContext};
use crate::event::{A2aStreamEvent, TaskStatusUpdateEvent};
use crate::queue::{EventSink, TaskSavingEventQueue};

/// A framework-reported execution failure carrying an `error_code` (spec
/// §4.2, §7 ExecutionError).
#[derive(Debug, Clone)]
pub struct FrameworkError {
    pub error_code: String,
    pub message: String,
}

/// The thin capability interface the agent framework (ADK/LangGraph/OpenAI
/// Agents/CrewAI) implements (spec §9). The core only depends on this
/// trait, never on a concrete framework.
#[async_trait]
pub trait FrameworkExecutor: Send + Sync {
    async fn execute(
        &self,
        message: Message,
        context_id: &str,
        task_id: &str,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<FrameworkEvent, FrameworkError>>, KagentError>;
}

/// Whether `event` carries a long-running function call eligible for HITL
/// gating (spec §4.2), and if so which terminal-for-this-turn state it
/// implies.
fn gating_state(event: &FrameworkEvent) -> Option<TaskState> {
    event.content.parts.iter().find_map(|part| match part {
        EventPart::FunctionCall { id, name, .. }
            if event.long_running_tool_ids.iter().any(|t| t == id) =>
        {
            Some(if name == "request_euc" {
                TaskState::AuthRequired
            } else {
                TaskState::InputRequired
            })
        }
        _ => None,
    })
}

/// Lets a boxed trait object stand in for `F` in `StreamingExecutor<F>` /
/// `TaskManager<F>`, so the binary can pick its framework implementation at
/// startup instead of at compile time.
#[async_trait]
impl FrameworkExecutor for std::sync::Arc<dyn FrameworkExecutor> {
    async fn execute(
        &self,
        message: Message,
        context_id: &str,
        task_id: &str,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<FrameworkEvent, FrameworkError>>, KagentError> {
        (**self).execute(message, context_id, task_id, cancel).await
    }
}

pub struct StreamingExecutor<F: FrameworkExecutor> {
    framework: F,
}

impl<F: FrameworkExecutor> StreamingExecutor<F> {
    pub fn new(framework: F) -> Self {
        Self { framework }
    }

    /// Drives one execution to completion (spec §4.2):
    /// 1. for each framework event, gate on HITL-eligible long-running
    ///    tool calls — pausing further emission for this invocation once
    ///    one is observed;
    /// 2. otherwise convert and enqueue;
    /// 3. on iterator exhaustion, enqueue one final `completed` status.
    pub async fn execute<S: EventSink>(
        &self,
        message: Message,
        queue: &TaskSavingEventQueue<S>,
        task_id: &str,
        context_id: &str,
        app_name: &str,
        user_id: &str,
        cancel: CancellationToken,
    ) -> Result<(), KagentError> {
        let mut stream = self
            .framework
            .execute(message, context_id, task_id, cancel.clone())
            .await?;

        let ctx = EventContext {
            task_id: task_id.to_string(),
            context_id: context_id.to_string(),
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
        };

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                next = stream.next() => {
                    let Some(item) = next else { break };
                    match item {
                        Ok(event) => {
                            let gate = gating_state(&event);
                            for converted in convert_event(&event, &ctx) {
                                queue.enqueue(converted).await?;
                            }
                            if gate.is_some() {
                                // Pause further emission for this
                                // invocation until the next user message
                                // (spec §4.2) — the framework run ends
                                // here without a terminal status.
                                return Ok(());
                            }
                        }
                        Err(error) => return self.handle_framework_error(queue, task_id, context_id, error).await,
                    }
                }
            }
        }

        queue
            .enqueue(A2aStreamEvent::StatusUpdate(TaskStatusUpdateEvent {
                task_id: task_id.to_string(),
                context_id: context_id.to_string(),
                status: TaskStatus::new(TaskState::Completed),
                metadata: None,
                is_final: true,
            }))
            .await
    }

    async fn handle_framework_error<S: EventSink>(
        &self,
        queue: &TaskSavingEventQueue<S>,
        task_id: &str,
        context_id: &str,
        error: FrameworkError,
    ) -> Result<(), KagentError> {
        match error_code_to_message(&error.error_code) {
            Some(human) => {
                queue
                    .enqueue(A2aStreamEvent::StatusUpdate(TaskStatusUpdateEvent {
                        task_id: task_id.to_string(),
                        context_id: context_id.to_string(),
                        status: TaskStatus::with_message(
                            TaskState::Failed,
                            Message::agent(vec![kagent_shared::model::Part::text(human)]),
                        ),
                        metadata: None,
                        is_final: false,
                    }))
                    .await?;
                Err(KagentError::execution(error.error_code, human))
            }
            None => {
                warn!(code = %error.error_code, "unclassified framework error; propagating to task manager");
                Err(KagentError::execution(error.error_code, error.message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kagent_shared::model::{EventContent, Role};

    use crate::queue::ListSink;

    struct ScriptedFramework {
        events: Vec<Result<FrameworkEvent, FrameworkError>>,
    }

    #[async_trait]
    impl FrameworkExecutor for ScriptedFramework {
        async fn execute(
            &self,
            _message: Message,
            _context_id: &str,
            _task_id: &str,
            _cancel: CancellationToken,
        ) -> Result<BoxStream<'static, Result<FrameworkEvent, FrameworkError>>, KagentError> {
            Ok(Box::pin(futures::stream::iter(self.events.clone())))
        }
    }

    fn text_event(partial: bool, text: &str) -> FrameworkEvent {
        FrameworkEvent {
            invocation_id: "inv1".to_string(),
            author: "agent".to_string(),
            partial,
            content: EventContent {
                parts: vec![EventPart::Text { text: text.to_string() }],
            },
            long_running_tool_ids: vec![],
            error_code: None,
        }
    }

    async fn run(events: Vec<Result<FrameworkEvent, FrameworkError>>) -> (Result<(), KagentError>, Vec<A2aStreamEvent>) {
        let framework = ScriptedFramework { events };
        let executor = StreamingExecutor::new(framework);
        let sink = ListSink::new();
        let queue = TaskSavingEventQueue::new(sink.clone(), None, "t1".to_string(), "c1".to_string());
        let result = executor
            .execute(
                Message::new(Role::User, vec![]),
                &queue,
                "t1",
                "c1",
                "kagent",
                "u1",
                CancellationToken::new(),
            )
            .await;
        (result, sink.into_events().await)
    }

    #[tokio::test]
    async fn streaming_happy_path_ends_with_single_completed_status() {
        let (result, events) = run(vec![
            Ok(text_event(true, "Hel")),
            Ok(text_event(true, "lo")),
            Ok(text_event(false, "Hello")),
        ])
        .await;
        assert!(result.is_ok());
        assert_eq!(events.len(), 4);
        assert!(events[..3].iter().all(|e| matches!(e, A2aStreamEvent::StatusUpdate(s) if s.status.state == TaskState::Working)));
        match &events[3] {
            A2aStreamEvent::StatusUpdate(s) => {
                assert_eq!(s.status.state, TaskState::Completed);
                assert!(s.is_final);
            }
            _ => panic!("expected final status"),
        }
    }

    #[tokio::test]
    async fn long_running_tool_call_pauses_without_terminal_event() {
        let event = FrameworkEvent {
            invocation_id: "inv1".to_string(),
            author: "agent".to_string(),
            partial: false,
            content: EventContent {
                parts: vec![EventPart::FunctionCall {
                    id: "f1".to_string(),
                    name: "search".to_string(),
                    args: serde_json::json!({"q": "x"}),
                }],
            },
            long_running_tool_ids: vec!["f1".to_string()],
            error_code: None,
        };

        let (result, events) = run(vec![Ok(event)]).await;
        assert!(result.is_ok());
        assert_eq!(events.len(), 1);
        match &events[0] {
            A2aStreamEvent::StatusUpdate(s) => {
                assert_eq!(s.status.state, TaskState::InputRequired);
                assert!(!s.is_final);
            }
            _ => panic!("expected status update"),
        }
    }

    #[tokio::test]
    async fn known_error_code_emits_non_final_failed_then_propagates() {
        let (result, events) = run(vec![Err(FrameworkError {
            error_code: "RATE_LIMIT_EXCEEDED".to_string(),
            message: "raw".to_string(),
        })])
        .await;
        assert!(result.is_err());
        assert_eq!(events.len(), 1);
        match &events[0] {
            A2aStreamEvent::StatusUpdate(s) => {
                assert_eq!(s.status.state, TaskState::Failed);
                assert!(!s.is_final);
            }
            _ => panic!("expected status update"),
        }
    }

    #[tokio::test]
    async fn unknown_error_code_propagates_without_emitting() {
        let (result, events) = run(vec![Err(FrameworkError {
            error_code: "SOME_NEW_CODE".to_string(),
            message: "raw".to_string(),
        })])
        .await;
        assert!(result.is_err());
        assert!(events.is_empty());
    }

    #[test]
    fn gating_state_none_when_id_not_long_running() {
        let event = FrameworkEvent {
            invocation_id: "inv1".to_string(),
            author: "agent".to_string(),
            partial: false,
            content: EventContent {
                parts: vec![EventPart::FunctionCall {
                    id: "f1".to_string(),
                    name: "search".to_string(),
                    args: serde_json::json!({}),
                }],
            },
            long_running_tool_ids: vec![],
            error_code: None,
        };
        assert_eq!(gating_state(&event), None);
    }
}
