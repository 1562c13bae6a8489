//! Task Manager (spec §4.1, §6): the single entry point the JSON-RPC
//! surface calls into. Owns context/task-id resolution, HITL-reply
//! short-circuiting, session bootstrap, and the live/cancellation registries
//! that back `tasks/cancel` and `tasks/resubscribe`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kagent_persistence::{PushConfigStore, SessionService, TaskStore};
use kagent_shared::error::KagentError;
use kagent_shared::model::{Message, Part, PushConfig, Task, TaskState, TaskStatus};
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::context::{resolve_context_id, resolve_task_id};
use crate::event::{A2aStreamEvent, TaskStatusUpdateEvent};
use crate::executor::{FrameworkExecutor, StreamingExecutor};
use crate::hitl::{Decision, extract_decision};
use crate::queue::{ChannelSink, EventSink, ListSink, TaskSavingEventQueue, apply_event_to_task};

/// Fans every event out to the primary streaming consumer and, when one is
/// registered, to the broadcast tap `tasks/resubscribe` joins mid-flight.
#[derive(Clone)]
struct TeeSink {
    primary: ChannelSink,
    tap: broadcast::Sender<A2aStreamEvent>,
}

#[async_trait]
impl EventSink for TeeSink {
    async fn enqueue(&self, event: A2aStreamEvent) -> Result<(), KagentError> {
        let _ = self.tap.send(event.clone());
        self.primary.enqueue(event).await
    }
}

pub struct TaskManager<F: FrameworkExecutor> {
    executor: Arc<StreamingExecutor<F>>,
    task_store: Arc<dyn TaskStore>,
    push_store: Arc<dyn PushConfigStore>,
    sessions: Arc<dyn SessionService>,
    app_name: String,
    cancellations: Arc<Mutex<HashMap<String, CancellationToken>>>,
    live_taps: Arc<Mutex<HashMap<String, broadcast::Sender<A2aStreamEvent>>>>,
}

impl<F: FrameworkExecutor + 'static> TaskManager<F> {
    pub fn new(
        framework: F,
        task_store: Arc<dyn TaskStore>,
        push_store: Arc<dyn PushConfigStore>,
        sessions: Arc<dyn SessionService>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            executor: Arc::new(StreamingExecutor::new(framework)),
            task_store,
            push_store,
            sessions,
            app_name: app_name.into(),
            cancellations: Arc::new(Mutex::new(HashMap::new())),
            live_taps: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn ensure_session(&self, user_id: &str, session_id: &str) -> Result<(), KagentError> {
        if self.sessions.get(&self.app_name, user_id, session_id).await?.is_none() {
            self.sessions.create(&self.app_name, user_id, session_id).await?;
        }
        Ok(())
    }

    async fn register_cancellation(&self, task_id: &str) -> CancellationToken {
        let token = CancellationToken::new();
        self.cancellations.lock().await.insert(task_id.to_string(), token.clone());
        token
    }

    /// Applies an inbound reply to a paused task (spec §4.7): a `deny`
    /// decision ends the task right here without reinvoking the framework;
    /// `approve`/`unknown` fall through so the caller forwards the message
    /// on for the framework to resume.
    async fn resolve_hitl_reply(&self, existing: &Task, reply: &Message) -> Result<Option<Task>, KagentError> {
        if extract_decision(reply) == Decision::Deny {
            let mut task = existing.clone();
            task.status = TaskStatus::with_message(
                TaskState::Canceled,
                Message::agent(vec![Part::text("Request denied by user.")]),
            );
            self.task_store.save(&task).await?;
            return Ok(Some(task));
        }
        Ok(None)
    }

    /// `message/send` (spec §6): blocks until the framework either
    /// completes the turn or pauses on a long-running call, and returns the
    /// resulting `Task` reified from the events observed in this call.
    pub async fn on_send_message(&self, message: Message, user_id: &str) -> Result<Task, KagentError> {
        let context_id = resolve_context_id(&message);
        let task_id = resolve_task_id(&message);

        if let Some(existing) = self.task_store.get(&task_id).await? {
            if matches!(existing.status.state, TaskState::InputRequired | TaskState::AuthRequired) {
                if let Some(task) = self.resolve_hitl_reply(&existing, &message).await? {
                    return Ok(task);
                }
            }
        }

        self.ensure_session(user_id, &context_id).await?;

        let sink = ListSink::new();
        let queue = TaskSavingEventQueue::new(sink.clone(), Some(self.task_store.clone()), task_id.clone(), context_id.clone());
        let cancel = self.register_cancellation(&task_id).await;

        let result = self
            .executor
            .execute(message, &queue, &task_id, &context_id, &self.app_name, user_id, cancel)
            .await;
        self.cancellations.lock().await.remove(&task_id);
        result?;

        let mut task = Task::new(&task_id, &context_id);
        for event in sink.into_events().await {
            apply_event_to_task(&mut task, &event);
        }
        task.scrub_partial_history();
        Ok(task)
    }

    /// `message/stream` (spec §6): returns immediately with a live stream of
    /// A2A events; the framework run continues on a detached task and its
    /// events are tapped so a later `tasks/resubscribe` can rejoin.
    pub async fn on_send_message_stream(
        &self,
        message: Message,
        user_id: &str,
    ) -> Result<ReceiverStream<A2aStreamEvent>, KagentError> {
        let context_id = resolve_context_id(&message);
        let task_id = resolve_task_id(&message);

        if let Some(existing) = self.task_store.get(&task_id).await? {
            if matches!(existing.status.state, TaskState::InputRequired | TaskState::AuthRequired) {
                if let Some(task) = self.resolve_hitl_reply(&existing, &message).await? {
                    let (tx, rx) = mpsc::channel(1);
                    let _ = tx
                        .send(A2aStreamEvent::StatusUpdate(TaskStatusUpdateEvent {
                            task_id: task.id.clone(),
                            context_id: task.context_id.clone(),
                            status: task.status.clone(),
                            metadata: None,
                            is_final: true,
                        }))
                        .await;
                    return Ok(ReceiverStream::new(rx));
                }
            }
        }

        self.ensure_session(user_id, &context_id).await?;

        let (channel_sink, rx) = ChannelSink::pair();
        let (tap_tx, _) = broadcast::channel(64);
        self.live_taps.lock().await.insert(task_id.clone(), tap_tx.clone());
        let sink = TeeSink { primary: channel_sink, tap: tap_tx };

        let queue = TaskSavingEventQueue::new(sink, Some(self.task_store.clone()), task_id.clone(), context_id.clone());
        let cancel = self.register_cancellation(&task_id).await;

        let executor = self.executor.clone();
        let app_name = self.app_name.clone();
        let user_id = user_id.to_string();
        let task_id_done = task_id.clone();
        let context_id_done = context_id.clone();
        let cancellations = self.cancellations.clone();
        let live_taps = self.live_taps.clone();
        tokio::spawn(async move {
            if let Err(error) = executor
                .execute(message, &queue, &task_id_done, &context_id_done, &app_name, &user_id, cancel)
                .await
            {
                warn!(task_id = %task_id_done, %error, "streaming execution ended in error");
            }
            cancellations.lock().await.remove(&task_id_done);
            live_taps.lock().await.remove(&task_id_done);
        });

        Ok(ReceiverStream::new(rx))
    }

    /// `tasks/get` (spec §6): snapshot of the persisted task, or `None` if
    /// absent — surfaced by callers as a nil result, never as an error.
    pub async fn on_get_task(&self, task_id: &str) -> Result<Option<Task>, KagentError> {
        self.task_store.get(task_id).await
    }

    async fn require_task(&self, task_id: &str) -> Result<Task, KagentError> {
        self.on_get_task(task_id)
            .await?
            .ok_or_else(|| KagentError::not_found(format!("task not found: {task_id}")))
    }

    /// `tasks/cancel` (spec §6): deletes the task and returns the last
    /// snapshot, canceling the running invocation (if any) first.
    pub async fn on_cancel_task(&self, task_id: &str) -> Result<Task, KagentError> {
        let mut task = self.require_task(task_id).await?;

        if let Some(token) = self.cancellations.lock().await.remove(task_id) {
            token.cancel();
        }

        task.status = TaskStatus::new(TaskState::Canceled);
        self.task_store.delete(task_id).await?;
        Ok(task)
    }

    /// `tasks/resubscribe` (spec §6): replays the persisted history as
    /// `Message` events, then, if the task is still running, joins its live
    /// broadcast tap until the invocation's terminal status event.
    pub async fn on_resubscribe(&self, task_id: &str) -> Result<ReceiverStream<A2aStreamEvent>, KagentError> {
        let task = self.require_task(task_id).await?;
        let (tx, rx) = mpsc::channel(task.history.len() + 1);

        for message in &task.history {
            let _ = tx.send(A2aStreamEvent::Message(message.clone())).await;
        }

        if task.status.state.is_terminal() {
            let _ = tx
                .send(A2aStreamEvent::StatusUpdate(TaskStatusUpdateEvent {
                    task_id: task.id.clone(),
                    context_id: task.context_id.clone(),
                    status: task.status.clone(),
                    metadata: None,
                    is_final: true,
                }))
                .await;
            return Ok(ReceiverStream::new(rx));
        }

        let tap = self.live_taps.lock().await.get(task_id).cloned();
        if let Some(tap) = tap {
            let mut subscription = tap.subscribe();
            tokio::spawn(async move {
                while let Ok(event) = subscription.recv().await {
                    let is_final = event.is_final_status();
                    if tx.send(event).await.is_err() || is_final {
                        break;
                    }
                }
            });
        }

        Ok(ReceiverStream::new(rx))
    }

    /// `tasks/pushNotificationConfig/set` (spec §6).
    pub async fn on_set_push_notification_config(&self, config: PushConfig) -> Result<(), KagentError> {
        self.push_store.save(&config).await
    }

    /// `tasks/pushNotificationConfig/get` (spec §6).
    pub async fn on_get_push_notification_config(&self, task_id: &str, config_id: &str) -> Result<PushConfig, KagentError> {
        self.push_store
            .get(task_id, config_id)
            .await?
            .ok_or_else(|| KagentError::not_found(format!("push notification config not found: {config_id}")))
    }

    pub async fn on_list_push_notification_configs(&self, task_id: &str) -> Result<Vec<PushConfig>, KagentError> {
        self.push_store.list(task_id).await
    }

    pub async fn on_delete_push_notification_config(&self, task_id: &str, config_id: &str) -> Result<(), KagentError> {
        self.push_store.delete(task_id, config_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::BoxStream;
    use kagent_persistence::{InMemoryPushConfigStore, InMemorySessionService, InMemoryTaskStore};
    use kagent_shared::model::{EventContent, EventPart, FrameworkEvent, Role};
    use tokio_stream::StreamExt;

    use crate::executor::FrameworkError;

    struct OneShotText(String);

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
                    parts: vec![EventPart::Text { text: self.0.clone() }],
                },
                long_running_tool_ids: vec![],
                error_code: None,
            };
            Ok(Box::pin(futures::stream::iter(vec![Ok(event)])))
        }
    }

    fn manager(framework: OneShotText) -> TaskManager<OneShotText> {
        TaskManager::new(
            framework,
            Arc::new(InMemoryTaskStore::default()),
            Arc::new(InMemoryPushConfigStore::default()),
            Arc::new(InMemorySessionService::default()),
            "kagent",
        )
    }

    #[tokio::test]
    async fn on_send_message_returns_completed_task_with_history() {
        let manager = manager(OneShotText("hello".to_string()));
        let task = manager
            .on_send_message(Message::user_text("hi"), "u1")
            .await
            .expect("send message");
        assert_eq!(task.status.state, TaskState::Completed);
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].text_concat(), "hello");
    }

    #[tokio::test]
    async fn on_get_task_returns_none_for_unknown_id() {
        let manager = manager(OneShotText("hello".to_string()));
        assert!(manager.on_get_task("missing").await.expect("get task").is_none());
    }

    #[tokio::test]
    async fn on_cancel_task_deletes_the_task_and_returns_the_last_snapshot() {
        let manager = manager(OneShotText("hello".to_string()));
        let task = manager
            .on_send_message(Message::user_text("hi"), "u1")
            .await
            .expect("send message");
        let canceled = manager.on_cancel_task(&task.id).await.expect("cancel task");
        assert_eq!(canceled.status.state, TaskState::Canceled);
        assert!(manager.on_get_task(&task.id).await.expect("get task").is_none());
    }

    #[tokio::test]
    async fn on_send_message_stream_yields_completed_status_event() {
        let manager = manager(OneShotText("hello".to_string()));
        let mut stream = manager
            .on_send_message_stream(Message::user_text("hi"), "u1")
            .await
            .expect("stream");

        let mut saw_completed = false;
        while let Some(event) = stream.next().await {
            if let A2aStreamEvent::StatusUpdate(update) = &event {
                if update.status.state == TaskState::Completed {
                    saw_completed = true;
                }
            }
        }
        assert!(saw_completed);
    }

    #[tokio::test]
    async fn denying_a_paused_task_cancels_without_reinvoking_framework() {
        let store = Arc::new(InMemoryTaskStore::default());
        let mut paused = Task::new("t1", "c1");
        paused.status = TaskStatus::new(TaskState::InputRequired);
        store.save(&paused).await.expect("seed task");

        let manager = TaskManager::new(
            OneShotText("should not run".to_string()),
            store,
            Arc::new(InMemoryPushConfigStore::default()),
            Arc::new(InMemorySessionService::default()),
            "kagent",
        );

        let mut reply = Message::user_text("no, cancel that");
        reply.task_id = Some("t1".to_string());
        reply.context_id = Some("c1".to_string());

        let task = manager.on_send_message(reply, "u1").await.expect("send message");
        assert_eq!(task.status.state, TaskState::Canceled);
    }
}
