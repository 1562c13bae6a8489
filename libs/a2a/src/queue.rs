//! Task-Saving Event Queue (spec §4.4): a write-through layer that reifies
//! streaming events into the canonical `Task`, filters partial fragments
//! before they reach durable storage, and fans out simultaneously to an
//! in-memory consumer and the persistence store.

use std::sync::Arc;

use async_trait::async_trait;
use kagent_persistence::TaskStore;
use kagent_shared::error::KagentError;
use kagent_shared::model::{Artifact, Message, Task};
use tokio::sync::{Mutex, mpsc};
use tracing::warn;

use crate::event::A2aStreamEvent;

const DETACHED_SAVE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// The sink a `TaskSavingEventQueue` wraps: either an in-memory list
/// (non-streaming `OnSendMessage`) or a bounded channel (streaming sends).
/// The executor never knows which backs it (spec §9).
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn enqueue(&self, event: A2aStreamEvent) -> Result<(), KagentError>;
}

#[derive(Clone, Default)]
pub struct ListSink {
    events: Arc<Mutex<Vec<A2aStreamEvent>>>,
}

impl ListSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn into_events(self) -> Vec<A2aStreamEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventSink for ListSink {
    async fn enqueue(&self, event: A2aStreamEvent) -> Result<(), KagentError> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

/// Buffer-0 rendezvous channel sink: the caller backpressures the framework
/// iterator rather than building an unbounded backlog (spec §5).
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<A2aStreamEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<A2aStreamEvent>) -> Self {
        Self { tx }
    }

    /// Creates a rendezvous channel pair, the buffer-0 strict backpressure
    /// model called for in spec §5.
    pub fn pair() -> (Self, mpsc::Receiver<A2aStreamEvent>) {
        let (tx, rx) = mpsc::channel(1);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn enqueue(&self, event: A2aStreamEvent) -> Result<(), KagentError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| KagentError::validation("event stream receiver dropped"))
    }
}

pub struct TaskSavingEventQueue<S: EventSink> {
    inner: S,
    store: Option<Arc<dyn TaskStore>>,
    task_id: String,
    context_id: String,
}

impl<S: EventSink> TaskSavingEventQueue<S> {
    pub fn new(inner: S, store: Option<Arc<dyn TaskStore>>, task_id: String, context_id: String) -> Self {
        Self {
            inner,
            store,
            task_id,
            context_id,
        }
    }

    /// Delivers the event to the live sink first, then (detached, best
    /// effort) applies it to the persisted `Task`. Persistence failures are
    /// logged only — the live stream must remain intact (spec §4.4, §7).
    pub async fn enqueue(&self, event: A2aStreamEvent) -> Result<(), KagentError> {
        self.inner.enqueue(event.clone()).await?;

        if let Some(store) = self.store.clone() {
            let task_id = self.task_id.clone();
            let context_id = self.context_id.clone();
            tokio::spawn(async move {
                let outcome = tokio::time::timeout(
                    DETACHED_SAVE_TIMEOUT,
                    persist_event(store.as_ref(), &task_id, &context_id, event),
                )
                .await;

                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => warn!(task_id = %task_id, %error, "failed to persist task event"),
                    Err(_) => warn!(task_id = %task_id, "persisting task event timed out after 30s"),
                }
            });
        }

        Ok(())
    }
}

async fn persist_event(
    store: &dyn TaskStore,
    task_id: &str,
    context_id: &str,
    event: A2aStreamEvent,
) -> Result<(), KagentError> {
    let mut task = store
        .get(task_id)
        .await?
        .unwrap_or_else(|| Task::new(task_id, context_id));

    apply_event_to_task(&mut task, &event);
    task.scrub_partial_history();

    store.save(&task).await
}

/// Reifies one stream event into the canonical `Task` object (spec §4.4).
pub fn apply_event_to_task(task: &mut Task, event: &A2aStreamEvent) {
    match event {
        A2aStreamEvent::StatusUpdate(update) => {
            task.status = update.status.clone();
            if let Some(message) = update.status.message.clone() {
                task.history.push(message);
            }
        }
        A2aStreamEvent::ArtifactUpdate(update) => {
            if !update.artifact.parts.is_empty() {
                task.history.push(Message::agent(update.artifact.parts.clone()));
                upsert_artifact(task, update.artifact.clone());
            }
        }
        A2aStreamEvent::Message(_) => {
            // Resubscribe-replay-only event shape (spec §9); never produced
            // on the live write path and so never applied to a task.
        }
    }
}

fn upsert_artifact(task: &mut Task, artifact: Artifact) {
    if let Some(existing) = task.artifacts.iter_mut().find(|a| a.artifact_id == artifact.artifact_id) {
        *existing = artifact;
    } else {
        task.artifacts.push(artifact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kagent_persistence::InMemoryTaskStore;
    use kagent_shared::model::{Role, TaskState, TaskStatus};

    use crate::event::TaskStatusUpdateEvent;

    fn status_event(state: TaskState, message: Option<Message>) -> A2aStreamEvent {
        A2aStreamEvent::StatusUpdate(TaskStatusUpdateEvent {
            task_id: "t1".to_string(),
            context_id: "c1".to_string(),
            status: TaskStatus {
                state,
                message,
                timestamp: None,
            },
            metadata: None,
            is_final: state.is_terminal(),
        })
    }

    #[tokio::test]
    async fn enqueue_delivers_to_inner_sink_even_without_store() {
        let sink = ListSink::new();
        let queue = TaskSavingEventQueue::new(sink.clone(), None, "t1".to_string(), "c1".to_string());
        queue
            .enqueue(status_event(TaskState::Working, None))
            .await
            .expect("enqueue");
        assert_eq!(sink.into_events().await.len(), 1);
    }

    #[tokio::test]
    async fn enqueue_persists_through_to_store() {
        let sink = ListSink::new();
        let store = Arc::new(InMemoryTaskStore::default());
        let queue = TaskSavingEventQueue::new(
            sink,
            Some(store.clone() as Arc<dyn TaskStore>),
            "t1".to_string(),
            "c1".to_string(),
        );

        let message = Message::agent(vec![kagent_shared::model::Part::text("Hello")]);
        queue
            .enqueue(status_event(TaskState::Completed, Some(message)))
            .await
            .expect("enqueue");

        // Persistence happens on a detached task; give it a tick to land.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let task = store.get("t1").await.expect("get").expect("task persisted");
        assert_eq!(task.status.state, TaskState::Completed);
        assert_eq!(task.history.len(), 1);
    }

    #[test]
    fn apply_status_update_sets_status_and_appends_history() {
        let mut task = Task::new("t1", "c1");
        let message = Message::agent(vec![kagent_shared::model::Part::text("Hello")]);
        apply_event_to_task(&mut task, &status_event(TaskState::Completed, Some(message)));
        assert_eq!(task.status.state, TaskState::Completed);
        assert_eq!(task.history.len(), 1);
    }

    #[test]
    fn apply_status_update_without_message_does_not_append_history() {
        let mut task = Task::new("t1", "c1");
        apply_event_to_task(&mut task, &status_event(TaskState::Working, None));
        assert!(task.history.is_empty());
    }

    #[test]
    fn apply_artifact_update_appends_agent_message_and_upserts_artifact() {
        let mut task = Task::new("t1", "c1");
        let artifact_event = A2aStreamEvent::ArtifactUpdate(crate::event::TaskArtifactUpdateEvent {
            task_id: "t1".to_string(),
            context_id: "c1".to_string(),
            artifact: Artifact {
                artifact_id: "a1".to_string(),
                name: None,
                parts: vec![kagent_shared::model::Part::text("result")],
            },
            append: false,
            last_chunk: true,
        });
        apply_event_to_task(&mut task, &artifact_event);
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].role, Role::Agent);
        assert_eq!(task.artifacts.len(), 1);
    }

    #[test]
    fn apply_artifact_update_with_empty_parts_is_a_no_op() {
        let mut task = Task::new("t1", "c1");
        let artifact_event = A2aStreamEvent::ArtifactUpdate(crate::event::TaskArtifactUpdateEvent {
            task_id: "t1".to_string(),
            context_id: "c1".to_string(),
            artifact: Artifact {
                artifact_id: "a1".to_string(),
                name: None,
                parts: vec![],
            },
            append: false,
            last_chunk: true,
        });
        apply_event_to_task(&mut task, &artifact_event);
        assert!(task.history.is_empty());
        assert!(task.artifacts.is_empty());
    }

    #[test]
    fn partial_filter_strips_flagged_messages_before_save() {
        let mut task = Task::new("t1", "c1");
        let mut partial = Message::agent(vec![kagent_shared::model::Part::text("Hel")]);
        partial.set_metadata(kagent_shared::metadata::ADK_PARTIAL, serde_json::json!(true));
        task.history.push(partial);
        task.scrub_partial_history();
        assert!(task.history.is_empty());
    }
}
