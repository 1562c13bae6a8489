//! A2A protocol-level stream events (spec §4.3, §6).

use kagent_shared::model::{Artifact, Message, TaskStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusUpdateEvent {
    pub task_id: String,
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<kagent_shared::model::Metadata>,
    #[serde(default)]
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskArtifactUpdateEvent {
    pub task_id: String,
    pub context_id: String,
    pub artifact: Artifact,
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub last_chunk: bool,
}

/// The union of events the Task-Saving Event Queue and the streaming
/// channel carry (spec §4.2–§4.4). `Message` appears only on the
/// resubscribe-replay path (spec §9 design note — `StreamingMessageEvent`
/// wrapping raw history messages, not normal status events).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_kind", rename_all = "snake_case")]
pub enum A2aStreamEvent {
    StatusUpdate(TaskStatusUpdateEvent),
    ArtifactUpdate(TaskArtifactUpdateEvent),
    Message(Message),
}

impl A2aStreamEvent {
    pub fn is_final_status(&self) -> bool {
        matches!(self, A2aStreamEvent::StatusUpdate(e) if e.is_final)
    }
}
