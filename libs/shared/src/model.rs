//! Domain model shared by the A2A task manager, the MCP bridge, and the
//! persistence adapters (spec §3).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metadata;

pub type Metadata = HashMap<String, serde_json::Value>;

/// A Part variant, represented as a tagged union per spec §9 rather than any
/// form of dynamic dispatch on subclasses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Metadata>,
    },
    Data {
        data: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Metadata>,
    },
    File {
        file: FileRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<Metadata>,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            metadata: None,
        }
    }

    pub fn data(data: serde_json::Value) -> Self {
        Part::Data {
            data,
            metadata: None,
        }
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            Part::Text { metadata, .. } => metadata.as_ref(),
            Part::Data { metadata, .. } => metadata.as_ref(),
            Part::File { metadata, .. } => metadata.as_ref(),
        }
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Part::Text { metadata, .. } => metadata.get_or_insert_with(Metadata::new),
            Part::Data { metadata, .. } => metadata.get_or_insert_with(Metadata::new),
            Part::File { metadata, .. } => metadata.get_or_insert_with(Metadata::new),
        }
    }

    pub fn set_metadata(&mut self, key: &str, value: serde_json::Value) {
        self.metadata_mut().insert(key.to_string(), value);
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata().and_then(|m| m.get(key)).and_then(|v| v.as_str())
    }

    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata().and_then(|m| m.get(key)).and_then(|v| v.as_bool())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_data_type(&self, type_tag: &str) -> bool {
        matches!(self, Part::Data { .. }) && self.metadata_str(metadata::KAGENT_TYPE) == Some(type_tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: Option<String>,
    pub mime_type: Option<String>,
    /// Exactly one of `uri`/`bytes` is populated; not a Non-goal of this
    /// spec to resolve file storage, so both are optional pass-through
    /// fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "Uuid::new_v4")]
    pub message_id: Uuid,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub role: Role,
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

fn default_kind() -> String {
    "message".to_string()
}

impl Message {
    pub fn new(role: Role, parts: Vec<Part>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            kind: default_kind(),
            role,
            parts,
            task_id: None,
            context_id: None,
            metadata: None,
        }
    }

    pub fn agent(parts: Vec<Part>) -> Self {
        Self::new(Role::Agent, parts)
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![Part::text(text)])
    }

    pub fn metadata_bool(&self, key: &str) -> Option<bool> {
        self.metadata.as_ref().and_then(|m| m.get(key)).and_then(|v| v.as_bool())
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.get(key)).and_then(|v| v.as_str())
    }

    pub fn set_metadata(&mut self, key: &str, value: serde_json::Value) {
        self.metadata.get_or_insert_with(Metadata::new).insert(key.to_string(), value);
    }

    /// Whether this message is an ADK-style streaming fragment that must
    /// never be persisted into `Task.history` (spec §4.3, §8 invariant).
    pub fn is_partial(&self) -> bool {
        self.metadata_bool(metadata::ADK_PARTIAL).unwrap_or(false)
    }

    pub fn text_concat(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.as_text())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    AuthRequired,
    Completed,
    Failed,
    Canceled,
}

impl TaskState {
    /// Terminal states per spec §3: `completed | failed | canceled`.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed | TaskState::Canceled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Working => "working",
            TaskState::InputRequired => "input_required",
            TaskState::AuthRequired => "auth_required",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl TaskStatus {
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            message: None,
            timestamp: Some(Utc::now()),
        }
    }

    pub fn with_message(state: TaskState, message: Message) -> Self {
        Self {
            state,
            message: Some(message),
            timestamp: Some(Utc::now()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub parts: Vec<Part>,
}

/// Identity = task_id (globally unique). spec §3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Task {
    pub fn new(id: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            context_id: context_id.into(),
            status: TaskStatus::new(TaskState::Submitted),
            history: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Removes any history message whose metadata carries
    /// `adk_partial=true` (spec §4.4 partial-event filter, §8 invariant).
    pub fn scrub_partial_history(&mut self) {
        self.history.retain(|m| !m.is_partial());
    }
}

/// Events events produced by the agent framework (spec §3). Deliberately
/// framework-agnostic: concrete runtimes (ADK/LangGraph/OpenAI
/// Agents/CrewAI) map their native shapes into this before the Event
/// Converter runs (spec §9).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkEvent {
    pub invocation_id: String,
    pub author: String,
    #[serde(default)]
    pub partial: bool,
    pub content: EventContent,
    #[serde(default)]
    pub long_running_tool_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventContent {
    #[serde(default)]
    pub parts: Vec<EventPart>,
}

/// A framework-level content part, richer than the A2A `Part` the converter
/// ultimately emits (spec §4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPart {
    Text {
        text: String,
    },
    FunctionCall {
        id: String,
        name: String,
        #[serde(default)]
        args: serde_json::Value,
    },
    FunctionResponse {
        id: String,
        name: String,
        #[serde(default)]
        response: serde_json::Value,
    },
    ExecutableCode {
        code: String,
        #[serde(default)]
        language: Option<String>,
    },
    CodeExecutionResult {
        outcome: String,
        #[serde(default)]
        output: Option<String>,
    },
    File {
        file: FileRef,
    },
}

/// Session identity = (app_name, user_id, session_id) (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionId {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    #[serde(default)]
    pub events: Vec<FrameworkEvent>,
    #[serde(default)]
    pub state: HashMap<String, serde_json::Value>,
}

impl Session {
    pub fn new(app_name: impl Into<String>, user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
            events: Vec::new(),
            state: HashMap::new(),
        }
    }
}

/// Per-task webhook subscription (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    pub task_id: String,
    pub config_id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub authentication: Option<Metadata>,
}

/// A long-running function_call surfaced by the Event Converter for human
/// approval (spec §3). Not stored by the core; carried as a composite
/// message in the A2A stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolApprovalRequest {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(TaskState::Canceled.is_terminal());
        assert!(!TaskState::Working.is_terminal());
        assert!(!TaskState::Submitted.is_terminal());
        assert!(!TaskState::InputRequired.is_terminal());
    }

    #[test]
    fn task_state_serializes_snake_case() {
        let v = serde_json::to_value(TaskState::InputRequired).expect("serializes");
        assert_eq!(v, serde_json::json!("input_required"));
    }

    #[test]
    fn scrub_partial_history_removes_flagged_messages() {
        let mut task = Task::new("t1", "c1");
        let mut partial = Message::agent(vec![Part::text("Hel")]);
        partial.set_metadata(metadata::ADK_PARTIAL, serde_json::json!(true));
        task.history.push(partial);
        task.history.push(Message::agent(vec![Part::text("Hello")]));

        task.scrub_partial_history();

        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].text_concat(), "Hello");
    }

    #[test]
    fn part_metadata_round_trips_through_json() {
        let mut part = Part::data(serde_json::json!({"q": "x"}));
        part.set_metadata(metadata::KAGENT_TYPE, serde_json::json!(metadata::TYPE_FUNCTION_CALL));
        let encoded = serde_json::to_string(&part).expect("serializes");
        let decoded: Part = serde_json::from_str(&encoded).expect("deserializes");
        assert!(decoded.is_data_type(metadata::TYPE_FUNCTION_CALL));
    }
}
