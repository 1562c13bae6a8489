//! Persistence adapter traits (spec §4.8). Implementations live behind a
//! REST surface (`rest.rs`) or in memory (`memory.rs`); neither the A2A
//! task manager nor the MCP bridge holds a lock across a network call —
//! they only depend on these trait objects.

use async_trait::async_trait;
use kagent_shared::error::KagentError;
use kagent_shared::model::{PushConfig, Session, Task};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Upsert keyed by `task.id`. Conflicting concurrent saves for the same
    /// task must converge without corrupting the document — no
    /// application-level lock is required (spec §4.4 idempotence).
    async fn save(&self, task: &Task) -> Result<(), KagentError>;

    /// Returns `Ok(None)` for a missing task rather than an error (spec
    /// §7 NotFound policy).
    async fn get(&self, task_id: &str) -> Result<Option<Task>, KagentError>;

    async fn delete(&self, task_id: &str) -> Result<(), KagentError>;
}

#[async_trait]
pub trait PushConfigStore: Send + Sync {
    async fn save(&self, config: &PushConfig) -> Result<(), KagentError>;

    async fn get(&self, task_id: &str, config_id: &str) -> Result<Option<PushConfig>, KagentError>;

    async fn list(&self, task_id: &str) -> Result<Vec<PushConfig>, KagentError>;

    async fn delete(&self, task_id: &str, config_id: &str) -> Result<(), KagentError>;

    /// Deletes every config for a task; called on task teardown (spec §3).
    async fn delete_all(&self, task_id: &str) -> Result<(), KagentError>;
}

#[async_trait]
pub trait SessionService: Send + Sync {
    async fn create(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<Session, KagentError>;

    async fn get(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<Option<Session>, KagentError>;

    async fn list(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>, KagentError>;

    async fn delete(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<(), KagentError>;

    /// Best-effort: attaches an event to a session with a detached 30s
    /// timeout (spec §4.8). Failures are logged by the implementation, not
    /// propagated, since the live turn must not stall on session history
    /// bookkeeping.
    async fn append_event(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
        event: kagent_shared::model::FrameworkEvent,
    );
}
