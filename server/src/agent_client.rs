//! HTTP-based `AgentCaller` (spec §4.5): the MCP bridge never talks to a
//! local task manager directly. It reuses the exact A2A JSON-RPC surface
//! external clients use, POSTing `message/send` to
//! `{base_url}/a2a/{namespace}/{name}/`, the same way it would for an agent
//! running in a different process.

use async_trait::async_trait;
use kagent_mcp_bridge::{AgentCaller, AgentSummary};
use kagent_shared::error::KagentError;
use kagent_shared::model::{Message, Task, TaskState, TaskStatus};
use serde_json::json;

/// Where `list_agents` gets its answer from. A directory backed by the
/// Agent CRD's `accepted`/`deployment_ready` status lives in the
/// out-of-scope Kubernetes controller (same boundary `kagent-reconcile`
/// draws around the reconcile loop itself); this trait is what lets a
/// real directory be wired in without this crate depending on kube-rs.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<AgentSummary>, KagentError>;
}

pub struct StaticAgentDirectory {
    agents: Vec<AgentSummary>,
}

impl StaticAgentDirectory {
    pub fn new(agents: Vec<AgentSummary>) -> Self {
        Self { agents }
    }
}

#[async_trait]
impl AgentDirectory for StaticAgentDirectory {
    async fn list_agents(&self) -> Result<Vec<AgentSummary>, KagentError> {
        Ok(self.agents.clone())
    }
}

pub struct HttpAgentCaller<D> {
    client: reqwest::Client,
    base_url: String,
    directory: D,
}

impl<D: AgentDirectory> HttpAgentCaller<D> {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, directory: D) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            directory,
        }
    }

    fn agent_url(&self, namespace: &str, name: &str) -> String {
        format!("{}/a2a/{namespace}/{name}/", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl<D: AgentDirectory> AgentCaller for HttpAgentCaller<D> {
    async fn list_agents(&self) -> Result<Vec<AgentSummary>, KagentError> {
        self.directory.list_agents().await
    }

    async fn invoke_agent(&self, namespace: &str, name: &str, mut message: Message, context_id: &str) -> Result<Task, KagentError> {
        message.context_id = Some(context_id.to_string());
        let body = json!({
            "jsonrpc": "2.0",
            "id": uuid::Uuid::new_v4().to_string(),
            "method": "message/send",
            "params": { "message": message },
        });

        let response = self
            .client
            .post(self.agent_url(namespace, name))
            .json(&body)
            .send()
            .await
            .map_err(KagentError::transient)?
            .error_for_status()
            .map_err(KagentError::transient)?;

        let envelope: serde_json::Value = response.json().await.map_err(KagentError::transient)?;

        if let Some(error) = envelope.get("error").filter(|value| !value.is_null()) {
            return Err(KagentError::transient(std::io::Error::other(format!("agent returned error: {error}"))));
        }
        let result = envelope
            .get("result")
            .cloned()
            .ok_or_else(|| KagentError::transient(std::io::Error::other("agent response missing result")))?;

        task_from_result(result, context_id)
    }
}

/// Result of `message/send` is polymorphic in the A2A protocol: a Task for
/// an agent that reified one, or a bare Message for an agent that replied
/// synchronously. Either way the bridge needs a `Task` to hand back — a
/// bare Message is wrapped in a synthetic completed one.
fn task_from_result(result: serde_json::Value, context_id: &str) -> Result<Task, KagentError> {
    if let Ok(task) = serde_json::from_value::<Task>(result.clone()) {
        return Ok(task);
    }
    if let Ok(message) = serde_json::from_value::<Message>(result.clone()) {
        let mut task = Task::new(uuid::Uuid::new_v4().to_string(), context_id.to_string());
        task.status = TaskStatus::new(TaskState::Completed);
        task.status.message = Some(message);
        return Ok(task);
    }
    let mut task = Task::new(uuid::Uuid::new_v4().to_string(), context_id.to_string());
    task.status = TaskStatus::new(TaskState::Completed);
    task.status.message = Some(Message::agent(vec![kagent_shared::model::Part::text(result.to_string())]));
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_from_result_passes_a_task_shape_through() {
        let mut expected = Task::new("t1", "c1");
        expected.status = TaskStatus::new(TaskState::Completed);
        let value = serde_json::to_value(&expected).expect("serialize task");
        let task = task_from_result(value, "c1").expect("task");
        assert_eq!(task.id, "t1");
    }

    #[test]
    fn task_from_result_wraps_a_bare_message() {
        let message = Message::agent(vec![kagent_shared::model::Part::text("hi")]);
        let value = serde_json::to_value(&message).expect("serialize message");
        let task = task_from_result(value, "c1").expect("task");
        assert_eq!(task.status.state, TaskState::Completed);
        assert_eq!(task.status.message.expect("message").text_concat(), "hi");
    }

    #[test]
    fn task_from_result_falls_back_to_raw_json_text() {
        let value = json!({"unexpected": "shape"});
        let task = task_from_result(value, "c1").expect("task");
        assert!(task.status.message.expect("message").text_concat().contains("unexpected"));
    }
}
