//! In-memory persistence adapters: back the test suite and let the server
//! run with no external store configured (spec §4.8a).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kagent_shared::error::KagentError;
use kagent_shared::model::{FrameworkEvent, PushConfig, Session, Task};
use tokio::sync::RwLock;

use crate::traits::{PushConfigStore, SessionService, TaskStore};

#[derive(Default, Clone)]
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn save(&self, task: &Task) -> Result<(), KagentError> {
        self.tasks.write().await.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>, KagentError> {
        Ok(self.tasks.read().await.get(task_id).cloned())
    }

    async fn delete(&self, task_id: &str) -> Result<(), KagentError> {
        self.tasks.write().await.remove(task_id);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPushConfigStore {
    configs: Arc<RwLock<HashMap<String, Vec<PushConfig>>>>,
}

#[async_trait]
impl PushConfigStore for InMemoryPushConfigStore {
    async fn save(&self, config: &PushConfig) -> Result<(), KagentError> {
        let mut configs = self.configs.write().await;
        let entries = configs.entry(config.task_id.clone()).or_default();
        if let Some(existing) = entries.iter_mut().find(|c| c.config_id == config.config_id) {
            *existing = config.clone();
        } else {
            entries.push(config.clone());
        }
        Ok(())
    }

    async fn get(&self, task_id: &str, config_id: &str) -> Result<Option<PushConfig>, KagentError> {
        Ok(self
            .configs
            .read()
            .await
            .get(task_id)
            .and_then(|entries| entries.iter().find(|c| c.config_id == config_id).cloned()))
    }

    async fn list(&self, task_id: &str) -> Result<Vec<PushConfig>, KagentError> {
        Ok(self.configs.read().await.get(task_id).cloned().unwrap_or_default())
    }

    async fn delete(&self, task_id: &str, config_id: &str) -> Result<(), KagentError> {
        if let Some(entries) = self.configs.write().await.get_mut(task_id) {
            entries.retain(|c| c.config_id != config_id);
        }
        Ok(())
    }

    async fn delete_all(&self, task_id: &str) -> Result<(), KagentError> {
        self.configs.write().await.remove(task_id);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemorySessionService {
    sessions: Arc<RwLock<HashMap<(String, String, String), Session>>>,
}

#[async_trait]
impl SessionService for InMemorySessionService {
    async fn create(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<Session, KagentError> {
        let session = Session::new(app_name, user_id, session_id);
        self.sessions.write().await.insert(
            (app_name.to_string(), user_id.to_string(), session_id.to_string()),
            session.clone(),
        );
        Ok(session)
    }

    async fn get(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<Option<Session>, KagentError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(&(app_name.to_string(), user_id.to_string(), session_id.to_string()))
            .cloned())
    }

    async fn list(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>, KagentError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.app_name == app_name && s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<(), KagentError> {
        self.sessions
            .write()
            .await
            .remove(&(app_name.to_string(), user_id.to_string(), session_id.to_string()));
        Ok(())
    }

    async fn append_event(&self, app_name: &str, user_id: &str, session_id: &str, event: FrameworkEvent) {
        let key = (app_name.to_string(), user_id.to_string(), session_id.to_string());
        if let Some(session) = self.sessions.write().await.get_mut(&key) {
            session.events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kagent_shared::model::TaskState;

    #[tokio::test]
    async fn task_store_upsert_converges_on_latest_write() {
        let store = InMemoryTaskStore::default();
        let mut task = Task::new("t1", "c1");
        store.save(&task).await.expect("save");
        task.status.state = TaskState::Completed;
        store.save(&task).await.expect("save");

        let loaded = store.get("t1").await.expect("get").expect("present");
        assert_eq!(loaded.status.state, TaskState::Completed);
    }

    #[tokio::test]
    async fn missing_task_returns_none_not_error() {
        let store = InMemoryTaskStore::default();
        assert!(store.get("missing").await.expect("get ok").is_none());
    }

    #[tokio::test]
    async fn push_config_delete_all_clears_entries() {
        let store = InMemoryPushConfigStore::default();
        store
            .save(&PushConfig {
                task_id: "t1".to_string(),
                config_id: "c1".to_string(),
                url: "https://example.com".to_string(),
                token: None,
                authentication: None,
            })
            .await
            .expect("save");
        store.delete_all("t1").await.expect("delete_all");
        assert!(store.list("t1").await.expect("list").is_empty());
    }
}
