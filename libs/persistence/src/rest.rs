//! REST-backed persistence adapters (spec §4.8), following the client
//! construction style of the teacher's API client: one shared
//! `reqwest::Client`, a base URL, and an optional bearer token attached to
//! every request.

use async_trait::async_trait;
use kagent_shared::error::KagentError;
use kagent_shared::model::{FrameworkEvent, PushConfig, Session, Task};
use reqwest::{Client, StatusCode};
use tracing::warn;

use crate::session_events::parse_stored_event;
use crate::traits::{PushConfigStore, SessionService, TaskStore};

#[derive(Clone)]
pub struct RestClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl RestClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>, KagentError> {
        let response = self
            .request(reqwest::Method::GET, path)
            .send()
            .await
            .map_err(KagentError::transient)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status().map_err(KagentError::transient)?;
        let body = response.json::<T>().await.map_err(KagentError::transient)?;
        Ok(Some(body))
    }
}

#[derive(Clone)]
pub struct RestTaskStore {
    client: RestClient,
}

impl RestTaskStore {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskStore for RestTaskStore {
    async fn save(&self, task: &Task) -> Result<(), KagentError> {
        self.client
            .request(reqwest::Method::PUT, &format!("/tasks/{}", task.id))
            .json(task)
            .send()
            .await
            .map_err(KagentError::transient)?
            .error_for_status()
            .map_err(KagentError::transient)?;
        Ok(())
    }

    async fn get(&self, task_id: &str) -> Result<Option<Task>, KagentError> {
        self.client.get_optional(&format!("/tasks/{task_id}")).await
    }

    async fn delete(&self, task_id: &str) -> Result<(), KagentError> {
        let response = self
            .client
            .request(reqwest::Method::DELETE, &format!("/tasks/{task_id}"))
            .send()
            .await
            .map_err(KagentError::transient)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response.error_for_status().map_err(KagentError::transient)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct RestPushConfigStore {
    client: RestClient,
}

impl RestPushConfigStore {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PushConfigStore for RestPushConfigStore {
    async fn save(&self, config: &PushConfig) -> Result<(), KagentError> {
        self.client
            .request(
                reqwest::Method::PUT,
                &format!("/tasks/{}/pushNotificationConfigs/{}", config.task_id, config.config_id),
            )
            .json(config)
            .send()
            .await
            .map_err(KagentError::transient)?
            .error_for_status()
            .map_err(KagentError::transient)?;
        Ok(())
    }

    async fn get(&self, task_id: &str, config_id: &str) -> Result<Option<PushConfig>, KagentError> {
        self.client
            .get_optional(&format!("/tasks/{task_id}/pushNotificationConfigs/{config_id}"))
            .await
    }

    async fn list(&self, task_id: &str) -> Result<Vec<PushConfig>, KagentError> {
        Ok(self
            .client
            .get_optional(&format!("/tasks/{task_id}/pushNotificationConfigs"))
            .await?
            .unwrap_or_default())
    }

    async fn delete(&self, task_id: &str, config_id: &str) -> Result<(), KagentError> {
        let response = self
            .client
            .request(
                reqwest::Method::DELETE,
                &format!("/tasks/{task_id}/pushNotificationConfigs/{config_id}"),
            )
            .send()
            .await
            .map_err(KagentError::transient)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response.error_for_status().map_err(KagentError::transient)?;
        Ok(())
    }

    async fn delete_all(&self, task_id: &str) -> Result<(), KagentError> {
        let response = self
            .client
            .request(reqwest::Method::DELETE, &format!("/tasks/{task_id}/pushNotificationConfigs"))
            .send()
            .await
            .map_err(KagentError::transient)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response.error_for_status().map_err(KagentError::transient)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct RestSessionService {
    client: RestClient,
}

impl RestSessionService {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    fn session_path(app_name: &str, user_id: &str, session_id: &str) -> String {
        format!("/apps/{app_name}/users/{user_id}/sessions/{session_id}")
    }
}

#[async_trait]
impl SessionService for RestSessionService {
    async fn create(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<Session, KagentError> {
        let session = Session::new(app_name, user_id, session_id);
        self.client
            .request(reqwest::Method::POST, &Self::session_path(app_name, user_id, session_id))
            .json(&session)
            .send()
            .await
            .map_err(KagentError::transient)?
            .error_for_status()
            .map_err(KagentError::transient)?;
        Ok(session)
    }

    async fn get(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<Option<Session>, KagentError> {
        let raw: Option<serde_json::Value> = self
            .client
            .get_optional(&Self::session_path(app_name, user_id, session_id))
            .await?;
        let Some(mut raw) = raw else {
            return Ok(None);
        };

        // Normalize the stored event list (spec §4.8 session-event parsing
        // on get): already-typed events pass through, map/string events are
        // decoded, malformed events are skipped with a logged preview.
        if let Some(events) = raw.get_mut("events").and_then(|v| v.as_array_mut()) {
            let parsed: Vec<FrameworkEvent> = std::mem::take(events)
                .into_iter()
                .filter_map(parse_stored_event)
                .collect();
            raw["events"] = serde_json::to_value(parsed).map_err(KagentError::transient)?;
        }

        let session: Session = serde_json::from_value(raw).map_err(KagentError::transient)?;
        Ok(Some(session))
    }

    async fn list(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>, KagentError> {
        Ok(self
            .client
            .get_optional(&format!("/apps/{app_name}/users/{user_id}/sessions"))
            .await?
            .unwrap_or_default())
    }

    async fn delete(&self, app_name: &str, user_id: &str, session_id: &str) -> Result<(), KagentError> {
        let response = self
            .client
            .request(reqwest::Method::DELETE, &Self::session_path(app_name, user_id, session_id))
            .send()
            .await
            .map_err(KagentError::transient)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        response.error_for_status().map_err(KagentError::transient)?;
        Ok(())
    }

    async fn append_event(&self, app_name: &str, user_id: &str, session_id: &str, event: FrameworkEvent) {
        let path = format!("{}/events", Self::session_path(app_name, user_id, session_id));
        let detached = self.client.clone();
        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            async move {
                detached
                    .request(reqwest::Method::POST, &path)
                    .json(&event)
                    .send()
                    .await
            },
        )
        .await;

        match outcome {
            Ok(Ok(response)) if response.status().is_success() => {}
            Ok(Ok(response)) => warn!(status = %response.status(), "append_event rejected by session store"),
            Ok(Err(error)) => warn!(%error, "append_event request failed"),
            Err(_) => warn!("append_event timed out after 30s (best-effort)"),
        }
    }
}
