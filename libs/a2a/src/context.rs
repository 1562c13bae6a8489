//! Context-ID and task-ID resolution (spec §4.1, §8 testable property).

use kagent_shared::metadata;
use kagent_shared::model::Message;
use tracing::warn;
use uuid::Uuid;

/// Resolves the context id for an inbound message in priority order:
/// `message.context_id` > `metadata["kagent_session_id"]` >
/// `metadata["contextId"]`/`metadata["context_id"]` > a freshly generated
/// UUIDv4 (logged as a warning since UI correlation will be lost).
pub fn resolve_context_id(message: &Message) -> String {
    if let Some(context_id) = message.context_id.as_ref().filter(|c| !c.is_empty()) {
        return context_id.clone();
    }

    if let Some(session_id) = message.metadata_str(metadata::KAGENT_SESSION_ID) {
        if !session_id.is_empty() {
            return session_id.to_string();
        }
    }

    if let Some(context_id) = message
        .metadata_str(metadata::CONTEXT_ID_CAMEL)
        .or_else(|| message.metadata_str(metadata::CONTEXT_ID_SNAKE))
    {
        if !context_id.is_empty() {
            return context_id.to_string();
        }
    }

    let generated = Uuid::new_v4().to_string();
    warn!(
        context_id = %generated,
        "message carried no context id; generated a fresh one, UI correlation will be lost"
    );
    generated
}

/// Resolves the task id for an inbound message: `message.task_id` if
/// non-empty, otherwise a freshly generated UUIDv4 (spec §4.1).
pub fn resolve_task_id(message: &Message) -> String {
    message
        .task_id
        .as_ref()
        .filter(|t| !t.is_empty())
        .cloned()
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kagent_shared::model::{Part, Role};

    fn message_with_metadata(pairs: &[(&str, &str)]) -> Message {
        let mut m = Message::new(Role::User, vec![Part::text("hi")]);
        for (k, v) in pairs {
            m.set_metadata(k, serde_json::json!(v));
        }
        m
    }

    #[test]
    fn context_id_field_wins_over_everything() {
        let mut message = message_with_metadata(&[(metadata::KAGENT_SESSION_ID, "from-meta")]);
        message.context_id = Some("c1".to_string());
        assert_eq!(resolve_context_id(&message), "c1");
    }

    #[test]
    fn kagent_session_id_wins_over_context_id_aliases() {
        let message = message_with_metadata(&[
            (metadata::KAGENT_SESSION_ID, "from-kagent"),
            (metadata::CONTEXT_ID_CAMEL, "from-camel"),
        ]);
        assert_eq!(resolve_context_id(&message), "from-kagent");
    }

    #[test]
    fn context_id_camel_alias_used_when_kagent_session_id_absent() {
        let message = message_with_metadata(&[(metadata::CONTEXT_ID_CAMEL, "from-camel")]);
        assert_eq!(resolve_context_id(&message), "from-camel");
    }

    #[test]
    fn context_id_snake_alias_used_as_last_resort_metadata() {
        let message = message_with_metadata(&[(metadata::CONTEXT_ID_SNAKE, "from-snake")]);
        assert_eq!(resolve_context_id(&message), "from-snake");
    }

    #[test]
    fn fresh_uuid_generated_when_nothing_present() {
        let message = Message::new(Role::User, vec![Part::text("hi")]);
        let resolved = resolve_context_id(&message);
        assert!(Uuid::parse_str(&resolved).is_ok());
    }

    #[test]
    fn task_id_defaults_to_fresh_uuid() {
        let message = Message::new(Role::User, vec![Part::text("hi")]);
        assert!(Uuid::parse_str(&resolve_task_id(&message)).is_ok());
    }

    #[test]
    fn task_id_uses_explicit_field_when_present() {
        let mut message = Message::new(Role::User, vec![Part::text("hi")]);
        message.task_id = Some("t1".to_string());
        assert_eq!(resolve_task_id(&message), "t1");
    }
}
