//! Event Converter (spec §4.3): maps one framework event into zero or more
//! A2A stream events.

use kagent_shared::metadata;
use kagent_shared::model::{EventPart, FrameworkEvent, Message, Part, TaskState, TaskStatus, ToolApprovalRequest};

use crate::event::{A2aStreamEvent, TaskStatusUpdateEvent};
use crate::hitl::build_approval_request_message;

#[derive(Debug, Clone)]
pub struct EventContext {
    pub task_id: String,
    pub context_id: String,
    pub app_name: String,
    pub user_id: String,
}

const REQUEST_EUC: &str = "request_euc";

fn convert_part(part: &EventPart) -> Part {
    match part {
        EventPart::Text { text } => Part::text(text.clone()),
        EventPart::FunctionCall { id, name, args } => {
            let mut part = Part::data(serde_json::json!({
                "id": id,
                "name": name,
                "args": args,
            }));
            part.set_metadata(metadata::KAGENT_TYPE, serde_json::json!(metadata::TYPE_FUNCTION_CALL));
            part
        }
        EventPart::FunctionResponse { id, name, response } => {
            let mut part = Part::data(serde_json::json!({
                "id": id,
                "name": name,
                "response": response,
            }));
            part.set_metadata(
                metadata::KAGENT_TYPE,
                serde_json::json!(metadata::TYPE_FUNCTION_RESPONSE),
            );
            part
        }
        EventPart::ExecutableCode { code, language } => {
            let mut part = Part::data(serde_json::json!({
                "code": code,
                "language": language,
            }));
            part.set_metadata(
                metadata::KAGENT_TYPE,
                serde_json::json!(metadata::TYPE_EXECUTABLE_CODE),
            );
            part
        }
        EventPart::CodeExecutionResult { outcome, output } => {
            let mut part = Part::data(serde_json::json!({
                "outcome": outcome,
                "output": output,
            }));
            part.set_metadata(
                metadata::KAGENT_TYPE,
                serde_json::json!(metadata::TYPE_CODE_EXECUTION_RESULT),
            );
            part
        }
        EventPart::File { file } => Part::File {
            file: file.clone(),
            metadata: None,
        },
    }
}

fn function_call_id(part: &EventPart) -> Option<&str> {
    match part {
        EventPart::FunctionCall { id, .. } => Some(id.as_str()),
        _ => None,
    }
}

fn function_call_name(part: &EventPart) -> Option<&str> {
    match part {
        EventPart::FunctionCall { name, .. } => Some(name.as_str()),
        _ => None,
    }
}

/// Converts one framework event into zero or more A2A stream events. An
/// event with no parts (fallback: `event.content.parts` is the only source
/// modeled here, matching the framework-agnostic shape in spec §3) produces
/// no events at all.
pub fn convert_event(event: &FrameworkEvent, ctx: &EventContext) -> Vec<A2aStreamEvent> {
    if event.content.parts.is_empty() {
        return Vec::new();
    }

    let mut long_running_name: Option<&str> = None;
    let mut approval_requests: Vec<ToolApprovalRequest> = Vec::new();
    let mut parts = Vec::with_capacity(event.content.parts.len());

    for raw in &event.content.parts {
        let mut converted = convert_part(raw);
        if let Some(id) = function_call_id(raw) {
            if event.long_running_tool_ids.iter().any(|t| t == id) {
                converted.set_metadata(metadata::KAGENT_IS_LONG_RUNNING, serde_json::json!(true));
                long_running_name = function_call_name(raw);
                if let EventPart::FunctionCall { name, args, .. } = raw {
                    approval_requests.push(ToolApprovalRequest {
                        name: name.clone(),
                        args: args.clone(),
                        id: Some(id.to_string()),
                    });
                }
            }
        }
        parts.push(converted);
    }

    let state = match long_running_name {
        Some(name) if name == REQUEST_EUC => TaskState::AuthRequired,
        Some(_) => TaskState::InputRequired,
        None => TaskState::Working,
    };

    // A long-running function_call is surfaced as the composite
    // approval-request Message (spec §3's ToolApprovalRequest: "emitted into
    // the A2A stream as a composite Message"), not the plain tagged parts.
    let mut message = if approval_requests.is_empty() {
        Message::agent(parts)
    } else {
        build_approval_request_message(&approval_requests)
    };
    message.context_id = Some(ctx.context_id.clone());
    message.task_id = Some(ctx.task_id.clone());
    if event.partial {
        message.set_metadata(metadata::ADK_PARTIAL, serde_json::json!(true));
    }

    let mut status_metadata = kagent_shared::model::Metadata::new();
    status_metadata.insert(
        metadata::KAGENT_APP_NAME.to_string(),
        serde_json::json!(ctx.app_name),
    );
    status_metadata.insert(
        metadata::KAGENT_USER_ID.to_string(),
        serde_json::json!(ctx.user_id),
    );
    status_metadata.insert(
        metadata::KAGENT_SESSION_ID.to_string(),
        serde_json::json!(ctx.context_id),
    );
    if !event.author.is_empty() {
        status_metadata.insert(
            metadata::KAGENT_AUTHOR.to_string(),
            serde_json::json!(event.author),
        );
    }
    if !event.invocation_id.is_empty() {
        status_metadata.insert(
            metadata::KAGENT_INVOCATION_ID.to_string(),
            serde_json::json!(event.invocation_id),
        );
    }

    vec![A2aStreamEvent::StatusUpdate(TaskStatusUpdateEvent {
        task_id: ctx.task_id.clone(),
        context_id: ctx.context_id.clone(),
        status: TaskStatus::with_message(state, message),
        metadata: Some(status_metadata),
        is_final: false,
    })]
}
