//! JSON-RPC 2.0 error mapping for the A2A surface (spec §6).

use kagent_shared::error::KagentError;
use serde::Serialize;

/// Standard JSON-RPC 2.0 codes the spec calls out by name, plus the A2A
/// extension range (`-3200x`) for protocol-specific conditions.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

pub const TASK_NOT_FOUND: i64 = -32001;
pub const TASK_NOT_CANCELABLE: i64 = -32002;
pub const PUSH_NOTIFICATION_NOT_SUPPORTED: i64 = -32003;
pub const UNSUPPORTED_OPERATION: i64 = -32004;

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(TASK_NOT_FOUND, format!("task not found: {task_id}"))
    }

    pub fn task_not_cancelable(task_id: &str) -> Self {
        Self::new(TASK_NOT_CANCELABLE, format!("task {task_id} is already in a terminal state"))
    }
}

/// Maps the shared error taxonomy onto JSON-RPC error codes (spec §6, §7):
/// `Validation` is a client-caused invalid-params error, `NotFound` a
/// dedicated A2A extension code, `Transient`/`Execution` an opaque internal
/// error (the human-readable detail travels in `data`, never in a retryable
/// client-facing code).
pub fn from_kagent_error(error: &KagentError) -> JsonRpcError {
    match error {
        KagentError::Validation(msg) => JsonRpcError::new(INVALID_PARAMS, msg.clone()),
        KagentError::NotFound(msg) => JsonRpcError::new(TASK_NOT_FOUND, msg.clone()),
        KagentError::Transient(source) => {
            JsonRpcError::new(INTERNAL_ERROR, format!("transient failure: {source}"))
        }
        KagentError::Execution { code, message } => {
            let mut err = JsonRpcError::new(INTERNAL_ERROR, message.clone());
            err.data = Some(serde_json::json!({ "error_code": code }));
            err
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_invalid_params() {
        let err = from_kagent_error(&KagentError::validation("bad input"));
        assert_eq!(err.code, INVALID_PARAMS);
    }

    #[test]
    fn not_found_maps_to_task_not_found_extension_code() {
        let err = from_kagent_error(&KagentError::not_found("task t1"));
        assert_eq!(err.code, TASK_NOT_FOUND);
    }

    #[test]
    fn execution_error_carries_code_in_data() {
        let err = from_kagent_error(&KagentError::execution("RATE_LIMIT_EXCEEDED", "rate limited"));
        assert_eq!(err.code, INTERNAL_ERROR);
        assert_eq!(err.data.unwrap()["error_code"], serde_json::json!("RATE_LIMIT_EXCEEDED"));
    }

    #[test]
    fn transient_error_maps_to_internal_error() {
        let err = from_kagent_error(&KagentError::transient(std::io::Error::other("down")));
        assert_eq!(err.code, INTERNAL_ERROR);
    }
}
