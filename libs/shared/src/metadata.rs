//! Well-known `kagent_`-prefixed metadata keys carried on `Part::metadata`
//! maps (spec §3). Centralised so the converter, the task-saving queue, and
//! the MCP bridge never repeat the string literals.

pub const KAGENT_TYPE: &str = "kagent_type";
pub const KAGENT_SESSION_ID: &str = "kagent_session_id";
pub const KAGENT_IS_LONG_RUNNING: &str = "kagent_is_long_running";
pub const KAGENT_USER_ID: &str = "kagent_user_id";
pub const KAGENT_AUTHOR: &str = "kagent_author";
pub const KAGENT_INVOCATION_ID: &str = "kagent_invocation_id";
pub const KAGENT_ERROR_CODE: &str = "kagent_error_code";
pub const KAGENT_APP_NAME: &str = "kagent_app_name";

/// `kagent_type` tag values.
pub const TYPE_FUNCTION_CALL: &str = "function_call";
pub const TYPE_FUNCTION_RESPONSE: &str = "function_response";
pub const TYPE_EXECUTABLE_CODE: &str = "executable_code";
pub const TYPE_CODE_EXECUTION_RESULT: &str = "code_execution_result";
pub const TYPE_INTERRUPT_DATA: &str = "interrupt_data";

/// Non-`kagent_`-prefixed metadata keys the context-id resolver (§4.1) and
/// the ADK-shaped partial-event flag (§4.3) also need to recognize.
pub const CONTEXT_ID_CAMEL: &str = "contextId";
pub const CONTEXT_ID_SNAKE: &str = "context_id";
pub const ADK_PARTIAL: &str = "adk_partial";
