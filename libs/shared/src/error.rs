/// The error taxonomy shared by every kagent runtime crate (spec §7).
///
/// Reconcilers and A2A/MCP handlers each recover only what they understand:
/// `NotFound` collapses to an `Option::None` at the domain boundary,
/// `Validation` never retries, `Transient` retries with backoff, and
/// `Execution` carries a framework-reported error code through to the A2A
/// stream as a non-final failed status event.
#[derive(Debug, thiserror::Error)]
pub enum KagentError {
    /// Inputs cannot possibly succeed; reconcilers must not retry these.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced resource does not exist. Callers that can express
    /// absence (session get, task get) should downgrade this to `None`
    /// rather than propagate it.
    #[error("not found: {0}")]
    NotFound(String),

    /// Network, storage, or backend unavailability. Safe to retry with
    /// backoff.
    #[error("transient error: {0}")]
    Transient(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A framework-reported failure carrying a known `error_code`.
    #[error("execution error [{code}]: {message}")]
    Execution { code: String, message: String },
}

impl KagentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn transient(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transient(Box::new(source))
    }

    pub fn execution(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Walks the error chain looking for a `Validation` variant. Used by the
    /// reconciliation envelope (§4.9) so that an outer `anyhow`/`fmt`-wrapped
    /// error still resolves to a no-retry outcome as long as the chain was
    /// preserved with `%w`-style wrapping (`#[source]` / `anyhow::Context`).
    pub fn find_validation(err: &(dyn std::error::Error + 'static)) -> Option<&str> {
        let mut cursor: Option<&(dyn std::error::Error + 'static)> = Some(err);
        while let Some(current) = cursor {
            if let Some(KagentError::Validation(msg)) = current.downcast_ref::<KagentError>() {
                return Some(msg.as_str());
            }
            cursor = current.source();
        }
        None
    }
}

/// Maps a framework `error_code` to a human-readable string using the static
/// table described in §4.2. Unknown codes return `None`, signalling that the
/// error should propagate unclassified rather than be emitted as a non-final
/// failed status event.
pub fn error_code_to_message(code: &str) -> Option<&'static str> {
    match code {
        "RESOURCE_EXHAUSTED" => Some("The agent ran out of resources to complete this request."),
        "CONTEXT_LENGTH_EXCEEDED" => {
            Some("The conversation is too long for the model to process.")
        }
        "RATE_LIMIT_EXCEEDED" => Some("The upstream model provider rate-limited this request."),
        "INVALID_ARGUMENT" => Some("The agent received an invalid argument for a tool call."),
        "PERMISSION_DENIED" => Some("The agent was denied permission to perform this action."),
        "UNAUTHENTICATED" => Some("The agent's credentials were rejected."),
        "DEADLINE_EXCEEDED" => Some("The agent did not respond within the allotted time."),
        "UNAVAILABLE" => Some("The upstream model provider is currently unavailable."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("wrapped: {0}")]
    struct Wrapped(#[source] KagentError);

    #[test]
    fn find_validation_through_direct_error() {
        let err = KagentError::validation("cannot determine port for MCP server s1");
        assert_eq!(
            KagentError::find_validation(&err),
            Some("cannot determine port for MCP server s1")
        );
    }

    #[test]
    fn find_validation_through_wrapped_chain() {
        let inner = KagentError::validation("cannot determine port for MCP server s1");
        let outer = Wrapped(inner);
        assert_eq!(
            KagentError::find_validation(&outer),
            Some("cannot determine port for MCP server s1")
        );
    }

    #[test]
    fn find_validation_absent_for_transient() {
        let err = KagentError::transient(std::io::Error::other("connection reset"));
        assert_eq!(KagentError::find_validation(&err), None);
    }

    #[test]
    fn known_error_code_maps_to_message() {
        assert!(error_code_to_message("RATE_LIMIT_EXCEEDED").is_some());
    }

    #[test]
    fn unknown_error_code_is_unclassified() {
        assert_eq!(error_code_to_message("SOME_NEW_CODE"), None);
    }
}
