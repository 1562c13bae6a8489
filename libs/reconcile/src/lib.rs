//! Reconciliation envelope (spec §4.9): converts a reconciler's inner
//! `Result` into the three outcomes a Kubernetes controller-runtime loop
//! understands — no-retry, retry-with-backoff, requeue-after — without this
//! crate taking on a `kube-rs` dependency itself. The actual controller loop
//! (watch, informer, client) lives outside this repo's scope; this crate is
//! the pure decision function it calls per reconcile pass.

use std::time::Duration;

use kagent_shared::error::KagentError;
use tracing::{info, warn};

/// Resources reconciled under this envelope. Only `McpServer` carries a
/// periodic refresh (spec §4.9); everything else settles once and waits for
/// the next watch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    McpServer,
    Agent,
    Team,
    ModelConfig,
}

impl ResourceKind {
    fn success_requeue(self) -> Option<Duration> {
        match self {
            ResourceKind::McpServer => Some(Duration::from_secs(60)),
            ResourceKind::Agent | ResourceKind::Team | ResourceKind::ModelConfig => None,
        }
    }
}

/// What the controller-runtime loop should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub requeue_after: Option<Duration>,
}

impl ReconcileOutcome {
    fn none() -> Self {
        Self { requeue_after: None }
    }
}

/// Wraps one reconcile pass. `result` is whatever the reconciler's body
/// produced, including any outer wrapping (`anyhow::Context`, a `#[source]`
/// chain) applied on the way back up — `KagentError::find_validation` walks
/// that chain, so validation errors stay detectable after wrapping.
///
/// - `Ok(())` → success: `McpServer` requeues after 60s, everything else
///   settles with no requeue.
/// - `Err` whose chain contains a `Validation` → collapsed to `Ok` with no
///   requeue (the controller-runtime convention for "don't retry this").
/// - Any other `Err` → returned verbatim, so the caller's backoff policy
///   retries it.
pub fn reconcile_envelope<E>(kind: ResourceKind, result: Result<(), E>) -> Result<ReconcileOutcome, E>
where
    E: std::error::Error + 'static,
{
    match result {
        Ok(()) => {
            let requeue_after = kind.success_requeue();
            info!(?kind, ?requeue_after, "reconcile succeeded");
            Ok(ReconcileOutcome { requeue_after })
        }
        Err(error) => {
            if let Some(message) = KagentError::find_validation(&error) {
                warn!(?kind, %message, "reconcile hit a validation error, not retrying");
                Ok(ReconcileOutcome::none())
            } else {
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("wrapped: {0}")]
    struct Wrapped(#[source] KagentError);

    #[test]
    fn success_on_mcp_server_requeues_after_sixty_seconds() {
        let outcome = reconcile_envelope(ResourceKind::McpServer, Ok::<(), KagentError>(())).unwrap();
        assert_eq!(outcome.requeue_after, Some(Duration::from_secs(60)));
    }

    #[test]
    fn success_on_agent_does_not_requeue() {
        let outcome = reconcile_envelope(ResourceKind::Agent, Ok::<(), KagentError>(())).unwrap();
        assert_eq!(outcome.requeue_after, None);
    }

    #[test]
    fn validation_error_collapses_to_ok_with_no_requeue() {
        let err = KagentError::validation("cannot determine port for MCP server s1");
        let outcome = reconcile_envelope(ResourceKind::McpServer, Err(err)).unwrap();
        assert_eq!(outcome.requeue_after, None);
    }

    #[test]
    fn validation_error_is_detected_through_a_wrapped_chain() {
        let inner = KagentError::validation("cannot determine port for MCP server s1");
        let wrapped = Wrapped(inner);
        let outcome = reconcile_envelope(ResourceKind::McpServer, Err(wrapped)).unwrap();
        assert_eq!(outcome.requeue_after, None);
    }

    #[test]
    fn transient_error_propagates_for_backoff_retry() {
        let err = KagentError::transient(std::io::Error::other("etcd unavailable"));
        let result = reconcile_envelope(ResourceKind::McpServer, Err(err));
        assert!(result.is_err());
    }
}
