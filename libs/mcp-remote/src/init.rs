//! Remote toolset initialization (spec §4.5): connects to every configured
//! remote MCP server, applies the init timeout and tool allow-set, and
//! treats one server's failure as non-fatal to the rest.

use async_trait::async_trait;
use kagent_shared::error::KagentError;
use tracing::warn;

use crate::config::RemoteServerConfig;
use crate::timeout::effective_init_timeout;
use crate::tls::build_http_client;
use crate::tools::is_allowed;

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteServerOutcome {
    Ready { name: String, tool_names: Vec<String> },
    Unavailable { name: String, reason: String },
}

/// The transport-specific half of initialization (SSE vs Streamable HTTP
/// connection and the MCP `initialize` handshake). Kept behind a trait so
/// this crate's policy logic — timeout, TLS, filtering, non-fatal
/// failure handling — is testable without a live MCP server.
#[async_trait]
pub trait RemoteServerConnector: Send + Sync {
    async fn connect_and_list_tools(
        &self,
        config: &RemoteServerConfig,
        http: reqwest::Client,
    ) -> Result<Vec<String>, KagentError>;
}

pub async fn initialize_remote_toolsets(
    configs: &[RemoteServerConfig],
    connector: &dyn RemoteServerConnector,
) -> Vec<RemoteServerOutcome> {
    let mut outcomes = Vec::with_capacity(configs.len());

    for config in configs {
        let timeout = effective_init_timeout(config.init_timeout);

        let http = match build_http_client(&config.tls, &config.headers, &config.name) {
            Ok(http) => http,
            Err(error) => {
                warn!(server = %config.name, %error, "failed to build TLS client for remote MCP server");
                outcomes.push(RemoteServerOutcome::Unavailable {
                    name: config.name.clone(),
                    reason: error.to_string(),
                });
                continue;
            }
        };

        match tokio::time::timeout(timeout, connector.connect_and_list_tools(config, http)).await {
            Ok(Ok(tool_names)) => {
                let filtered = tool_names
                    .into_iter()
                    .filter(|name| is_allowed(name, &config.allowed_tools))
                    .collect();
                outcomes.push(RemoteServerOutcome::Ready {
                    name: config.name.clone(),
                    tool_names: filtered,
                });
            }
            Ok(Err(error)) => {
                warn!(server = %config.name, %error, "remote MCP server unavailable");
                outcomes.push(RemoteServerOutcome::Unavailable {
                    name: config.name.clone(),
                    reason: error.to_string(),
                });
            }
            Err(_) => {
                warn!(server = %config.name, ?timeout, "remote MCP server initialization timed out");
                outcomes.push(RemoteServerOutcome::Unavailable {
                    name: config.name.clone(),
                    reason: "initialization timed out".to_string(),
                });
            }
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{TlsPolicy, TransportKind};

    fn config(name: &str, init_timeout: Duration, allowed_tools: Option<Vec<String>>) -> RemoteServerConfig {
        RemoteServerConfig {
            name: name.to_string(),
            transport: TransportKind::StreamableHttp,
            url: "https://example.com/mcp".to_string(),
            tls: TlsPolicy::SystemPool,
            headers: vec![],
            allowed_tools,
            init_timeout,
        }
    }

    struct ScriptedConnector {
        outcomes: std::collections::HashMap<String, ConnectorScript>,
    }

    enum ConnectorScript {
        Tools(Vec<String>),
        Fails,
        Hangs,
    }

    #[async_trait]
    impl RemoteServerConnector for ScriptedConnector {
        async fn connect_and_list_tools(
            &self,
            config: &RemoteServerConfig,
            _http: reqwest::Client,
        ) -> Result<Vec<String>, KagentError> {
            match self.outcomes.get(&config.name) {
                Some(ConnectorScript::Tools(names)) => Ok(names.clone()),
                Some(ConnectorScript::Fails) => Err(KagentError::transient(std::io::Error::other("connection refused"))),
                Some(ConnectorScript::Hangs) | None => {
                    tokio::time::sleep(Duration::from_secs(10_000)).await;
                    unreachable!("test clock should have timed out the caller first")
                }
            }
        }
    }

    #[tokio::test]
    async fn ready_server_filters_tools_by_allow_set() {
        let connector = ScriptedConnector {
            outcomes: [(
                "search-server".to_string(),
                ConnectorScript::Tools(vec!["search".to_string(), "delete".to_string()]),
            )]
            .into_iter()
            .collect(),
        };
        let configs = vec![config(
            "search-server",
            Duration::from_secs(150),
            Some(vec!["search".to_string()]),
        )];

        let outcomes = initialize_remote_toolsets(&configs, &connector).await;
        assert_eq!(
            outcomes,
            vec![RemoteServerOutcome::Ready {
                name: "search-server".to_string(),
                tool_names: vec!["search".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn one_server_failing_does_not_stop_the_others() {
        let connector = ScriptedConnector {
            outcomes: [
                ("broken".to_string(), ConnectorScript::Fails),
                ("healthy".to_string(), ConnectorScript::Tools(vec!["ping".to_string()])),
            ]
            .into_iter()
            .collect(),
        };
        let configs = vec![
            config("broken", Duration::from_secs(150), None),
            config("healthy", Duration::from_secs(150), None),
        ];

        let outcomes = initialize_remote_toolsets(&configs, &connector).await;
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], RemoteServerOutcome::Unavailable { .. }));
        assert!(matches!(outcomes[1], RemoteServerOutcome::Ready { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_connector_times_out_at_the_clamped_ceiling() {
        let connector = ScriptedConnector {
            outcomes: [("slow".to_string(), ConnectorScript::Hangs)].into_iter().collect(),
        };
        // Requests 1 hour; clamped down to the 5 minute ceiling (spec §4.5).
        let configs = vec![config("slow", Duration::from_secs(3600), None)];

        let outcomes = initialize_remote_toolsets(&configs, &connector).await;
        match &outcomes[0] {
            RemoteServerOutcome::Unavailable { name, reason } => {
                assert_eq!(name, "slow");
                assert!(reason.contains("timed out"));
            }
            _ => panic!("expected the hung server to time out"),
        }
    }
}
