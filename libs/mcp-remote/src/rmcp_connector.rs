//! The one place in this crate that speaks `rmcp` directly (spec §4.5):
//! dials the server's configured transport, lists its tools, and tears the
//! connection back down. Everything else here — timeout, TLS, filtering,
//! non-fatal failure handling — is transport-agnostic policy tested
//! against `RemoteServerConnector` instead.

use async_trait::async_trait;
use kagent_shared::error::KagentError;
use rmcp::ServiceExt;
use rmcp::transport::{SseClientTransport, StreamableHttpClientTransport};

use crate::config::{RemoteServerConfig, TransportKind};
use crate::init::RemoteServerConnector;

pub struct RmcpRemoteServerConnector;

#[async_trait]
impl RemoteServerConnector for RmcpRemoteServerConnector {
    async fn connect_and_list_tools(&self, config: &RemoteServerConfig, http: reqwest::Client) -> Result<Vec<String>, KagentError> {
        match config.transport {
            TransportKind::Sse => {
                let transport = SseClientTransport::start_with_client(http, config.url.clone())
                    .await
                    .map_err(KagentError::transient)?;
                let client = ().serve(transport).await.map_err(KagentError::transient)?;
                let tools = client.peer().list_all_tools().await.map_err(KagentError::transient)?;
                client.cancel().await.map_err(KagentError::transient)?;
                Ok(tools.into_iter().map(|tool| tool.name.to_string()).collect())
            }
            TransportKind::StreamableHttp => {
                let transport = StreamableHttpClientTransport::with_client(http, config.url.clone());
                let client = ().serve(transport).await.map_err(KagentError::transient)?;
                let tools = client.peer().list_all_tools().await.map_err(KagentError::transient)?;
                client.cancel().await.map_err(KagentError::transient)?;
                Ok(tools.into_iter().map(|tool| tool.name.to_string()).collect())
            }
        }
    }
}
