//! MCP Streamable HTTP mount (spec §4.6, §6): `KagentToolContainer` served
//! at `/mcp`, one container instance per MCP session via `LocalSessionManager`
//! the way the teacher's orchestrator mounts its own MCP surface.

use kagent_mcp_bridge::KagentToolContainer;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;

pub fn mcp_service(container: KagentToolContainer) -> StreamableHttpService<KagentToolContainer, LocalSessionManager> {
    StreamableHttpService::new(
        move || Ok(container.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    )
}
