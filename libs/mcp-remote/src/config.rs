//! Remote MCP server configuration (spec §4.5): one entry per server the
//! agent is configured to reach out to as an MCP client.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Deprecated by the MCP spec but still seen in the wild; kept for
    /// servers that haven't migrated to Streamable HTTP yet.
    Sse,
    StreamableHttp,
}

#[derive(Debug, Clone)]
pub enum TlsPolicy {
    /// Skips certificate verification entirely. Only for servers the
    /// operator has already placed inside a trusted network boundary.
    Insecure,
    /// PEM-encoded CA bundle. `file_only=true` trusts only this bundle;
    /// otherwise it's appended to the system root pool (falling back to
    /// file-only if the system pool can't be loaded).
    CustomCa { pem: Vec<u8>, file_only: bool },
    /// The platform's default trust store, no overrides.
    SystemPool,
}

#[derive(Debug, Clone)]
pub struct RemoteServerConfig {
    pub name: String,
    pub transport: TransportKind,
    pub url: String,
    pub tls: TlsPolicy,
    pub headers: Vec<(String, String)>,
    /// `None` means every tool the server advertises is allowed.
    pub allowed_tools: Option<Vec<String>>,
    pub init_timeout: Duration,
}
