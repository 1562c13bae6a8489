//! Remote MCP toolset support for agents acting as MCP clients (spec
//! §4.5): transport/TLS selection, tool filtering, and per-server init
//! with non-fatal failure handling.

pub mod config;
pub mod init;
pub mod rmcp_connector;
pub mod timeout;
pub mod tls;
pub mod tools;

pub use config::{RemoteServerConfig, TlsPolicy, TransportKind};
pub use init::{RemoteServerConnector, RemoteServerOutcome, initialize_remote_toolsets};
pub use rmcp_connector::RmcpRemoteServerConnector;
pub use timeout::effective_init_timeout;
