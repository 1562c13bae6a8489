//! MCP-facing bridge (spec §4.6): exposes kagent's managed agents as MCP
//! tools and keeps a per-MCP-session map of A2A conversation contexts.

pub mod registry;
pub mod server;
pub mod session;

pub use registry::{AgentCaller, AgentSummary};
pub use server::KagentToolContainer;
pub use session::{AgentRef, McpSessionRegistry};
