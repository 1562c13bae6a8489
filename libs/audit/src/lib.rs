//! The audit logging layer (spec §4.10): a structured request/response log
//! record per HTTP request, gated by `KAGENT_AUDIT_LOG_ENABLED`.

pub mod config;
pub mod identity;
pub mod middleware;

pub use config::AuditConfig;
pub use identity::AuditIdentity;
pub use middleware::audit_middleware;
