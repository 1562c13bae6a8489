//! `KAGENT_AUDIT_LOG_ENABLED` gate (spec §6), default true.

#[derive(Debug, Clone, Copy)]
pub struct AuditConfig {
    pub enabled: bool,
}

impl AuditConfig {
    pub fn from_env() -> Self {
        let enabled = std::env::var("KAGENT_AUDIT_LOG_ENABLED")
            .ok()
            .map(|value| !matches!(value.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);
        Self { enabled }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
