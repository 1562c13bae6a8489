//! Startup configuration (spec §6, §9 "global state"): environment is read
//! once in `main` and held immutably in `AppState` for the process lifetime,
//! the way `stakpak-server`'s `AppState` is built.

use std::time::Duration;

use kagent_audit::AuditConfig;

const DEFAULT_TOKEN_LIFETIME: &str = "24h";

#[derive(Debug, Clone)]
pub struct ClaimNames {
    pub user_id: Vec<String>,
    pub email: Vec<String>,
    pub name: Vec<String>,
    pub groups: Vec<String>,
}

impl ClaimNames {
    fn from_env() -> Self {
        Self {
            user_id: claim_override("JWT_CLAIM_USER_ID").unwrap_or_else(|| vec!["sub".to_string()]),
            email: claim_override("JWT_CLAIM_EMAIL").unwrap_or_else(|| vec!["email".to_string()]),
            name: claim_override("JWT_CLAIM_NAME")
                .unwrap_or_else(|| vec!["name".to_string(), "preferred_username".to_string()]),
            groups: claim_override("JWT_CLAIM_GROUPS").unwrap_or_else(|| {
                vec!["groups".to_string(), "cognito:groups".to_string(), "roles".to_string()]
            }),
        }
    }
}

fn claim_override(var: &str) -> Option<Vec<String>> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty()).map(|v| vec![v])
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` disables JWT auth entirely; every request is treated as the
    /// `anonymous` identity. `Some` requires every non-well-known request to
    /// carry a valid bearer token signed with this secret.
    pub jwt_secret: Option<String>,
    pub jwt_token_lifetime: Duration,
    pub claim_names: ClaimNames,
    pub audit: AuditConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("A2A_JWT_SECRET").ok().filter(|v| !v.is_empty());
        let jwt_token_lifetime = std::env::var("A2A_JWT_TOKEN_LIFETIME")
            .ok()
            .and_then(|raw| humantime::parse_duration(&raw).ok())
            .unwrap_or_else(|| humantime::parse_duration(DEFAULT_TOKEN_LIFETIME).unwrap_or(Duration::from_secs(86_400)));

        Self {
            jwt_secret,
            jwt_token_lifetime,
            claim_names: ClaimNames::from_env(),
            audit: AuditConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_claim_names_follow_the_documented_fallback_chain() {
        let claims = ClaimNames {
            user_id: vec!["sub".to_string()],
            email: vec!["email".to_string()],
            name: vec!["name".to_string(), "preferred_username".to_string()],
            groups: vec!["groups".to_string(), "cognito:groups".to_string(), "roles".to_string()],
        };
        assert_eq!(claims.name.len(), 2);
        assert_eq!(claims.groups.len(), 3);
    }

    #[test]
    fn default_token_lifetime_is_24_hours() {
        let lifetime = humantime::parse_duration(DEFAULT_TOKEN_LIFETIME).unwrap_or(Duration::from_secs(86_400));
        assert_eq!(lifetime, Duration::from_secs(86_400));
    }
}
