//! The identity the audit middleware logs against (spec §4.10). Populated
//! into request extensions by whatever auth layer runs upstream of this one
//! — this crate has no opinion on how that identity was established, only
//! on how it is recorded.

#[derive(Debug, Clone)]
pub struct AuditIdentity {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl AuditIdentity {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            roles: Vec::new(),
        }
    }
}
