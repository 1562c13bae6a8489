//! JWT bearer-token authentication (spec §6): every path requires a valid
//! token except the well-known agent card, which must be servable without
//! auth. Disabled entirely (every request resolves to `anonymous`) when
//! `A2A_JWT_SECRET` is unset.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use kagent_audit::AuditIdentity;
use serde_json::Value;

use crate::config::{AppConfig, ClaimNames};

fn is_well_known(path: &str) -> bool {
    path.ends_with("/.well-known/agent.json") || path == "/.well-known/agent.json"
}

fn claim_str<'a>(claims: &'a Value, names: &[String]) -> Option<&'a str> {
    names.iter().find_map(|name| claims.get(name)).and_then(|v| v.as_str())
}

fn claim_roles(claims: &Value, names: &[String]) -> Vec<String> {
    for name in names {
        let Some(value) = claims.get(name) else { continue };
        if let Some(array) = value.as_array() {
            return array.iter().filter_map(|v| v.as_str().map(ToOwned::to_owned)).collect();
        }
        if let Some(single) = value.as_str() {
            return vec![single.to_string()];
        }
    }
    Vec::new()
}

fn identity_from_claims(claims: &Value, names: &ClaimNames) -> AuditIdentity {
    AuditIdentity {
        user_id: claim_str(claims, &names.user_id).unwrap_or("anonymous").to_string(),
        roles: claim_roles(claims, &names.groups),
    }
}

/// Independent of the token's own `exp` claim: rejects a token whose `iat`
/// is older than `A2A_JWT_TOKEN_LIFETIME`, bounding how long a leaked token
/// stays usable even against an IdP that issues long- or non-expiring ones.
fn exceeds_configured_lifetime(claims: &Value, lifetime: Duration) -> bool {
    let Some(issued_at) = claims.get("iat").and_then(Value::as_i64) else {
        return false;
    };
    let age = chrono::Utc::now().timestamp().saturating_sub(issued_at);
    age > lifetime.as_secs() as i64
}

pub async fn auth_middleware(State(config): State<Arc<AppConfig>>, mut request: Request<Body>, next: Next) -> Response {
    if is_well_known(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(secret) = config.jwt_secret.as_deref() else {
        request.extensions_mut().insert(AuditIdentity::anonymous());
        return next.run(request).await;
    };

    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return (StatusCode::UNAUTHORIZED, "missing bearer token").into_response();
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let decoded = decode::<Value>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation);

    match decoded {
        Ok(token_data) if exceeds_configured_lifetime(&token_data.claims, config.jwt_token_lifetime) => {
            (StatusCode::UNAUTHORIZED, "bearer token exceeds configured lifetime").into_response()
        }
        Ok(token_data) => {
            request.extensions_mut().insert(identity_from_claims(&token_data.claims, &config.claim_names));
            next.run(request).await
        }
        Err(_) => (StatusCode::UNAUTHORIZED, "invalid bearer token").into_response(),
    }
}
