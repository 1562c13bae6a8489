//! The audit middleware (spec §4.10): attaches a structured log record to
//! every HTTP request, gated by `KAGENT_AUDIT_LOG_ENABLED`. Built as
//! `axum::middleware::from_fn_with_state` so it sits in the router's layer
//! stack like any other tower service; `next.run` is awaited directly so
//! the handler's response body — including any SSE stream's flush
//! semantics — passes through untouched.

use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use kagent_shared::http::{derive_namespace, generate_request_id, result_category};
use tracing::info;

use crate::config::AuditConfig;
use crate::identity::AuditIdentity;

const REQUEST_ID_HEADER: &str = "x-request-id";
const NAMESPACE_HEADER: &str = "x-namespace";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn audit_middleware(State(config): State<AuditConfig>, request: Request<Body>, next: Next) -> Response {
    if !config.enabled {
        return next.run(request).await;
    }

    let started_at = Instant::now();
    let timestamp = Utc::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(ToOwned::to_owned);
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let headers = request.headers().clone();
    let request_id = header_str(&headers, REQUEST_ID_HEADER)
        .map(ToOwned::to_owned)
        .unwrap_or_else(generate_request_id);
    let user_agent = header_str(&headers, "user-agent").unwrap_or("unknown").to_string();
    let namespace = derive_namespace(&path, query.as_deref(), header_str(&headers, NAMESPACE_HEADER));

    let identity = request
        .extensions()
        .get::<AuditIdentity>()
        .cloned()
        .unwrap_or_else(AuditIdentity::anonymous);

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started_at.elapsed().as_millis();

    info!(
        request_id = %request_id,
        timestamp = %timestamp.to_rfc3339(),
        user_id = %identity.user_id,
        roles = ?identity.roles,
        namespace = %namespace,
        method = %method,
        path = %path,
        remote_addr = %remote_addr,
        user_agent = %user_agent,
        status,
        result_category = result_category(status),
        duration_ms,
        "audit"
    );

    response
}
