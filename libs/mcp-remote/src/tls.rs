//! TLS policy and header injection for outbound remote-MCP connections
//! (spec §4.5). Header injection is implemented as `reqwest`'s
//! `default_headers`, applied to every request the client makes — the
//! same round-tripper role the teacher's MCP client gives `reqwest`.

use kagent_shared::error::KagentError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

use crate::config::TlsPolicy;

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, KagentError> {
    let mut header_map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| KagentError::validation(format!("invalid header name {key}: {e}")))?;
        let val = HeaderValue::from_str(value)
            .map_err(|e| KagentError::validation(format!("invalid header value for {key}: {e}")))?;
        header_map.insert(name, val);
    }
    Ok(header_map)
}

pub fn build_http_client(policy: &TlsPolicy, headers: &[(String, String)], server_name: &str) -> Result<reqwest::Client, KagentError> {
    match policy {
        TlsPolicy::Insecure => {
            warn!(server = %server_name, "TLS certificate verification disabled for remote MCP server");
            reqwest::Client::builder()
                .default_headers(header_map(headers)?)
                .danger_accept_invalid_certs(true)
                .build()
                .map_err(KagentError::transient)
        }
        TlsPolicy::SystemPool => reqwest::Client::builder()
            .default_headers(header_map(headers)?)
            .build()
            .map_err(KagentError::transient),
        TlsPolicy::CustomCa { pem, file_only: true } => {
            let cert = reqwest::Certificate::from_pem(pem).map_err(KagentError::transient)?;
            reqwest::Client::builder()
                .default_headers(header_map(headers)?)
                .tls_built_in_root_certs(false)
                .add_root_certificate(cert)
                .build()
                .map_err(KagentError::transient)
        }
        TlsPolicy::CustomCa { pem, file_only: false } => {
            let appended = reqwest::Certificate::from_pem(pem)
                .map_err(KagentError::transient)
                .and_then(|cert| {
                    reqwest::Client::builder()
                        .default_headers(header_map(headers)?)
                        .add_root_certificate(cert)
                        .build()
                        .map_err(KagentError::transient)
                });
            if let Ok(client) = appended {
                return Ok(client);
            }

            // System root pool failed to load; fall back to the configured
            // file alone, silently (spec §4.6).
            let cert = reqwest::Certificate::from_pem(pem).map_err(KagentError::transient)?;
            reqwest::Client::builder()
                .default_headers(header_map(headers)?)
                .tls_built_in_root_certs(false)
                .add_root_certificate(cert)
                .build()
                .map_err(KagentError::transient)
        }
    }
}
