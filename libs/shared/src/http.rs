//! Request-scoped HTTP helpers shared by the audit middleware and the
//! server's route handlers (spec §4.10).

use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn namespace_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| Regex::new(r"^/api/[^/]+/([^/]+)(?:/|$)").expect("fixed pattern is valid"))
}

/// Generates a new request id, used when the inbound request carries none.
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Derives the namespace for an audit log record (spec §4.10): from the URL
/// path `^/api/[^/]+/([^/]+)(?:/|$)`, then the `namespace` query parameter,
/// then the `X-Namespace` header, else `"unknown"`.
pub fn derive_namespace(path: &str, query: Option<&str>, header: Option<&str>) -> String {
    if let Some(m) = namespace_path_regex().captures(path).and_then(|c| c.get(1)) {
        return m.as_str().to_string();
    }

    if let Some(query) = query {
        if let Some(ns) = query_param(query, "namespace") {
            return ns;
        }
    }

    if let Some(header) = header {
        if !header.trim().is_empty() {
            return header.trim().to_string();
        }
    }

    "unknown".to_string()
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let k = parts.next()?;
        let v = parts.next().unwrap_or("");
        if k == key && !v.is_empty() {
            Some(v.to_string())
        } else {
            None
        }
    })
}

/// Result categories for the audit log's status summary (spec §4.10).
pub fn result_category(status: u16) -> &'static str {
    match status {
        200..=299 => "success",
        300..=399 => "redirect",
        400..=499 => "client_error",
        500..=599 => "server_error",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_from_path() {
        assert_eq!(
            derive_namespace("/api/v1/my-namespace/agents", None, None),
            "my-namespace"
        );
        assert_eq!(derive_namespace("/api/v1/my-namespace", None, None), "my-namespace");
    }

    #[test]
    fn namespace_falls_back_to_query() {
        assert_eq!(
            derive_namespace("/healthz", Some("namespace=from-query"), None),
            "from-query"
        );
    }

    #[test]
    fn namespace_falls_back_to_header() {
        assert_eq!(derive_namespace("/healthz", None, Some("from-header")), "from-header");
    }

    #[test]
    fn namespace_defaults_to_unknown() {
        assert_eq!(derive_namespace("/healthz", None, None), "unknown");
    }

    #[test]
    fn result_categories() {
        assert_eq!(result_category(204), "success");
        assert_eq!(result_category(302), "redirect");
        assert_eq!(result_category(404), "client_error");
        assert_eq!(result_category(503), "server_error");
        assert_eq!(result_category(101), "unknown");
    }
}
