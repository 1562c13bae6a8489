//! Session event normalization on `Get` (spec §4.8): already-typed events
//! pass through, map/string events are JSON-decoded into `FrameworkEvent`,
//! and malformed events are skipped with a logged, truncated preview.

use kagent_shared::model::FrameworkEvent;
use tracing::warn;

const PREVIEW_LIMIT: usize = 500;

/// Decodes one stored event value. Returns `None` (and logs a line with a
/// truncated preview) for anything that doesn't decode into a
/// `FrameworkEvent`, so the caller's filtered event list silently drops only
/// the malformed entries.
pub fn parse_stored_event(raw: serde_json::Value) -> Option<FrameworkEvent> {
    match serde_json::from_value::<FrameworkEvent>(raw.clone()) {
        Ok(event) => Some(event),
        Err(error) => {
            let preview = truncated_preview(&raw);
            warn!(%error, preview = %preview, "skipping malformed session event");
            None
        }
    }
}

fn truncated_preview(raw: &serde_json::Value) -> String {
    let rendered = match raw {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if rendered.chars().count() > PREVIEW_LIMIT {
        let truncated: String = rendered.chars().take(PREVIEW_LIMIT).collect();
        format!("{truncated}…")
    } else {
        rendered
    }
}
