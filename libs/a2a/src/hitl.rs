//! Human-in-the-loop decision extraction (spec §4.7).
//!
//! Gates long-running tool calls by decoding an approve/deny decision from a
//! reply message: a structured `DataPart` always wins over keyword matching
//! in free text, and keyword matching is whole-word only so "yesterday"
//! never matches "yes" and "know" never matches "no".

use std::sync::OnceLock;

use kagent_shared::model::{Message, Part};
use regex::Regex;
use serde_json::Value;

const APPROVE_KEYWORDS: &[&str] = &["approved", "approve", "proceed", "yes", "continue"];
const DENY_KEYWORDS: &[&str] = &["denied", "deny", "reject", "no", "cancel", "stop"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Deny,
    Unknown,
}

fn keyword_regex(word: &str) -> Regex {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
    #[allow(clippy::expect_used)]
    Regex::new(&pattern).expect("keyword patterns are built from fixed literals")
}

fn keyword_regexes() -> &'static (Vec<Regex>, Vec<Regex>) {
    static RES: OnceLock<(Vec<Regex>, Vec<Regex>)> = OnceLock::new();
    RES.get_or_init(|| {
        (
            APPROVE_KEYWORDS.iter().map(|w| keyword_regex(w)).collect(),
            DENY_KEYWORDS.iter().map(|w| keyword_regex(w)).collect(),
        )
    })
}

/// Whole-word, case-insensitive keyword match over free text (spec §4.7,
/// §8 scenario 5: "yesterday" must not match "yes", "know" must not match
/// "no").
pub fn extract_decision_from_text(text: &str) -> Decision {
    let (approve, deny) = keyword_regexes();
    if deny.iter().any(|re| re.is_match(text)) {
        return Decision::Deny;
    }
    if approve.iter().any(|re| re.is_match(text)) {
        return Decision::Approve;
    }
    Decision::Unknown
}

fn decision_from_data(value: &Value) -> Option<Decision> {
    let decision_type = value.get("decision_type")?.as_str()?;
    match decision_type {
        "approve" => Some(Decision::Approve),
        "deny" => Some(Decision::Deny),
        _ => None,
    }
}

/// Extraction order (spec §4.7): the first `DataPart` with a recognized
/// `decision_type` wins outright; otherwise the first `TextPart` is matched
/// against the deny keywords (checked first) and then the approve keywords.
pub fn extract_decision(message: &Message) -> Decision {
    for part in &message.parts {
        if let Part::Data { data, .. } = part {
            if let Some(decision) = decision_from_data(data) {
                return decision;
            }
        }
    }

    for part in &message.parts {
        if let Part::Text { text, .. } = part {
            let decision = extract_decision_from_text(text);
            if decision != Decision::Unknown {
                return decision;
            }
        }
    }

    Decision::Unknown
}

/// Renders the approval-request `TextPart` body (spec §4.7): a markdown
/// headline, per-tool name as inline code, and bulleted args with backticks
/// escaped.
pub fn render_approval_markdown(requests: &[kagent_shared::model::ToolApprovalRequest]) -> String {
    let mut out = String::from("**Approval Required**\n\n");
    for request in requests {
        out.push_str(&format!("Tool: `{}`\n", escape_backticks(&request.name)));
        if let Some(obj) = request.args.as_object() {
            for (key, value) in obj {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out.push_str(&format!("• {}: {}\n", key, escape_backticks(&rendered)));
            }
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

fn escape_backticks(s: &str) -> String {
    s.replace('`', "\\`")
}

/// Builds the composite approval-request message (spec §4.7): one
/// `TextPart` for humans rendering the markdown above, and one `DataPart`
/// with `data.interrupt_type = "tool_approval"` for machines, tagged
/// `kagent_type = interrupt_data`.
pub fn build_approval_request_message(
    requests: &[kagent_shared::model::ToolApprovalRequest],
) -> Message {
    let text = render_approval_markdown(requests);
    let action_requests: Vec<Value> = requests
        .iter()
        .map(|r| {
            let mut obj = serde_json::json!({
                "name": r.name,
                "args": r.args,
            });
            if let (Some(id), Some(map)) = (r.id.as_ref(), obj.as_object_mut()) {
                map.insert("id".to_string(), Value::String(id.clone()));
            }
            obj
        })
        .collect();

    let mut data_part = Part::data(serde_json::json!({
        "interrupt_type": "tool_approval",
        "action_requests": action_requests,
    }));
    data_part.set_metadata(
        kagent_shared::metadata::KAGENT_TYPE,
        serde_json::json!(kagent_shared::metadata::TYPE_INTERRUPT_DATA),
    );

    Message::agent(vec![Part::text(text), data_part])
}
