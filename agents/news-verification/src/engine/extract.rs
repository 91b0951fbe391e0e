//! Best-effort JSON object extraction from free-form model text
//!
//! Models wrap their JSON in prose or markdown fences, or add trailing
//! commentary. Extraction tries the greedy span first, then balanced spans
//! from successive `{` positions, and stops at the first object the caller
//! accepts. It never fails loudly; `None` means the caller should fall
//! back to the default report.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// First `{` through last `}`, across newlines
static OBJECT_SPAN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").ok());

/// Cap on balanced-scan start positions tried per reply
const MAX_BALANCED_ATTEMPTS: usize = 8;

/// Walk candidate objects in `text` until `accept` returns `Some`.
pub fn find_json_object<T, F>(text: &str, mut accept: F) -> Option<T>
where
    F: FnMut(Map<String, Value>) -> Option<T>,
{
    if let Some(found) = greedy_span(text)
        .and_then(parse_object)
        .and_then(&mut accept)
    {
        return Some(found);
    }

    text.match_indices('{')
        .take(MAX_BALANCED_ATTEMPTS)
        .filter_map(|(start, _)| balanced_span(&text[start..]))
        .filter_map(parse_object)
        .find_map(accept)
}

fn greedy_span(text: &str) -> Option<&str> {
    OBJECT_SPAN
        .as_ref()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str())
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Candidate span is not valid JSON");
            None
        }
    }
}

/// Span from the leading `{` to its matching `}`, skipping braces inside
/// string literals.
fn balanced_span(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
