use log::debug;
use serde_json::{Map, Value};

use crate::AnalysisError;

/// Parse the first balanced `{...}` object found in a model reply.
///
/// Commentary and markdown fences around the object are ignored. Braces inside
/// JSON string literals do not count toward nesting.
pub fn extract_json(reply: &str) -> Result<Map<String, Value>, AnalysisError> {
    let span = first_object_span(reply).ok_or_else(|| {
        if reply.contains('{') {
            AnalysisError::malformed("unbalanced braces in reply")
        } else {
            AnalysisError::malformed("no JSON object in reply")
        }
    })?;
    debug!("Extracted JSON span of {} bytes", span.len());

    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AnalysisError::malformed(format!("expected an object, got {other}"))),
        Err(e) => Err(AnalysisError::malformed(e)),
    }
}

fn first_object_span(text: &str) -> Option<&str> {
    // A `{` that never closes is stray prose; try the next one
    text.match_indices('{').find_map(|(start, _)| balanced_from(&text[start..]))
}

/// The balanced object at the start of `text`, which begins with `{`
fn balanced_from(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
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
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
