//! Helpers for cleaning up raw model output before parsing.

/// Strip a surrounding markdown code fence from a completion, if present.
///
/// Models asked for JSON frequently wrap it in ` ```json … ``` `. Returns the
/// fenced body with the info string removed, or the trimmed input when there
/// is no fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "text", ...) up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
