//! Pulling a JSON document out of free-form model output.

use lexicut_error::{BackendError, LexicutResult};

/// Extract the first JSON object or array from a model response.
///
/// Looks in a fenced ```` ```json ```` block first, then for the first
/// balanced `{...}` or `[...]` span outside string literals.
///
/// # Errors
///
/// Returns an error if the response contains no JSON structure.
///
/// # Examples
///
/// ```
/// use lexicut_models::extract_json;
///
/// let response = "Here is the order:\n```json\n{\"orderedIds\": [\"g2\", \"g1\"]}\n```";
/// assert_eq!(extract_json(response).unwrap(), "{\"orderedIds\": [\"g2\", \"g1\"]}");
///
/// let inline = "Sure! {\"orderedIds\": [\"g1\"], \"note\": \"}\"} Hope that helps.";
/// assert_eq!(extract_json(inline).unwrap(), "{\"orderedIds\": [\"g1\"], \"note\": \"}\"}");
/// ```
pub fn extract_json(response: &str) -> LexicutResult<String> {
    if let Some(fenced) = fenced_block(response) {
        return Ok(fenced);
    }

    let start = response.find(['{', '[']);
    if let Some(json) = start.and_then(|start| balanced_from(&response[start..])) {
        return Ok(json.to_string());
    }

    tracing::error!(
        response_length = response.len(),
        "No JSON found in model response"
    );
    Err(BackendError::new(format!(
        "No JSON found in response (length: {})",
        response.len()
    ))
    .into())
}

/// Contents of the first ```` ```json ```` (or bare ```` ``` ````) fence that
/// looks like JSON. An unclosed fence runs to the end of the response.
fn fenced_block(response: &str) -> Option<String> {
    let mut rest = response;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(after.len());
        let language = after[..body_start].trim();
        let body = &after[body_start..];
        let (content, remainder) = match body.find("```") {
            Some(close) => (&body[..close], &body[close + 3..]),
            None => (body, ""),
        };
        let content = content.trim();
        let looks_like_json = content.starts_with('{') || content.starts_with('[');
        if (language.eq_ignore_ascii_case("json") || language.is_empty()) && looks_like_json {
            return Some(content.to_string());
        }
        rest = remainder;
    }
    None
}

/// The balanced span starting at the first character of `text`.
fn balanced_from(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
