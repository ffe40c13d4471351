//! Human-readable messages from error responses.

use super::request::RawResponse;
use serde_json::Value;

/// Shown when neither the body nor the status carries anything useful.
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Best-effort message for a failed response.
///
/// Order: the body's `detail` (a string, or a list of `{msg}` validation
/// items), then `message`/`error`, then the status reason phrase.
pub fn extract_error_message(response: &RawResponse) -> String {
    if let Some(message) = response.json_value().as_ref().and_then(message_from_body) {
        return message;
    }
    response
        .status
        .canonical_reason()
        .map(|reason| format!("{} {}", response.status.as_u16(), reason))
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
}

fn message_from_body(body: &Value) -> Option<String> {
    let candidate = body
        .get("detail")
        .or_else(|| body.get("message"))
        .or_else(|| body.get("error"))?;
    render(candidate).filter(|s| !s.trim().is_empty())
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_item).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        },
        Value::Object(_) => message_from_body(value),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// FastAPI-style validation item: `{"loc": [...], "msg": "..."}`.
fn render_item(item: &Value) -> Option<String> {
    match item {
        Value::Object(map) => {
            let msg = map.get("msg").and_then(Value::as_str)?;
            let field = map
                .get("loc")
                .and_then(Value::as_array)
                .and_then(|loc| loc.last())
                .map(|f| match f {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            Some(match field {
                Some(field) => format!("{field}: {msg}"),
                None => msg.to_string(),
            })
        },
        other => render(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn resp(status: u16, body: &str) -> RawResponse {
        RawResponse::new(StatusCode::from_u16(status).unwrap(), body.to_string())
    }

    #[test]
    fn detail_string_wins() {
        let r = resp(400, r#"{"detail": "Target column missing", "message": "ignored"}"#);
        assert_eq!(extract_error_message(&r), "Target column missing");
    }

    #[test]
    fn validation_lists_are_joined() {
        let body = json!({"detail": [
            {"loc": ["body", "email"], "msg": "field required"},
            {"loc": ["body", 0], "msg": "bad item"}
        ]});
        let r = resp(422, &body.to_string());
        assert_eq!(extract_error_message(&r), "email: field required; 0: bad item");
    }

    #[test]
    fn falls_back_to_status_reason() {
        assert_eq!(extract_error_message(&resp(404, "<html>nope</html>")), "404 Not Found");
        assert_eq!(extract_error_message(&resp(500, r#"{"detail": ""}"#)), "500 Internal Server Error");
    }

    #[test]
    fn unknown_status_uses_generic_text() {
        assert_eq!(extract_error_message(&resp(599, "")), FALLBACK_MESSAGE);
    }
}
