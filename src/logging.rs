//! Middleware for logging requests and responses.

use axum::{
    extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response,
};
use serde_json::Value;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level. Password fields in JSON
/// request bodies are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = extract_header_and_body_text_from_request(request).await;

    let is_json = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        log_request(&parts, &redact_password(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

/// Replace the `password` field of a JSON object with asterisks.
///
/// Non-JSON bodies and bodies without a password field pass through
/// unchanged.
fn redact_password(body_text: &str) -> String {
    match serde_json::from_str::<Value>(body_text) {
        Ok(Value::Object(mut fields)) => {
            if fields.contains_key("password") {
                fields.insert("password".to_owned(), Value::String("********".to_owned()));
            }

            Value::Object(fields).to_string()
        }
        _ => body_text.to_owned(),
    }
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

/// Bodies longer than this many characters are truncated in `info` level
/// logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

fn truncated(body: &str) -> String {
    body.chars().take(LOG_BODY_LENGTH_LIMIT).collect()
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {:}...",
            parts.method,
            parts.uri,
            truncated(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nbody: {:}...",
            parts.status,
            truncated(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {}\nbody: {body:?}", parts.status);
    }
}

#[cfg(test)]
mod redact_tests {
    use super::redact_password;

    #[test]
    fn redacts_the_password_field() {
        let body = r#"{"username":"ana","password":"hunter2"}"#;

        let redacted = redact_password(body);

        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("ana"));
        assert!(redacted.contains("********"));
    }

    #[test]
    fn leaves_bodies_without_a_password_untouched() {
        let body = r#"{"descricao":"Salário","valor":1000}"#;

        assert_eq!(redact_password(body), body);
    }

    #[test]
    fn leaves_non_json_bodies_untouched() {
        let body = "not json";

        assert_eq!(redact_password(body), body);
    }
}
