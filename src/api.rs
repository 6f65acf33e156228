//! Typed result for REST responses.
//!
//! The backend answers in several shapes: a `{success, data, message}`
//! envelope, a bare array or object, or an error body with a non-2xx status.
//! [`ApiOutcome::from_response`] folds all of them into one discriminated union
//! at the client boundary so callers never inspect the raw shape themselves.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// `{"kind": "ok", "data": ...}` or `{"kind": "err", "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ApiOutcome<T> {
    Ok { data: T },
    Err { message: String },
}

/// The human-readable error carried by a failure body, if any.
fn error_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
}

impl<T: DeserializeOwned> ApiOutcome<T> {
    /// Interprets a 2xx body.
    pub fn from_body(body: Value) -> Self {
        let data = match body {
            Value::Object(mut map) => match map.get("success").and_then(Value::as_bool) {
                Some(true) => map.remove("data").unwrap_or(Value::Null),
                Some(false) => {
                    let message = error_message(&Value::Object(map))
                        .unwrap_or_else(|| "Request failed".to_string());
                    return ApiOutcome::Err { message };
                }
                None => Value::Object(map),
            },
            other => other,
        };
        match serde_json::from_value(data) {
            Ok(data) => ApiOutcome::Ok { data },
            Err(e) => ApiOutcome::Err { message: format!("Unexpected response shape: {}", e) },
        }
    }

    /// Interprets an HTTP status and raw body text. An empty body is `null`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = if body.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(body)
        };
        if !(200..300).contains(&status) {
            let message = parsed
                .ok()
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            tracing::debug!(status, %message, "request failed");
            return ApiOutcome::Err { message };
        }
        match parsed {
            Ok(value) => Self::from_body(value),
            Err(e) => ApiOutcome::Err { message: format!("Invalid JSON response: {}", e) },
        }
    }
}

impl<T> ApiOutcome<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiOutcome::Ok { .. })
    }

    pub fn ok(self) -> Option<T> {
        match self {
            ApiOutcome::Ok { data } => Some(data),
            ApiOutcome::Err { .. } => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Ok { data } => ApiOutcome::Ok { data: f(data) },
            ApiOutcome::Err { message } => ApiOutcome::Err { message },
        }
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            ApiOutcome::Ok { data } => Ok(data),
            ApiOutcome::Err { message } => Err(ApiError::Remote(message)),
        }
    }
}
