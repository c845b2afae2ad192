//! The response envelope every endpoint answers with.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Body shape shared by success and error responses:
/// `{status, message, data?, errors?}`.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl Envelope {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>, errors: Option<Vec<String>>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            data: None,
            errors,
        }
    }
}

/// 200 with a data payload.
pub fn ok(message: impl Into<String>, data: Value) -> Response {
    (StatusCode::OK, Json(Envelope::success(message, Some(data)))).into_response()
}

/// 200 with no data payload.
pub fn ok_message(message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(Envelope::success(message, None))).into_response()
}

/// 201 with a data payload.
pub fn created(message: impl Into<String>, data: Value) -> Response {
    (
        StatusCode::CREATED,
        Json(Envelope::success(message, Some(data))),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_omits_error_fields() {
        let body = Envelope::success("Books retrieved successfully", Some(json!({"books": []})));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Books retrieved successfully");
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn error_envelope_carries_itemized_messages() {
        let body = Envelope::error(
            "Validation failed",
            Some(vec!["Title is required".to_string()]),
        );
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["status"], "error");
        assert_eq!(json["errors"][0], "Title is required");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn message_only_envelope_has_no_data() {
        let body = Envelope::success("Book deleted successfully", None);
        let json = serde_json::to_value(&body).unwrap();

        assert!(json.get("data").is_none());
    }
}
