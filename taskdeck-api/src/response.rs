/// Success envelope
///
/// ```json
/// { "ok": true, "message": "Task deleted successfully" }
/// { "ok": true, "data": { ... } }
/// ```

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            ok: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            ok: true,
            message: Some(message.into()),
            data: Some(data),
        })
    }

    /// `201 Created` with a message and payload
    pub fn created(message: impl Into<String>, data: T) -> (StatusCode, Json<Self>) {
        (StatusCode::CREATED, Self::with_message(message, data))
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            ok: true,
            message: Some(message.into()),
            data: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_only_omits_data() {
        let Json(body) = ApiResponse::message("done");
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({"ok": true, "message": "done"}));
    }

    #[test]
    fn test_created_status() {
        let (status, Json(body)) = ApiResponse::created("Created", 7);
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.data, Some(7));
    }
}
