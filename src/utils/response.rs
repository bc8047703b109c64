//! JSON envelopes shared by every handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody<'a> {
    pub code: &'a str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorResponse<'a> {
    pub success: bool,
    pub error: ApiErrorBody<'a>,
}

fn respond<T: Serialize>(status: StatusCode, data: T, message: impl Into<String>) -> Response {
    let body = ApiResponse {
        success: true,
        data,
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    respond(StatusCode::OK, data, message)
}

/// `201 Created` for handlers that insert a row.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    respond(StatusCode::CREATED, data, message)
}

pub fn error(
    code: &str,
    message: impl Into<String>,
    details: Option<Value>,
    status: StatusCode,
) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: ApiErrorBody {
            code,
            message: message.into(),
            details,
        },
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_wraps_payload() {
        let response = created(json!({ "id": 7 }), "Session scheduled");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_of(response).await,
            json!({ "success": true, "data": { "id": 7 }, "message": "Session scheduled" })
        );
    }

    #[tokio::test]
    async fn error_omits_missing_details() {
        let response = error("NOT_FOUND", "Booking not found", None, StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_of(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert!(body["error"].get("details").is_none());
    }
}
