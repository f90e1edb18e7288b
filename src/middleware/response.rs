use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;

/// Successful JSON response with an optional confirmation message.
///
/// Objects get the message merged in as a `message` field, `()` becomes
/// `{ "message": ... }`, and any other value is returned as-is.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            message: None,
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
            message: None,
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// Body consisting only of `{ "message": ... }`
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse::success(()).with_message(message)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Erro interno do servidor",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let body = match (data_value, self.message) {
            (Value::Object(mut map), Some(message)) => {
                map.insert("message".into(), Value::String(message));
                Value::Object(map)
            }
            (Value::Null, Some(message)) => json!({ "message": message }),
            (value, _) => value,
        };

        (status, Json(body)).into_response()
    }
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Give the router's bodiless 405 and the timeout layer's bare 408 the same
/// JSON error body as every other failure. Installed with
/// `axum::middleware::map_response`.
pub async fn json_error_bodies(response: Response) -> Response {
    if response.headers().contains_key(header::CONTENT_TYPE) {
        return response;
    }

    let error = match response.status() {
        StatusCode::METHOD_NOT_ALLOWED => ApiError::method_not_allowed("Método não permitido"),
        StatusCode::REQUEST_TIMEOUT => {
            tracing::warn!("Request timed out");
            ApiError::request_timeout("Tempo limite da requisição excedido")
        }
        _ => return response,
    };

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut json = error.into_response();
    if let Some(allow) = allow {
        json.headers_mut().insert(header::ALLOW, allow);
    }
    json
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn merges_message_into_objects() {
        let response = ApiResponse::created(json!({ "id": 1 }))
            .with_message("Técnico criado com sucesso")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_of(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["message"], "Técnico criado com sucesso");
    }

    #[tokio::test]
    async fn message_only_body() {
        let body = body_of(ApiResponse::message("ok").into_response()).await;
        assert_eq!(body, json!({ "message": "ok" }));
    }

    #[tokio::test]
    async fn bare_timeout_gets_a_json_body() {
        let response = json_error_bodies(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_of(response).await;
        assert_eq!(body["code"], "REQUEST_TIMEOUT");
        assert_eq!(body["error"], "Tempo limite da requisição excedido");
    }

    #[tokio::test]
    async fn method_not_allowed_keeps_allow_header() {
        let mut bare = StatusCode::METHOD_NOT_ALLOWED.into_response();
        bare.headers_mut()
            .insert(header::ALLOW, axum::http::HeaderValue::from_static("GET,HEAD,POST"));

        let response = json_error_bodies(bare).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET,HEAD,POST");
        assert_eq!(body_of(response).await["code"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn json_responses_are_left_alone() {
        let original = ApiError::not_found("Técnico não encontrado").into_response();
        let response = json_error_bodies(original).await;
        assert_eq!(body_of(response).await["error"], "Técnico não encontrado");
    }

    #[tokio::test]
    async fn arrays_pass_through_unwrapped() {
        let body = body_of(ApiResponse::success(vec![1, 2, 3]).into_response()).await;
        assert_eq!(body, json!([1, 2, 3]));
    }
}
