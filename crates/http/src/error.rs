//! Error handling for the catalog HTTP layer

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

/// Body of every error response: `{"detail": ...}`.
///
/// `detail` is a string for most errors and a list of field errors for 422s.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::BadRequest { .. } => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// Builds one `{"loc", "msg", "type"}` entry of a 422 detail list.
pub fn field_error(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> serde_json::Value {
    json!({
        "loc": loc,
        "msg": msg.into(),
        "type": kind.into(),
    })
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<(String, serde_json::Value)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter()
                    .map(|err| {
                        let msg = err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| err.code.to_string());
                        let entry = field_error(&["body", field.as_str()], msg, err.code.to_string());
                        (field.clone(), entry)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        // Map iteration order is random; keep responses stable.
        details.sort_by(|a, b| a.0.cmp(&b.0));

        Self::validation(
            details.into_iter().map(|(_, entry)| entry).collect(),
            "request body failed validation",
        )
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "json_data",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            _ => "body",
        };
        Self::validation(
            vec![field_error(&["body"], rejection.body_text(), kind)],
            "request body could not be parsed",
        )
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(
            vec![field_error(&["path"], rejection.body_text(), "path_invalid")],
            "path parameters could not be parsed",
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();
        let error_code = self.code();

        let detail = match self {
            AppError::Validation { details, message } => {
                tracing::warn!(
                    error_id = %error_id,
                    error_code,
                    status_code = status.as_u16(),
                    %message,
                    "Request rejected"
                );
                serde_json::Value::Array(details)
            }
            AppError::NotFound { message } | AppError::BadRequest { message } => {
                tracing::warn!(
                    error_id = %error_id,
                    error_code,
                    status_code = status.as_u16(),
                    %message,
                    "Request rejected"
                );
                serde_json::Value::String(message)
            }
            AppError::Internal(e) => {
                tracing::error!(
                    error_id = %error_id,
                    error_code,
                    status_code = status.as_u16(),
                    error = ?e,
                    "Request error"
                );
                // In production, hide internal error details
                let message = if cfg!(not(debug_assertions)) {
                    format!("An internal server error occurred (error id {error_id})")
                } else {
                    e.to_string()
                };
                serde_json::Value::String(message)
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::ValidationError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_body_carries_detail() {
        let response = AppError::not_found("Livro com ID 9 não encontrado").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Livro com ID 9 não encontrado"})
        );
    }

    #[tokio::test]
    async fn test_bad_request_mapping() {
        let response = AppError::bad_request("Nenhum campo fornecido para atualização").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_mapping() {
        let internal_error = anyhow::anyhow!("Database connection failed");
        let error = AppError::Internal(internal_error);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_validation_errors_become_sorted_field_list() {
        let mut errors = ValidationErrors::new();
        let mut short = ValidationError::new("length");
        short.message = Some("título deve ter pelo menos 3 caracteres".into());
        errors.add("titulo", short);
        errors.add("autor", ValidationError::new("length"));

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        let detail = body["detail"].as_array().unwrap();
        assert_eq!(detail.len(), 2);
        assert_eq!(detail[0]["loc"], json!(["body", "autor"]));
        assert_eq!(detail[0]["msg"], "length");
        assert_eq!(detail[1]["loc"], json!(["body", "titulo"]));
        assert_eq!(detail[1]["msg"], "título deve ter pelo menos 3 caracteres");
        assert_eq!(detail[1]["type"], "length");
    }
}
