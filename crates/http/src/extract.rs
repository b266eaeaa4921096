//! Extractors whose rejections render as [`AppError`] instead of axum's plain-text bodies.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// Path parameters; a malformed segment is a 422.
#[derive(Debug)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// JSON body that is deserialized and then checked with [`Validate`] before the handler runs.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;
    use validator::{ValidationError, ValidationErrors};

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    impl Validate for Named {
        fn validate(&self) -> Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();
            if self.name.is_empty() {
                errors.add("name", ValidationError::new("length"));
            }
            if errors.is_empty() {
                Ok(())
            } else {
                Err(errors)
            }
        }
    }

    fn app() -> Router {
        Router::new().route(
            "/items/{id}",
            post(
                |Path(id): Path<i64>, ValidatedJson(body): ValidatedJson<Named>| async move {
                    format!("{id}:{}", body.name).into_response()
                },
            ),
        )
    }

    async fn send(uri: &str, body: &str) -> StatusCode {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn accepts_valid_input() {
        assert_eq!(send("/items/3", r#"{"name":"ok"}"#).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_non_integer_path() {
        assert_eq!(
            send("/items/abc", r#"{"name":"ok"}"#).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[tokio::test]
    async fn rejects_malformed_and_invalid_bodies() {
        assert_eq!(send("/items/3", "{").await, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(send("/items/3", "{}").await, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            send("/items/3", r#"{"name":""}"#).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
