//! Request body extraction
//!
//! Student bodies arrive as JSON or as URL-encoded forms. A request without a
//! `Content-Type` carries no fields and extracts as an empty body. The
//! rejection keeps the status axum assigned so each handler can decide
//! whether to wrap it in its own failure envelope.

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::de::DeserializeOwned;

use super::response::ErrorResponse;

/// Body deserialized from JSON or `application/x-www-form-urlencoded`
#[derive(Debug, Clone)]
pub struct StudentBody<T>(pub T);

/// Why a body could not be extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRejection {
    pub status: StatusCode,
    pub message: String,
}

impl BodyRejection {
    /// The body was read but its content was unusable
    pub fn is_malformed(&self) -> bool {
        matches!(
            self.status,
            StatusCode::BAD_REQUEST
                | StatusCode::UNPROCESSABLE_ENTITY
                | StatusCode::UNSUPPORTED_MEDIA_TYPE
        )
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

#[axum::async_trait]
impl<S, T> FromRequest<S> for StudentBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match content_type(&req) {
            None => Ok(StudentBody(T::default())),
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                Form::<T>::from_request(req, state)
                    .await
                    .map(|Form(value)| StudentBody(value))
                    .map_err(|rejection| BodyRejection {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    })
            }
            Some(_) => Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| StudentBody(value))
                .map_err(|rejection| BodyRejection {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }),
        }
    }
}

fn content_type(req: &Request) -> Option<String> {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase())
}
