mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;
use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::TriviaError;
use crate::store::Category;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(Option<String>),
    NotFound(Option<String>),
    MethodNotAllowed,
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(Some(message.into()))
    }

    pub fn not_found() -> Self {
        Self::NotFound(None)
    }

    /// Logs an unreadable request part and answers with a plain 400.
    pub fn rejected(rejection: impl Display) -> Self {
        tracing::warn!("Rejected request: {rejection}");
        Self::BadRequest(None)
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::BadRequest(message) => message.unwrap_or_else(|| "bad request".to_owned()),
            ApiError::NotFound(message) => {
                message.unwrap_or_else(|| "resource not found".to_owned())
            }
            ApiError::MethodNotAllowed => "method not allowed".to_owned(),
            ApiError::Internal => "internal server error".to_owned(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<TriviaError> for ApiError {
    fn from(error: TriviaError) -> Self {
        match error {
            TriviaError::Validation(message) => {
                tracing::warn!("Validation failed: {message}");
                ApiError::BadRequest(Some(message))
            }
            TriviaError::NotFound { entity, id } => {
                tracing::info!(entity, id, "Not found");
                ApiError::NotFound(None)
            }
            TriviaError::Storage(error) => {
                tracing::error!("Storage failure: {error:?}");
                ApiError::Internal
            }
        }
    }
}

/// Categories keyed by id, the shape the frontend renders its category list from.
fn categories_by_id(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.name)).collect()
}
