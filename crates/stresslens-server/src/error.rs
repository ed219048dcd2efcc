use std::borrow::Cow;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use stresslens_ai::AnalyzeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum ApiError {
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),

    #[error("inference task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ApiErrorType {
    InvalidRequest,
    EmptyText,
    InferenceFailed,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorData<T> {
    pub(crate) error: T,
    pub(crate) error_description: Cow<'static, str>,
}

impl<T> ErrorData<T> {
    pub fn new<A: Into<Cow<'static, str>>>(error: T, error_description: A) -> Self {
        Self {
            error,
            error_description: error_description.into(),
        }
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(rejection) => rejection.status(),
            Self::Analyze(AnalyzeError::EmptyText) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Analyze(_) | Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_data(&self) -> ErrorData<ApiErrorType> {
        match self {
            Self::InvalidBody(rejection) => {
                ErrorData::new(ApiErrorType::InvalidRequest, rejection.body_text())
            }
            Self::Analyze(AnalyzeError::EmptyText) => {
                ErrorData::new(ApiErrorType::EmptyText, "text must not be empty")
            }
            // Internals stay in the log.
            Self::Analyze(_) | Self::Join(_) => {
                ErrorData::new(ApiErrorType::InferenceFailed, "failed to analyze text")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = &self as &dyn std::error::Error, "predict failed");
        } else {
            tracing::debug!(%status, error = %self, "rejected request");
        }
        (status, Json(self.error_data())).into_response()
    }
}
