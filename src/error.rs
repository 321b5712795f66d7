use poem::http::StatusCode;
use poem::{Error as PoemError, IntoResponse, Response};
use poem_openapi::error::{ParseParamError, ParseRequestPayloadError};
use serde::Serialize;
use thiserror::Error;

use crate::domain::TransitionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Body or parameter that could not be decoded at all
    #[error("Malformed request: {message}")]
    Malformed {
        field: Option<String>,
        message: String,
    },

    #[error("{message}")]
    InvalidState { code: &'static str, message: String },

    #[error("Unauthorized: missing caller identity")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON body returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Malformed { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidState { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } | AppError::Malformed { .. } => "validation_error",
            AppError::InvalidState { code, .. } => *code,
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn body(&self) -> ErrorBody {
        let message = match self {
            // Infrastructure detail stays in the logs
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Validation { message, .. } | AppError::Malformed { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        };
        let field = match self {
            AppError::Validation { field, .. } => Some(field.clone()),
            AppError::Malformed { field, .. } => field.clone(),
            _ => None,
        };
        ErrorBody {
            code: self.code().to_string(),
            message,
            field,
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        AppError::InvalidState {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(ref inner) = self {
            tracing::error!("Request failed: {:#}", inner);
        }
        let body = serde_json::to_string(&self.body())
            .unwrap_or_else(|_| format!("{{\"code\":\"{}\"}}", self.code()));
        Response::builder()
            .status(self.status_code())
            .content_type("application/json")
            .body(body)
    }
}

impl From<AppError> for PoemError {
    fn from(err: AppError) -> Self {
        PoemError::from_response(err.into_response())
    }
}

impl From<ParseRequestPayloadError> for AppError {
    fn from(err: ParseRequestPayloadError) -> Self {
        AppError::Malformed {
            field: None,
            message: err.reason,
        }
    }
}

impl From<ParseParamError> for AppError {
    fn from(err: ParseParamError) -> Self {
        AppError::Malformed {
            field: Some(err.name.to_string()),
            message: err.reason,
        }
    }
}
