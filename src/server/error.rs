//! HTTP error mapping.
//!
//! Every failure leaves the server as `{"message": "..."}` with a status
//! code chosen per error kind. Internal details are logged, never sent.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::leads::LeadError;
use crate::rsvp::RsvpError;
use crate::update::UpdateError;

/// JSON body used for every message-only response.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller error
    #[error("{0}")]
    BadRequest(String),

    /// Unknown resource
    #[error("{0}")]
    NotFound(String),

    /// Downstream webhook failed
    #[error("{0}")]
    BadGateway(String),

    /// Anything else; the message is generic
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(MessageBody::new(self.to_string()))).into_response()
    }
}

impl From<UpdateError> for ApiError {
    fn from(err: UpdateError) -> Self {
        match err {
            UpdateError::InvalidRequest(message) => ApiError::BadRequest(message),
            UpdateError::UpdateFailed { .. } => {
                ApiError::Internal("Failed to update configuration".to_string())
            }
        }
    }
}

impl From<RsvpError> for ApiError {
    fn from(err: RsvpError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<LeadError> for ApiError {
    fn from(err: LeadError) -> Self {
        match err {
            LeadError::MissingFields(_) => ApiError::BadRequest(err.to_string()),
            LeadError::NotConfigured | LeadError::Forward(_) => {
                tracing::warn!(error = %err, "Lead forwarding failed");
                ApiError::BadGateway("Failed to submit lead".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
