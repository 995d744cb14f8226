use crate::request::ErrorBody;
use crate::scorer::ScoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoreError),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::MalformedRequest(_) => "malformed_request",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::Scoring(_) => "scoring_failed",
        }
    }
}

impl From<actix_web::Error> for ApiError {
    /// Body extraction failures, e.g. the payload limit being hit
    fn from(err: actix_web::Error) -> Self {
        if err.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.to_string())
        } else {
            ApiError::MalformedRequest(err.to_string())
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Scoring(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind().to_owned(),
            message: self.to_string(),
        })
    }
}
