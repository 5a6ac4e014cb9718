use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::intake::address::LookupError;
use crate::workflows::intake::encoder::EncodeError;
use crate::workflows::intake::fields::FieldError;
use crate::workflows::intake::report::ReportError;
use crate::workflows::intake::submission::{ChannelError, SubmissionError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Field(FieldError),
    Encoding(EncodeError),
    Submission(SubmissionError),
    Report(ReportError),
    Channel(ChannelError),
    Lookup(LookupError),
    AttachmentNotFound { index: usize },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Field(err) => write!(f, "field error: {}", err),
            AppError::Encoding(err) => write!(f, "encoding error: {}", err),
            AppError::Submission(err) => write!(f, "submission error: {}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
            AppError::Channel(err) => write!(f, "channel error: {}", err),
            AppError::Lookup(err) => write!(f, "address lookup error: {}", err),
            AppError::AttachmentNotFound { index } => {
                write!(f, "no attachment at index {}", index)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Field(err) => Some(err),
            AppError::Encoding(err) => Some(err),
            AppError::Submission(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::Channel(err) => Some(err),
            AppError::Lookup(err) => Some(err),
            AppError::AttachmentNotFound { .. } => None,
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Field(_) => StatusCode::BAD_REQUEST,
            AppError::AttachmentNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Encoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Submission(SubmissionError::Validation(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Submission(SubmissionError::Channels(_)) => StatusCode::BAD_GATEWAY,
            AppError::Report(ReportError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Report(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Channel(_)
            | AppError::Lookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Encoding(err) => json!({
                "error": self.to_string(),
                "message": err.user_message(),
            }),
            AppError::Submission(SubmissionError::Validation(err)) => json!({
                "error": self.to_string(),
                "message": err.message,
                "field": err.field,
                "focus": err.field.focus_target(),
            }),
            AppError::Submission(err) => json!({
                "error": self.to_string(),
                "message": err.user_message(),
                "failed_channels": err.failed_channels(),
            }),
            AppError::Report(err) => json!({
                "error": self.to_string(),
                "message": err.user_message(),
            }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<FieldError> for AppError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

impl From<EncodeError> for AppError {
    fn from(value: EncodeError) -> Self {
        Self::Encoding(value)
    }
}

impl From<SubmissionError> for AppError {
    fn from(value: SubmissionError) -> Self {
        Self::Submission(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

impl From<ChannelError> for AppError {
    fn from(value: ChannelError) -> Self {
        Self::Channel(value)
    }
}

impl From<LookupError> for AppError {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value)
    }
}
