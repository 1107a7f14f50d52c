use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::entities::AlertStatus;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Feed disconnected or ingest task gone. Views keep the last snapshot.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Alert {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: AlertStatus,
        to: AlertStatus,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Invalid grid size: {0}")]
    InvalidGridSize(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::DataUnavailable(_) => "DATA_UNAVAILABLE",
            Error::MalformedRecord(_) => "MALFORMED_RECORD",
            Error::InvalidTransition { .. } => "INVALID_TRANSITION",
            Error::NotFound(_) => "NOT_FOUND",
            Error::InvalidPeriod(_) => "INVALID_PERIOD",
            Error::InvalidGridSize(_) => "INVALID_GRID_SIZE",
            Error::Config(_) => "CONFIG_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::MalformedRecord(_)
            | Error::InvalidPeriod(_)
            | Error::InvalidGridSize(_) => StatusCode::BAD_REQUEST,
            Error::InvalidTransition { .. } => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Config(_) | Error::Serialization(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::warn!(code = self.code(), "{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::NotFound("ALT-1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::InvalidTransition {
                id: "ALT-1".into(),
                from: AlertStatus::Resolved,
                to: AlertStatus::Pending,
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(Error::InvalidGridSize("5".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::DataUnavailable("feed closed".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_transition_message() {
        let err = Error::InvalidTransition {
            id: "ALT-1".into(),
            from: AlertStatus::Resolved,
            to: AlertStatus::Processing,
        };
        assert_eq!(err.to_string(), "Alert ALT-1 cannot move from resolved to processing");
    }
}
