use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::domain::model::ErrorResponse;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Parse error: {0}")]
    SymbolicError(#[from] symb_anafis::DiffError),

    #[error("Invalid variable name: '{name}'")]
    InvalidVariable { name: String },

    #[error("Computation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Internal error: {message}")]
    InternalError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl CalcError {
    pub fn parse(message: impl Into<String>) -> Self {
        CalcError::ParseError {
            message: message.into(),
        }
    }

    /// 對應的 HTTP 狀態碼
    pub fn status_code(&self) -> StatusCode {
        match self {
            CalcError::ParseError { .. }
            | CalcError::SymbolicError(_)
            | CalcError::InvalidVariable { .. } => StatusCode::BAD_REQUEST,
            CalcError::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CalcError::ConfigError { .. } | CalcError::InvalidConfigValueError { .. }
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CalcError::ParseError { .. } => "The expression could not be parsed".to_string(),
            CalcError::SymbolicError(e) => format!("The expression could not be differentiated: {}", e),
            CalcError::InvalidVariable { name } => {
                format!("'{}' is not a valid variable name", name)
            }
            CalcError::Timeout { .. } => "The computation took too long".to_string(),
            CalcError::IoError(e) => format!("File system error: {}", e),
            CalcError::ConfigError { message } => format!("Configuration problem: {}", message),
            CalcError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CalcError::ParseError { .. } | CalcError::SymbolicError(_) => {
                "Use Python-style syntax, e.g. 'x**2 + sin(x)' or 'exp(2*x)/x'"
            }
            CalcError::InvalidVariable { .. } => {
                "Variable names start with a letter or '_' and contain only letters, digits or '_'"
            }
            CalcError::Timeout { .. } => {
                "Simplify the expression or raise server.request_timeout_seconds"
            }
            CalcError::IoError(_) => "Check that the file exists and is readable",
            CalcError::ConfigError { .. } | CalcError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or the command line flags and restart"
            }
            _ => "Retry the request; if it keeps failing, check the server logs",
        }
    }
}

impl IntoResponse for CalcError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self);
        } else {
            tracing::warn!("⚠️ Rejected request: {}", self);
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CalcError::parse("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CalcError::InvalidVariable {
                name: "1x".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CalcError::from(symb_anafis::DiffError::EmptyFormula).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CalcError::Timeout { seconds: 3 }.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            CalcError::InternalError {
                message: "boom".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_config_errors_are_classified() {
        let err = CalcError::InvalidConfigValueError {
            field: "server.port".to_string(),
            value: "0".to_string(),
            reason: "Port must be between 1 and 65535".to_string(),
        };
        assert!(err.is_config_error());
        assert!(err.user_friendly_message().contains("server.port"));
        assert!(!CalcError::parse("x").is_config_error());
    }
}
