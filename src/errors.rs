//! Unified error type for the admin directory service.
//!
//! Every fallible operation in the crate returns [`Result`]. At the HTTP boundary
//! the error is turned into one of a few fixed JSON bodies so that persistence or
//! report failures never leak internal detail to the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Message returned to callers without an `OWNER` session.
pub const ACCESS_DENIED_MESSAGE: &str = "Acesso negado";
/// Message returned for any unexpected failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor";
/// Message returned when a requested user does not exist.
pub const USER_NOT_FOUND_MESSAGE: &str = "Usuário não encontrado";

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any failure coming from the ORM or the underlying database
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The caller has no valid session or is not an `OWNER`
    #[error("Access denied")]
    AccessDenied,

    /// No `USER`-role record exists with this id
    #[error("User not found: {id}")]
    UserNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// A filter parameter could not be understood
    #[error("Invalid filter: {message}")]
    InvalidFilter {
        /// Description of the rejected value
        message: String,
    },

    /// A path parameter could not be parsed
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the rejected value
        message: String,
    },

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// PDF or CSV document assembly failed
    #[error("Report generation error: {message}")]
    Report {
        /// Description of the failure
        message: String,
    },

    /// The directory endpoint could not be reached or answered with an error status
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O failure (binding the listener, serving requests)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl Error {
    /// Status code and public message for this error.
    #[must_use]
    pub const fn public_parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::AccessDenied => (StatusCode::FORBIDDEN, ACCESS_DENIED_MESSAGE),
            Self::UserNotFound { .. } => (StatusCode::NOT_FOUND, USER_NOT_FOUND_MESSAGE),
            Self::InvalidFilter { .. } => (StatusCode::BAD_REQUEST, "Filtro inválido"),
            Self::InvalidParameter { .. } => (StatusCode::BAD_REQUEST, "Parâmetro inválido"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.public_parts();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_are_generic_500() {
        let err = Error::Database(sea_orm::DbErr::Custom("secret table".to_string()));
        let (status, message) = err.public_parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn test_access_denied_is_403() {
        let (status, message) = Error::AccessDenied.public_parts();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(message, ACCESS_DENIED_MESSAGE);
    }

    #[test]
    fn test_report_errors_are_generic_500() {
        let err = Error::Report {
            message: "font missing".to_string(),
        };
        assert_eq!(err.public_parts().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
