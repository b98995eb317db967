//! Defines the app level error type and its mapping to HTTP responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A request was missing required fields or contained empty values.
    ///
    /// The message describes which fields the client needs to fix.
    #[error("{0}")]
    InvalidInput(String),

    /// The username used to register already belongs to another user.
    #[error("the username is already in use")]
    DuplicateUsername,

    /// The username/password combination did not match a registered user.
    ///
    /// This error is the same whether the username does not exist or the
    /// password is wrong, so the response does not reveal which accounts
    /// exist.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A protected route was called without a bearer token.
    #[error("no session token was provided")]
    MissingToken,

    /// The bearer token failed signature or expiry validation.
    #[error("the session token is invalid or has expired")]
    InvalidToken,

    /// An unexpected error occurred while signing a session token.
    #[error("could not create a session token")]
    TokenCreation,

    /// The requested resource was not found.
    ///
    /// Also returned when a transaction exists but belongs to another user,
    /// so ownership cannot be probed through error responses.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The call to the exchange rate provider failed before a response was
    /// received.
    #[error("could not reach the conversion provider: {0}")]
    Upstream(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// Clients receive a generic internal server error instead.
    #[error("hashing failed: {0}")]
    Hashing(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(rusqlite::Error),

    /// An error occurred while serializing or parsing a JSON snapshot.
    #[error("could not serialize as JSON: {0}")]
    Json(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// A client-side request could not reach the backend at all.
    #[error("could not reach the server: {0}")]
    Network(String),

    /// The backend answered a client-side request with a status the adapter
    /// does not understand.
    #[error("the server returned an unexpected response (status {0})")]
    Api(u16),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::Sql(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Error::DuplicateUsername => (StatusCode::CONFLICT, self.to_string()),
            Error::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            Error::MissingToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            Error::InvalidToken => (StatusCode::FORBIDDEN, self.to_string()),
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Upstream(_) => {
                tracing::error!("conversion provider call failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "could not call the conversion provider".to_owned(),
                )
            }
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    #[test]
    fn unique_username_violation_maps_to_duplicate_username() {
        let error = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ffi::ErrorCode::ConstraintViolation,
                extended_code: 2067,
            },
            Some("UNIQUE constraint failed: usuarios.username".to_owned()),
        );

        assert_eq!(Error::from(error), Error::DuplicateUsername);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let response = Error::Hashing("bcrypt exploded".to_owned()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
