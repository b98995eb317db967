//! The endpoint for logging in and issuing a session token.

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    Error,
    auth::encode_token,
    models::{Credentials, LogInResponse},
    state::LogInState,
    stores::UserStore,
};

/// A route handler for signing in a user.
///
/// On success the response carries the user's profile and a session token
/// valid for [TOKEN_DURATION](crate::auth::TOKEN_DURATION).
///
/// # Errors
/// Returns [Error::InvalidCredentials] whether the username is unknown or
/// the password is wrong, so the response does not reveal which accounts
/// exist.
pub async fn log_in<U>(
    State(state): State<LogInState<U>>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error>
where
    U: UserStore + Clone + Send + Sync,
{
    let (username, password) = credentials.validate()?;

    let user = state
        .user_store
        .get_by_username(&username)
        .map_err(|e| match e {
            Error::NotFound => Error::InvalidCredentials,
            e => e,
        })?;

    if !user.password_hash().verify(&password)? {
        return Err(Error::InvalidCredentials);
    }

    let token = encode_token(&user, &state.encoding_key)?;

    Ok(Json(LogInResponse {
        id: user.id(),
        username: user.username().to_owned(),
        token,
    }))
}
