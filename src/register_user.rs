//! The endpoint for registering a new user.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    Error,
    models::{Credentials, PasswordHash},
    state::UserState,
    stores::UserStore,
};

/// A route handler for creating a new user.
///
/// The password is hashed before it is stored; the response carries only the
/// assigned ID and the username.
///
/// # Errors
/// Returns [Error::InvalidInput] if the username or password is missing or
/// empty, and [Error::DuplicateUsername] if the username is already taken.
pub async fn register_user<U>(
    State(state): State<UserState<U>>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error>
where
    U: UserStore + Clone + Send + Sync,
{
    let (username, password) = credentials.validate()?;
    let password_hash = PasswordHash::new(&password, PasswordHash::DEFAULT_COST)?;

    let mut user_store = state.user_store;
    let user = user_store.create(&username, password_hash)?;

    tracing::info!("registered user {}", user.id());

    Ok((StatusCode::CREATED, Json(user.profile())))
}
