//! The endpoint for creating a transaction.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    Error,
    auth::Claims,
    models::NewTransactionData,
    state::TransactionState,
    stores::TransactionStore,
};

/// A route handler for creating a new transaction owned by the requesting
/// user.
///
/// The date defaults to the current time when the client does not supply
/// one.
///
/// # Errors
/// Returns [Error::InvalidInput] if a required field is missing or empty.
pub async fn create_transaction<T>(
    State(state): State<TransactionState<T>>,
    claims: Claims,
    Json(data): Json<NewTransactionData>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let builder = data.into_builder(claims.user_id())?;

    let mut transaction_store = state.transaction_store;
    let transaction = transaction_store.create(builder)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
