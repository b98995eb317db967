//! The endpoint for getting a single transaction.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    Error,
    auth::Claims,
    models::DatabaseID,
    state::TransactionState,
    stores::TransactionStore,
};

/// A route handler for getting one of the requesting user's transactions by
/// its ID.
///
/// # Errors
/// Returns [Error::NotFound] when the ID does not exist, and identically
/// when it exists but belongs to another user, so that clients cannot learn
/// whether another user's resource exists.
pub async fn get_transaction<T>(
    State(state): State<TransactionState<T>>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let transaction = state
        .transaction_store
        .get(claims.user_id(), transaction_id)?;

    Ok(Json(transaction))
}
