//! The endpoint for listing a user's transactions.

use axum::{Json, extract::State, response::IntoResponse};

use crate::{Error, auth::Claims, state::TransactionState, stores::TransactionStore};

/// A route handler for listing the requesting user's transactions, most
/// recent first.
///
/// Transactions are ordered by date descending, ties broken by ID
/// descending; other users' transactions are never included.
pub async fn get_transactions<T>(
    State(state): State<TransactionState<T>>,
    claims: Claims,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let transactions = state.transaction_store.list(claims.user_id())?;

    Ok(Json(transactions))
}
