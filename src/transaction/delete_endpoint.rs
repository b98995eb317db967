//! The endpoint for deleting a transaction.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    Error,
    auth::Claims,
    models::DatabaseID,
    state::TransactionState,
    stores::TransactionStore,
};

/// A route handler for permanently deleting one of the requesting user's
/// transactions.
///
/// Responds with 204 and an empty body on success.
///
/// # Errors
/// Returns [Error::NotFound] with the same ownership-opaque semantics as
/// [get_transaction](crate::transaction::get_transaction).
pub async fn delete_transaction<T>(
    State(state): State<TransactionState<T>>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let mut transaction_store = state.transaction_store;
    transaction_store.delete(claims.user_id(), transaction_id)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod delete_transaction_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        models::Transaction,
        transaction::test_utils::{sign_up, test_server},
    };

    async fn create_salary(server: &axum_test::TestServer, token: &str) -> Transaction {
        server
            .post("/transacoes")
            .authorization_bearer(token)
            .content_type("application/json")
            .json(&json!({
                "descricao": "Salário",
                "valor": 1000,
                "tipo": "receita",
                "categoria": "Trabalho",
            }))
            .await
            .json::<Transaction>()
    }

    #[tokio::test]
    async fn delete_responds_204_and_removes_the_transaction() {
        let server = test_server();
        let ana = sign_up(&server, "ana", "pw1").await;
        let created = create_salary(&server, &ana.token).await;

        let response = server
            .delete(&format!("/transacoes/{}", created.id()))
            .authorization_bearer(&ana.token)
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        assert!(response.text().is_empty());

        server
            .get(&format!("/transacoes/{}", created.id()))
            .authorization_bearer(&ana.token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_fails_with_404_for_a_missing_id() {
        let server = test_server();
        let ana = sign_up(&server, "ana", "pw1").await;

        server
            .delete("/transacoes/999")
            .authorization_bearer(&ana.token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_fails_with_404_for_another_users_transaction() {
        let server = test_server();
        let ana = sign_up(&server, "ana", "pw1").await;
        let bob = sign_up(&server, "bob", "pw2").await;
        let anas = create_salary(&server, &ana.token).await;

        server
            .delete(&format!("/transacoes/{}", anas.id()))
            .authorization_bearer(&bob.token)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        // Ana still sees her transaction.
        server
            .get(&format!("/transacoes/{}", anas.id()))
            .authorization_bearer(&ana.token)
            .await
            .assert_status_ok();
    }
}
