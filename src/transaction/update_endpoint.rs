//! The endpoint for editing a transaction.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    Error,
    auth::Claims,
    models::{DatabaseID, UpdateTransactionData},
    state::TransactionState,
    stores::TransactionStore,
};

/// A route handler for updating the description, amount and category of one
/// of the requesting user's transactions.
///
/// The kind and owner are fixed at creation and are not part of the request
/// body.
///
/// # Errors
/// Returns [Error::InvalidInput] if a field is missing or empty, and
/// [Error::NotFound] with the same ownership-opaque semantics as
/// [get_transaction](crate::transaction::get_transaction).
pub async fn update_transaction<T>(
    State(state): State<TransactionState<T>>,
    claims: Claims,
    Path(transaction_id): Path<DatabaseID>,
    Json(data): Json<UpdateTransactionData>,
) -> Result<impl IntoResponse, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let changes = data.validate()?;

    let mut transaction_store = state.transaction_store;
    let transaction = transaction_store.update(claims.user_id(), transaction_id, changes)?;

    Ok(Json(transaction))
}

#[cfg(test)]
mod update_transaction_tests {
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
    async fn update_changes_the_editable_fields() {
        let server = test_server();
        let ana = sign_up(&server, "ana", "pw1").await;
        let created = create_salary(&server, &ana.token).await;

        let response = server
            .put(&format!("/transacoes/{}", created.id()))
            .authorization_bearer(&ana.token)
            .content_type("application/json")
            .json(&json!({
                "descricao": "Bônus",
                "valor": 1500,
                "categoria": "Extra",
            }))
            .await;

        response.assert_status_ok();

        let updated = response.json::<Transaction>();
        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.description(), "Bônus");
        assert_eq!(updated.amount(), 1500.0);
        assert_eq!(updated.category(), "Extra");
        // Kind and owner cannot change.
        assert_eq!(updated.kind(), "receita");
        assert_eq!(updated.user_id(), created.user_id());
    }

    #[tokio::test]
    async fn update_fails_with_400_on_missing_fields() {
        let server = test_server();
        let ana = sign_up(&server, "ana", "pw1").await;
        let created = create_salary(&server, &ana.token).await;

        server
            .put(&format!("/transacoes/{}", created.id()))
            .authorization_bearer(&ana.token)
            .content_type("application/json")
            .json(&json!({ "descricao": "Bônus", "valor": 1500 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_fails_with_404_for_another_users_transaction() {
        let server = test_server();
        let ana = sign_up(&server, "ana", "pw1").await;
        let bob = sign_up(&server, "bob", "pw2").await;
        let anas = create_salary(&server, &ana.token).await;

        server
            .put(&format!("/transacoes/{}", anas.id()))
            .authorization_bearer(&bob.token)
            .content_type("application/json")
            .json(&json!({
                "descricao": "Bônus",
                "valor": 1500,
                "categoria": "Extra",
            }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
