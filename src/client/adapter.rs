//! The persistence adapter contract.

use crate::{
    Error,
    client::session::Session,
    models::{DatabaseID, NewTransactionData, Transaction, UpdateTransactionData, UserProfile},
};

/// The uniform interface the controller drives, regardless of which backend
/// is active.
///
/// Every implementation returns the same success and error shapes, so the
/// controller never branches on the backend after start-up. `log_in` stores
/// the new session in the shared [SessionHandle](crate::client::SessionHandle);
/// the transaction operations read the handle for the acting identity and
/// fail with [Error::MissingToken] when no session is active.
#[allow(async_fn_in_trait)]
pub trait PersistenceAdapter {
    /// Register a new user.
    async fn register(&mut self, username: &str, password: &str) -> Result<UserProfile, Error>;

    /// Verify credentials and establish the active session.
    async fn log_in(&mut self, username: &str, password: &str) -> Result<Session, Error>;

    /// The logged-in user's transactions, most recent first.
    async fn transactions(&self) -> Result<Vec<Transaction>, Error>;

    /// One of the logged-in user's transactions by its ID.
    async fn transaction(&self, transaction_id: DatabaseID) -> Result<Transaction, Error>;

    /// Create a transaction owned by the logged-in user.
    async fn create_transaction(&mut self, data: NewTransactionData)
    -> Result<Transaction, Error>;

    /// Edit one of the logged-in user's transactions.
    async fn update_transaction(
        &mut self,
        transaction_id: DatabaseID,
        data: UpdateTransactionData,
    ) -> Result<Transaction, Error>;

    /// Permanently delete one of the logged-in user's transactions.
    async fn delete_transaction(&mut self, transaction_id: DatabaseID) -> Result<(), Error>;
}
