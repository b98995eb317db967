//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).
//!
//! The traits are the contract every persistence backend implements: the
//! server's SQLite database, the on-device SQLite database, and the
//! in-memory store all expose the same operations with the same error
//! shapes, so the layers above never branch on which backend is active.

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryDatabase, MemoryTransactionStore, MemoryUserStore};
pub use sqlite::{SQLiteTransactionStore, SQLiteUserStore};

use crate::{
    Error,
    models::{
        DatabaseID, PasswordHash, Transaction, TransactionBuilder, TransactionChanges, User,
        UserID,
    },
};

/// Handles the creation and retrieval of users.
pub trait UserStore {
    /// Create a new user with the given stored credential.
    ///
    /// # Errors
    /// Returns [Error::DuplicateUsername] if the username is already taken.
    fn create(&mut self, username: &str, password_hash: PasswordHash) -> Result<User, Error>;

    /// Get a user by their username.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no user with the given username exists.
    fn get_by_username(&self, username: &str) -> Result<User, Error>;
}

/// Handles the creation and retrieval of transactions.
///
/// Every operation other than `create` takes the ID of the requesting user
/// and only sees that user's transactions: a transaction owned by someone
/// else is indistinguishable from one that does not exist.
pub trait TransactionStore {
    /// Create a new transaction in the store and assign it a fresh ID.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve all of `user_id`'s transactions, most recent first.
    ///
    /// Transactions are ordered by date descending, ties broken by ID
    /// descending.
    fn list(&self, user_id: UserID) -> Result<Vec<Transaction>, Error>;

    /// Retrieve one of `user_id`'s transactions by its ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the ID does not exist or the transaction
    /// belongs to another user.
    fn get(&self, user_id: UserID, transaction_id: DatabaseID) -> Result<Transaction, Error>;

    /// Apply `changes` to one of `user_id`'s transactions and return the
    /// updated transaction.
    ///
    /// The kind and owner cannot be changed after creation.
    ///
    /// # Errors
    /// Returns [Error::NotFound] with the same semantics as
    /// [TransactionStore::get].
    fn update(
        &mut self,
        user_id: UserID,
        transaction_id: DatabaseID,
        changes: TransactionChanges,
    ) -> Result<Transaction, Error>;

    /// Permanently delete one of `user_id`'s transactions.
    ///
    /// # Errors
    /// Returns [Error::NotFound] with the same semantics as
    /// [TransactionStore::get].
    fn delete(&mut self, user_id: UserID, transaction_id: DatabaseID) -> Result<(), Error>;
}
