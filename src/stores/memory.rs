//! Implements in-memory backed stores.
//!
//! These back the browser-only mode, where no embedded database is
//! available. Data lives in a process-local collection shared by the user
//! and transaction stores; a JSON snapshot can be taken and restored so a
//! host can keep the state alive across page loads within one session. A
//! fresh [MemoryDatabase] starts empty, matching a new session.
//!
//! The snapshot layout (`usuarios`, `transacoes` and the two ID counters)
//! matches the session-storage blob written by the existing mobile clients.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    models::{
        DatabaseID, PasswordHash, Transaction, TransactionBuilder, TransactionChanges, User,
        UserID,
    },
    stores::{TransactionStore, UserStore},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<&StoredUser> for User {
    fn from(stored: &StoredUser) -> Self {
        User::new(
            UserID::new(stored.id),
            stored.username.clone(),
            PasswordHash::new_unchecked(&stored.password_hash),
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MemoryState {
    #[serde(rename = "usuarios")]
    users: Vec<StoredUser>,
    #[serde(rename = "transacoes")]
    transactions: Vec<Transaction>,
    #[serde(rename = "userIdCounter")]
    next_user_id: i64,
    #[serde(rename = "transacaoIdCounter")]
    next_transaction_id: i64,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            transactions: Vec::new(),
            next_user_id: 1,
            next_transaction_id: 1,
        }
    }
}

/// The shared collection behind [MemoryUserStore] and
/// [MemoryTransactionStore].
///
/// Cloning shares the underlying data, the same way the SQLite stores share
/// one connection.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the current contents as JSON.
    ///
    /// # Errors
    /// Returns [Error::Json] if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        let state = self.lock()?;
        serde_json::to_string(&*state).map_err(|e| Error::Json(e.to_string()))
    }

    /// Restore a database from a snapshot produced by
    /// [MemoryDatabase::to_json].
    ///
    /// # Errors
    /// Returns [Error::Json] if the snapshot cannot be parsed.
    pub fn from_json(snapshot: &str) -> Result<Self, Error> {
        let state: MemoryState =
            serde_json::from_str(snapshot).map_err(|e| Error::Json(e.to_string()))?;

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, Error> {
        self.state.lock().map_err(|_| Error::DatabaseLock)
    }
}

/// Stores users in a [MemoryDatabase].
#[derive(Debug, Clone)]
pub struct MemoryUserStore {
    db: MemoryDatabase,
}

impl MemoryUserStore {
    /// Create a new store over `db`.
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

impl UserStore for MemoryUserStore {
    fn create(&mut self, username: &str, password_hash: PasswordHash) -> Result<User, Error> {
        let mut state = self.db.lock()?;

        if state.users.iter().any(|user| user.username == username) {
            return Err(Error::DuplicateUsername);
        }

        let stored = StoredUser {
            id: state.next_user_id,
            username: username.to_owned(),
            password_hash: password_hash.as_str().to_owned(),
        };
        state.next_user_id += 1;

        let user = User::from(&stored);
        state.users.push(stored);

        Ok(user)
    }

    fn get_by_username(&self, username: &str) -> Result<User, Error> {
        self.db
            .lock()?
            .users
            .iter()
            .find(|user| user.username == username)
            .map(User::from)
            .ok_or(Error::NotFound)
    }
}

/// Stores transactions in a [MemoryDatabase].
///
/// Reproduces the same ordering and ownership-filtering semantics as
/// [SQLiteTransactionStore](crate::stores::SQLiteTransactionStore).
#[derive(Debug, Clone)]
pub struct MemoryTransactionStore {
    db: MemoryDatabase,
}

impl MemoryTransactionStore {
    /// Create a new store over `db`.
    pub fn new(db: MemoryDatabase) -> Self {
        Self { db }
    }
}

impl TransactionStore for MemoryTransactionStore {
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let mut state = self.db.lock()?;

        let transaction = Transaction::new_unchecked(
            state.next_transaction_id,
            builder.description,
            builder.amount,
            builder.kind,
            builder.category,
            builder.date,
            builder.user_id,
            builder.synced,
        );
        state.next_transaction_id += 1;

        state.transactions.push(transaction.clone());

        Ok(transaction)
    }

    fn list(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        let state = self.db.lock()?;

        let mut transactions: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|transaction| transaction.user_id() == user_id)
            .cloned()
            .collect();

        transactions.sort_by(|a, b| b.date().cmp(&a.date()).then(b.id().cmp(&a.id())));

        Ok(transactions)
    }

    fn get(&self, user_id: UserID, transaction_id: DatabaseID) -> Result<Transaction, Error> {
        self.db
            .lock()?
            .transactions
            .iter()
            .find(|transaction| {
                transaction.id() == transaction_id && transaction.user_id() == user_id
            })
            .cloned()
            .ok_or(Error::NotFound)
    }

    fn update(
        &mut self,
        user_id: UserID,
        transaction_id: DatabaseID,
        changes: TransactionChanges,
    ) -> Result<Transaction, Error> {
        let mut state = self.db.lock()?;

        let transaction = state
            .transactions
            .iter_mut()
            .find(|transaction| {
                transaction.id() == transaction_id && transaction.user_id() == user_id
            })
            .ok_or(Error::NotFound)?;

        *transaction = Transaction::new_unchecked(
            transaction.id(),
            changes.description,
            changes.amount,
            transaction.kind().to_owned(),
            changes.category,
            transaction.date(),
            transaction.user_id(),
            transaction.synced(),
        );

        Ok(transaction.clone())
    }

    fn delete(&mut self, user_id: UserID, transaction_id: DatabaseID) -> Result<(), Error> {
        let mut state = self.db.lock()?;

        let initial_length = state.transactions.len();
        state.transactions.retain(|transaction| {
            transaction.id() != transaction_id || transaction.user_id() != user_id
        });

        if state.transactions.len() == initial_length {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}
