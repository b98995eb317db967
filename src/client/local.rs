//! The adapter for backends that live on the client itself: the on-device
//! SQLite database and the in-memory store.
//!
//! In these modes the stored credential is the raw password and login
//! compares it by direct equality. This mirrors the existing on-device
//! behavior and is weaker than the server's bcrypt hashing; it is accepted
//! only because the data never leaves the device. See DESIGN.md for the
//! decision record.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{
    Error,
    client::{
        adapter::PersistenceAdapter,
        session::{LOCAL_TOKEN, Session, SessionHandle, SessionUser},
    },
    db::initialize,
    models::{
        DatabaseID, NewTransactionData, PasswordHash, Transaction, UpdateTransactionData,
        UserProfile,
    },
    stores::{
        MemoryDatabase, MemoryTransactionStore, MemoryUserStore, SQLiteTransactionStore,
        SQLiteUserStore, TransactionStore, UserStore,
    },
};

/// An adapter over a pair of client-local stores.
#[derive(Debug, Clone)]
pub struct LocalAdapter<U, T>
where
    U: UserStore,
    T: TransactionStore,
{
    user_store: U,
    transaction_store: T,
    session: SessionHandle,
}

/// The adapter for the on-device SQLite database.
pub type DeviceAdapter = LocalAdapter<SQLiteUserStore, SQLiteTransactionStore>;

/// The adapter for the in-memory store used when no device database is
/// available.
pub type MockAdapter = LocalAdapter<MemoryUserStore, MemoryTransactionStore>;

impl<U, T> LocalAdapter<U, T>
where
    U: UserStore,
    T: TransactionStore,
{
    /// Create an adapter over the given stores, sharing `session` with the
    /// controller.
    pub fn new(user_store: U, transaction_store: T, session: SessionHandle) -> Self {
        Self {
            user_store,
            transaction_store,
            session,
        }
    }

    fn current_session(&self) -> Result<Session, Error> {
        self.session.current().ok_or(Error::MissingToken)
    }
}

impl DeviceAdapter {
    /// Open (or create) the device database at `path` and build an adapter
    /// over it.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or its tables
    /// cannot be created.
    pub fn open(path: &Path, session: SessionHandle) -> Result<Self, Error> {
        let connection = Connection::open(path)?;
        initialize(&connection)?;

        let connection = Arc::new(Mutex::new(connection));

        Ok(Self::new(
            SQLiteUserStore::new(connection.clone()),
            SQLiteTransactionStore::new(connection),
            session,
        ))
    }
}

impl MockAdapter {
    /// Build an adapter over `db`, the in-memory store shared within the
    /// session.
    pub fn over(db: MemoryDatabase, session: SessionHandle) -> Self {
        Self::new(
            MemoryUserStore::new(db.clone()),
            MemoryTransactionStore::new(db),
            session,
        )
    }
}

impl<U, T> PersistenceAdapter for LocalAdapter<U, T>
where
    U: UserStore,
    T: TransactionStore,
{
    async fn register(&mut self, username: &str, password: &str) -> Result<UserProfile, Error> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "username and password are required".to_owned(),
            ));
        }

        // The raw password is stored as-is in this mode.
        let user = self
            .user_store
            .create(username, PasswordHash::new_unchecked(password))?;

        Ok(user.profile())
    }

    async fn log_in(&mut self, username: &str, password: &str) -> Result<Session, Error> {
        let user = self
            .user_store
            .get_by_username(username.trim())
            .map_err(|e| match e {
                Error::NotFound => Error::InvalidCredentials,
                e => e,
            })?;

        if user.password_hash().as_str() != password {
            return Err(Error::InvalidCredentials);
        }

        let session = Session {
            user: SessionUser {
                id: user.id(),
                username: user.username().to_owned(),
            },
            token: LOCAL_TOKEN.to_owned(),
        };
        self.session.set(session.clone());

        Ok(session)
    }

    async fn transactions(&self) -> Result<Vec<Transaction>, Error> {
        let session = self.current_session()?;

        self.transaction_store.list(session.user.id)
    }

    async fn transaction(&self, transaction_id: DatabaseID) -> Result<Transaction, Error> {
        let session = self.current_session()?;

        self.transaction_store.get(session.user.id, transaction_id)
    }

    async fn create_transaction(
        &mut self,
        data: NewTransactionData,
    ) -> Result<Transaction, Error> {
        let session = self.current_session()?;
        let builder = data.into_builder(session.user.id)?;

        self.transaction_store.create(builder)
    }

    async fn update_transaction(
        &mut self,
        transaction_id: DatabaseID,
        data: UpdateTransactionData,
    ) -> Result<Transaction, Error> {
        let session = self.current_session()?;
        let changes = data.validate()?;

        self.transaction_store
            .update(session.user.id, transaction_id, changes)
    }

    async fn delete_transaction(&mut self, transaction_id: DatabaseID) -> Result<(), Error> {
        let session = self.current_session()?;

        self.transaction_store
            .delete(session.user.id, transaction_id)
    }
}
