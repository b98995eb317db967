//! Implements a SQLite backed user store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{PasswordHash, User, UserID},
    stores::UserStore,
};

/// Stores users in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl UserStore for SQLiteUserStore {
    /// Create and insert a new user into the database.
    ///
    /// # Errors
    /// Returns [Error::DuplicateUsername] if the username is already taken,
    /// or [Error::Sql] if an SQL related error occurred.
    fn create(&mut self, username: &str, password_hash: PasswordHash) -> Result<User, Error> {
        let connection = self.connection.lock().map_err(|_| Error::DatabaseLock)?;

        connection.execute(
            "INSERT INTO usuarios (username, password_hash) VALUES (?1, ?2)",
            (username, password_hash.as_str()),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User::new(id, username.to_owned(), password_hash))
    }

    /// Get the user that has the specified `username`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no user with the specified
    /// username, or [Error::Sql] if there are SQL related errors.
    fn get_by_username(&self, username: &str) -> Result<User, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLock)?
            .prepare("SELECT id, username, password_hash FROM usuarios WHERE username = :username")?
            .query_row(&[(":username", username)], Self::map_row)
            .map_err(|e| e.into())
    }
}

impl CreateTable for SQLiteUserStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS usuarios (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteUserStore {
    type ReturnType = User;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_id = row.get(offset)?;
        let raw_username: String = row.get(offset + 1)?;
        let raw_password_hash: String = row.get(offset + 2)?;

        let id = UserID::new(raw_id);
        let password_hash = PasswordHash::new_unchecked(&raw_password_hash);

        Ok(User::new(id, raw_username, password_hash))
    }
}

#[cfg(test)]
mod user_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        db::CreateTable,
        models::PasswordHash,
        stores::UserStore,
    };

    use super::SQLiteUserStore;

    fn get_store() -> SQLiteUserStore {
        let conn = Connection::open_in_memory().unwrap();
        SQLiteUserStore::create_table(&conn).unwrap();

        SQLiteUserStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn insert_user_succeeds() {
        let mut store = get_store();

        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user = store.create("ana", password_hash.clone()).unwrap();

        assert!(inserted_user.id().as_i64() > 0);
        assert_eq!(inserted_user.username(), "ana");
        assert_eq!(inserted_user.password_hash(), &password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_username() {
        let mut store = get_store();

        assert!(
            store
                .create("ana", PasswordHash::new_unchecked("hunter2"))
                .is_ok()
        );

        assert_eq!(
            store.create("ana", PasswordHash::new_unchecked("hunter3")),
            Err(Error::DuplicateUsername)
        );
    }

    #[test]
    fn get_user_fails_with_non_existent_username() {
        let store = get_store();

        assert_eq!(store.get_by_username("nobody"), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_username() {
        let mut store = get_store();

        let test_user = store
            .create("ana", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        let retrieved_user = store.get_by_username("ana").unwrap();

        assert_eq!(retrieved_user, test_user);
    }
}
