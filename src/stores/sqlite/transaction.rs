//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Transaction, TransactionBuilder, TransactionChanges, UserID},
    stores::TransactionStore,
};

const COLUMNS: &str = "id, descricao, valor, tipo, categoria, data, usuario_id, sincronizado";

/// Stores transactions in a SQLite database.
///
/// Note that transactions reference the [User](crate::models::User) model,
/// so the user table must be set up in the same database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|_| Error::DatabaseLock)
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// # Errors
    /// Returns [Error::Sql] if there is an SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "INSERT INTO transacoes (descricao, valor, tipo, categoria, data, usuario_id, sincronizado)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    builder.description,
                    builder.amount,
                    builder.kind,
                    builder.category,
                    builder.date,
                    builder.user_id.as_i64(),
                    builder.synced,
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve the transactions owned by `user_id`, most recent first.
    ///
    /// # Errors
    /// Returns [Error::Sql] if there is an SQL error.
    fn list(&self, user_id: UserID) -> Result<Vec<Transaction>, Error> {
        self.lock()?
            .prepare(&format!(
                "SELECT {COLUMNS} FROM transacoes
                 WHERE usuario_id = :usuario_id
                 ORDER BY data DESC, id DESC"
            ))?
            .query_map(&[(":usuario_id", &user_id.as_i64())], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::Sql))
            .collect()
    }

    /// Retrieve one of `user_id`'s transactions by its `transaction_id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the ID does not refer to a transaction
    /// owned by `user_id`, or [Error::Sql] if there is some other SQL error.
    fn get(&self, user_id: UserID, transaction_id: DatabaseID) -> Result<Transaction, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "SELECT {COLUMNS} FROM transacoes WHERE id = ?1 AND usuario_id = ?2"
            ))?
            .query_row((transaction_id, user_id.as_i64()), Self::map_row)?;

        Ok(transaction)
    }

    /// Update the description, amount and category of one of `user_id`'s
    /// transactions.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the ID does not refer to a transaction
    /// owned by `user_id`, or [Error::Sql] if there is some other SQL error.
    fn update(
        &mut self,
        user_id: UserID,
        transaction_id: DatabaseID,
        changes: TransactionChanges,
    ) -> Result<Transaction, Error> {
        let transaction = self
            .lock()?
            .prepare(&format!(
                "UPDATE transacoes SET descricao = ?1, valor = ?2, categoria = ?3
                 WHERE id = ?4 AND usuario_id = ?5
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                (
                    changes.description,
                    changes.amount,
                    changes.category,
                    transaction_id,
                    user_id.as_i64(),
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Permanently delete one of `user_id`'s transactions.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the ID does not refer to a transaction
    /// owned by `user_id`, or [Error::Sql] if there is some other SQL error.
    fn delete(&mut self, user_id: UserID, transaction_id: DatabaseID) -> Result<(), Error> {
        let rows_deleted = self.lock()?.execute(
            "DELETE FROM transacoes WHERE id = ?1 AND usuario_id = ?2",
            (transaction_id, user_id.as_i64()),
        )?;

        if rows_deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS transacoes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    descricao TEXT NOT NULL,
                    valor REAL NOT NULL,
                    tipo TEXT NOT NULL,
                    categoria TEXT NOT NULL,
                    data TEXT NOT NULL,
                    usuario_id INTEGER NOT NULL,
                    sincronizado INTEGER NOT NULL DEFAULT 0,
                    FOREIGN KEY(usuario_id) REFERENCES usuarios(id)
                    )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let description = row.get(offset + 1)?;
        let amount = row.get(offset + 2)?;
        let kind = row.get(offset + 3)?;
        let category = row.get(offset + 4)?;
        let date = row.get(offset + 5)?;
        let user_id = UserID::new(row.get(offset + 6)?);
        let synced = row.get(offset + 7)?;

        Ok(Transaction::new_unchecked(
            id,
            description,
            amount,
            kind,
            category,
            date,
            user_id,
            synced,
        ))
    }
}

#[cfg(test)]
mod transaction_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        db::initialize,
        models::{PasswordHash, Transaction, TransactionChanges, User, UserID},
        stores::{TransactionStore, UserStore},
    };

    use super::{SQLiteTransactionStore, SQLiteUserStore};

    fn get_stores() -> (SQLiteUserStore, SQLiteTransactionStore) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));

        (
            SQLiteUserStore::new(conn.clone()),
            SQLiteTransactionStore::new(conn),
        )
    }

    fn get_store_with_user() -> (SQLiteTransactionStore, User) {
        let (mut user_store, transaction_store) = get_stores();
        let user = user_store
            .create("ana", PasswordHash::new_unchecked("hunter2"))
            .unwrap();

        (transaction_store, user)
    }

    fn salary(user_id: UserID) -> crate::models::TransactionBuilder {
        Transaction::build(
            "Salário".to_owned(),
            1000.0,
            "receita".to_owned(),
            "Trabalho".to_owned(),
            user_id,
        )
    }

    #[test]
    fn create_assigns_id_and_defaults() {
        let (mut store, user) = get_store_with_user();

        let before = OffsetDateTime::now_utc();
        let transaction = store.create(salary(user.id())).unwrap();

        assert!(transaction.id() > 0);
        assert_eq!(transaction.description(), "Salário");
        assert_eq!(transaction.amount(), 1000.0);
        assert_eq!(transaction.kind(), "receita");
        assert_eq!(transaction.category(), "Trabalho");
        assert_eq!(transaction.user_id(), user.id());
        assert!(!transaction.synced());
        assert!(transaction.date() >= before);
    }

    #[test]
    fn create_then_get_round_trips() {
        let (mut store, user) = get_store_with_user();

        let inserted = store
            .create(salary(user.id()).date(datetime!(2025-06-01 12:00 UTC)))
            .unwrap();

        let selected = store.get(user.id(), inserted.id()).unwrap();

        assert_eq!(selected, inserted);
    }

    #[test]
    fn list_orders_by_date_then_id_descending() {
        let (mut store, user) = get_store_with_user();

        let oldest = store
            .create(salary(user.id()).date(datetime!(2025-05-01 12:00 UTC)))
            .unwrap();
        let tied_first = store
            .create(salary(user.id()).date(datetime!(2025-06-01 12:00 UTC)))
            .unwrap();
        let tied_second = store
            .create(salary(user.id()).date(datetime!(2025-06-01 12:00 UTC)))
            .unwrap();

        let transactions = store.list(user.id()).unwrap();

        // Same date: the higher (more recently assigned) ID comes first.
        assert_eq!(transactions, vec![tied_second, tied_first, oldest]);
    }

    #[test]
    fn list_returns_only_the_users_transactions() {
        let (mut user_store, mut store) = get_stores();
        let ana = user_store
            .create("ana", PasswordHash::new_unchecked("hunter2"))
            .unwrap();
        let bob = user_store
            .create("bob", PasswordHash::new_unchecked("hunter3"))
            .unwrap();

        let anas_transaction = store.create(salary(ana.id())).unwrap();
        store.create(salary(bob.id())).unwrap();

        assert_eq!(store.list(ana.id()).unwrap(), vec![anas_transaction]);
    }

    #[test]
    fn list_is_empty_for_user_without_transactions() {
        let (store, user) = get_store_with_user();

        assert_eq!(store.list(user.id()).unwrap(), vec![]);
    }

    #[test]
    fn get_fails_for_another_users_transaction() {
        let (mut user_store, mut store) = get_stores();
        let ana = user_store
            .create("ana", PasswordHash::new_unchecked("hunter2"))
            .unwrap();
        let bob = user_store
            .create("bob", PasswordHash::new_unchecked("hunter3"))
            .unwrap();

        let anas_transaction = store.create(salary(ana.id())).unwrap();

        // Indistinguishable from a transaction that does not exist.
        assert_eq!(
            store.get(bob.id(), anas_transaction.id()),
            Err(Error::NotFound)
        );
        assert_eq!(store.get(ana.id(), 999), Err(Error::NotFound));
    }

    #[test]
    fn update_changes_only_the_editable_fields() {
        let (mut store, user) = get_store_with_user();

        let inserted = store.create(salary(user.id())).unwrap();

        let updated = store
            .update(
                user.id(),
                inserted.id(),
                TransactionChanges {
                    description: "Bônus".to_owned(),
                    amount: 1500.0,
                    category: "Extra".to_owned(),
                },
            )
            .unwrap();

        assert_eq!(updated.description(), "Bônus");
        assert_eq!(updated.amount(), 1500.0);
        assert_eq!(updated.category(), "Extra");
        // Kind, owner and date are untouched.
        assert_eq!(updated.kind(), inserted.kind());
        assert_eq!(updated.user_id(), inserted.user_id());
        assert_eq!(updated.date(), inserted.date());
    }

    #[test]
    fn update_fails_for_another_users_transaction() {
        let (mut user_store, mut store) = get_stores();
        let ana = user_store
            .create("ana", PasswordHash::new_unchecked("hunter2"))
            .unwrap();
        let bob = user_store
            .create("bob", PasswordHash::new_unchecked("hunter3"))
            .unwrap();

        let anas_transaction = store.create(salary(ana.id())).unwrap();

        let changes = TransactionChanges {
            description: "Bônus".to_owned(),
            amount: 1500.0,
            category: "Extra".to_owned(),
        };

        assert_eq!(
            store.update(bob.id(), anas_transaction.id(), changes),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_removes_the_transaction() {
        let (mut store, user) = get_store_with_user();

        let inserted = store.create(salary(user.id())).unwrap();

        store.delete(user.id(), inserted.id()).unwrap();

        assert_eq!(store.get(user.id(), inserted.id()), Err(Error::NotFound));
        assert_eq!(
            store.delete(user.id(), inserted.id()),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_fails_for_another_users_transaction() {
        let (mut user_store, mut store) = get_stores();
        let ana = user_store
            .create("ana", PasswordHash::new_unchecked("hunter2"))
            .unwrap();
        let bob = user_store
            .create("bob", PasswordHash::new_unchecked("hunter3"))
            .unwrap();

        let anas_transaction = store.create(salary(ana.id())).unwrap();

        assert_eq!(
            store.delete(bob.id(), anas_transaction.id()),
            Err(Error::NotFound)
        );
        // Ana can still see it.
        assert!(store.get(ana.id(), anas_transaction.id()).is_ok());
    }
}
