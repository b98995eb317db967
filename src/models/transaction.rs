//! This file defines the type `Transaction`, the core type of the
//! application, along with the builder and change-set types the stores and
//! route handlers use.
//!
//! The wire names (`descricao`, `valor`, `tipo`, `categoria`, `data`,
//! `usuario_id`, `sincronizado`) are kept for compatibility with the existing
//! mobile clients, while the Rust identifiers use English names.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::{Error, models::UserID};

/// An alias for transaction IDs assigned by the active store.
pub type DatabaseID = i64;

/// The kind string for income transactions.
pub const INCOME: &str = "receita";
/// The kind string for expense transactions.
pub const EXPENSE: &str = "despesa";

/// An income or expense recorded by one user.
///
/// To create a new `Transaction`, use [Transaction::build] and pass the
/// builder to a [TransactionStore](crate::stores::TransactionStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: DatabaseID,
    #[serde(rename = "descricao")]
    description: String,
    #[serde(rename = "valor")]
    amount: f64,
    #[serde(rename = "tipo")]
    kind: String,
    #[serde(rename = "categoria")]
    category: String,
    #[serde(rename = "data", with = "time::serde::rfc3339")]
    date: OffsetDateTime,
    #[serde(rename = "usuario_id")]
    user_id: UserID,
    #[serde(rename = "sincronizado", default)]
    synced: bool,
}

impl Transaction {
    /// Create a new transaction builder.
    ///
    /// Shortcut for [TransactionBuilder::new] for discoverability.
    pub fn build(
        description: String,
        amount: f64,
        kind: String,
        category: String,
        user_id: UserID,
    ) -> TransactionBuilder {
        TransactionBuilder::new(description, amount, kind, category, user_id)
    }

    /// Create a transaction from its parts without validation.
    ///
    /// This is intended for store implementations reconstructing a
    /// transaction from persisted data.
    #[allow(clippy::too_many_arguments)]
    pub fn new_unchecked(
        id: DatabaseID,
        description: String,
        amount: f64,
        kind: String,
        category: String,
        date: OffsetDateTime,
        user_id: UserID,
        synced: bool,
    ) -> Self {
        Self {
            id,
            description,
            amount,
            kind,
            category,
            date,
            user_id,
            synced,
        }
    }

    /// The ID of the transaction.
    pub fn id(&self) -> DatabaseID {
        self.id
    }

    /// A text description of what the transaction was for.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The amount of money spent or earned in this transaction.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Whether this transaction is an income (`"receita"`) or an expense
    /// (`"despesa"`).
    ///
    /// The stores record this string as given and do not validate it.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// A free-text category for grouping transactions.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// When the transaction happened.
    pub fn date(&self) -> OffsetDateTime {
        self.date
    }

    /// The ID of the user that owns this transaction.
    pub fn user_id(&self) -> UserID {
        self.user_id
    }

    /// Whether this record has been reconciled with a remote store.
    ///
    /// Recorded for the on-device store but never consumed by any routine;
    /// kept so the column round-trips faithfully.
    pub fn synced(&self) -> bool {
        self.synced
    }
}

/// Builder for creating a new [Transaction].
///
/// The store assigns the ID; the date defaults to the current time (UTC)
/// when not supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether the transaction is an income or an expense.
    pub kind: String,
    /// A free-text category for grouping transactions.
    pub category: String,
    /// When the transaction happened.
    pub date: OffsetDateTime,
    /// The ID of the owning user.
    pub user_id: UserID,
    /// Whether the record has been reconciled with a remote store.
    pub synced: bool,
}

impl TransactionBuilder {
    /// Create a builder with the date defaulted to now (UTC) and the sync
    /// flag cleared.
    pub fn new(
        description: String,
        amount: f64,
        kind: String,
        category: String,
        user_id: UserID,
    ) -> Self {
        Self {
            description,
            amount,
            kind,
            category,
            date: OffsetDateTime::now_utc(),
            user_id,
            synced: false,
        }
    }

    /// Set the date for the transaction.
    ///
    /// The date is normalized to UTC so that stored timestamps sort
    /// consistently.
    pub fn date(mut self, date: OffsetDateTime) -> Self {
        self.date = date.to_offset(UtcOffset::UTC);
        self
    }

    /// Set the sync flag for the transaction.
    pub fn synced(mut self, synced: bool) -> Self {
        self.synced = synced;
        self
    }
}

/// The request body for creating a transaction.
///
/// All fields are optional so that missing fields produce a 400 response
/// instead of a deserialization rejection. Clients may omit the date; the
/// store defaults it to the creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransactionData {
    /// A text description of what the transaction was for.
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    /// The amount of money spent or earned.
    #[serde(rename = "valor")]
    pub amount: Option<f64>,
    /// Whether the transaction is an income or an expense.
    #[serde(rename = "tipo")]
    pub kind: Option<String>,
    /// A free-text category for grouping transactions.
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    /// When the transaction happened. Defaults to now when omitted.
    #[serde(rename = "data", default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

impl NewTransactionData {
    /// Check that all required fields are present and non-empty, and build
    /// the transaction for `user_id`.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] naming the problem if any required
    /// field is missing or empty.
    pub fn into_builder(self, user_id: UserID) -> Result<TransactionBuilder, Error> {
        let missing =
            || Error::InvalidInput("descricao, valor, tipo and categoria are required".to_owned());

        let description = self.description.unwrap_or_default();
        let kind = self.kind.unwrap_or_default();
        let category = self.category.unwrap_or_default();
        let amount = self.amount.ok_or_else(missing)?;

        if description.is_empty() || kind.is_empty() || category.is_empty() {
            return Err(missing());
        }

        let builder = Transaction::build(description, amount, kind, category, user_id);

        Ok(match self.date {
            Some(date) => builder.date(date),
            None => builder,
        })
    }
}

/// The request body for updating a transaction, and the validated change set
/// applied by the stores.
///
/// The transaction's kind and owner are fixed at creation and cannot be
/// changed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTransactionData {
    /// The new description.
    #[serde(rename = "descricao")]
    pub description: Option<String>,
    /// The new amount.
    #[serde(rename = "valor")]
    pub amount: Option<f64>,
    /// The new category.
    #[serde(rename = "categoria")]
    pub category: Option<String>,
}

impl UpdateTransactionData {
    /// Check that all fields are present and non-empty.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if any field is missing or empty.
    pub fn validate(self) -> Result<TransactionChanges, Error> {
        let missing =
            || Error::InvalidInput("descricao, valor and categoria are required".to_owned());

        let description = self.description.unwrap_or_default();
        let category = self.category.unwrap_or_default();
        let amount = self.amount.ok_or_else(missing)?;

        if description.is_empty() || category.is_empty() {
            return Err(missing());
        }

        Ok(TransactionChanges {
            description,
            amount,
            category,
        })
    }
}

/// The validated fields an update may change.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionChanges {
    /// The new description.
    pub description: String,
    /// The new amount.
    pub amount: f64,
    /// The new category.
    pub category: String,
}
