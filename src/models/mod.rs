//! The domain models of the application: users, their credentials, and the
//! income/expense transactions they record.

mod password;
mod transaction;
mod user;

pub use password::PasswordHash;
pub use transaction::{
    DatabaseID, EXPENSE, INCOME, NewTransactionData, Transaction, TransactionBuilder,
    TransactionChanges, UpdateTransactionData,
};
pub use user::{Credentials, LogInResponse, User, UserID, UserProfile};
