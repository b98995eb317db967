//! SQLite backed implementations of the store traits.
//!
//! The same table shapes serve both the server's database and the on-device
//! database, so a record created on the device can be reconciled with the
//! remote schema without translation.

mod transaction;
mod user;

pub use transaction::SQLiteTransactionStore;
pub use user::SQLiteUserStore;
