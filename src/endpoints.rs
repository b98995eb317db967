//! The API endpoint URIs.
//!
//! The paths keep the Portuguese names the existing mobile clients call.

/// The route for registering a new user.
pub const REGISTER: &str = "/registrar";
/// The route for logging in and obtaining a session token.
pub const LOG_IN: &str = "/login";
/// The route for listing and creating transactions.
pub const TRANSACTIONS: &str = "/transacoes";
/// The route for getting, updating or deleting a single transaction.
pub const TRANSACTION: &str = "/transacoes/{transaction_id}";
/// The route that forwards currency conversion requests.
pub const CONVERT_CURRENCY: &str = "/converter-moeda";
