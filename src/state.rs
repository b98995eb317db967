//! Implements a struct that holds the state of the REST server.

use axum::extract::FromRef;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{
    auth::TokenKeys,
    currency::ConversionGateway,
    stores::{TransactionStore, UserStore},
};

/// The state of the REST server.
///
/// Generic over the store implementations so that handler tests can swap in
/// the in-memory stores.
#[derive(Clone)]
pub struct AppState<U, T>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    /// The keys for signing and verifying session tokens.
    pub token_keys: TokenKeys,
    /// The store for registered users.
    pub user_store: U,
    /// The store for the users' transactions.
    pub transaction_store: T,
    /// The gateway that forwards conversion requests to the exchange rate
    /// provider.
    pub conversion_gateway: ConversionGateway,
}

impl<U, T> AppState<U, T>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    /// Create a new [AppState].
    ///
    /// `token_secret` is the secret the session token keys are derived from.
    pub fn new(
        token_secret: &str,
        user_store: U,
        transaction_store: T,
        conversion_gateway: ConversionGateway,
    ) -> Self {
        Self {
            token_keys: TokenKeys::from_secret(token_secret),
            user_store,
            transaction_store,
            conversion_gateway,
        }
    }
}

/// The state needed to validate session tokens on protected routes.
#[derive(Clone)]
pub struct AuthState {
    /// The key for verifying presented tokens.
    pub decoding_key: DecodingKey,
}

impl<U, T> FromRef<AppState<U, T>> for AuthState
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, T>) -> Self {
        Self {
            decoding_key: state.token_keys.decoding.clone(),
        }
    }
}

/// The state needed to register a new user.
#[derive(Clone)]
pub struct UserState<U>
where
    U: UserStore + Send + Sync,
{
    /// The store for registered users.
    pub user_store: U,
}

impl<U, T> FromRef<AppState<U, T>> for UserState<U>
where
    U: UserStore + Clone + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, T>) -> Self {
        Self {
            user_store: state.user_store.clone(),
        }
    }
}

/// The state needed to log a user in and issue a session token.
#[derive(Clone)]
pub struct LogInState<U>
where
    U: UserStore + Send + Sync,
{
    /// The store for registered users.
    pub user_store: U,
    /// The key for signing new session tokens.
    pub encoding_key: EncodingKey,
}

impl<U, T> FromRef<AppState<U, T>> for LogInState<U>
where
    U: UserStore + Clone + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, T>) -> Self {
        Self {
            user_store: state.user_store.clone(),
            encoding_key: state.token_keys.encoding.clone(),
        }
    }
}

/// The state needed to get or modify transactions.
#[derive(Clone)]
pub struct TransactionState<T>
where
    T: TransactionStore + Send + Sync,
{
    /// The store for the users' transactions.
    pub transaction_store: T,
}

impl<U, T> FromRef<AppState<U, T>> for TransactionState<T>
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<U, T>) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// The state needed to forward currency conversion requests.
#[derive(Clone)]
pub struct ConversionState {
    /// The gateway to the exchange rate provider.
    pub gateway: ConversionGateway,
}

impl<U, T> FromRef<AppState<U, T>> for ConversionState
where
    U: UserStore + Send + Sync,
    T: TransactionStore + Send + Sync,
{
    fn from_ref(state: &AppState<U, T>) -> Self {
        Self {
            gateway: state.conversion_gateway.clone(),
        }
    }
}
