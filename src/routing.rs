//! Application router configuration.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    currency::convert_currency,
    endpoints,
    log_in::log_in,
    register_user::register_user,
    state::AppState,
    stores::{TransactionStore, UserStore},
    transaction::{
        create_transaction, delete_transaction, get_transaction, get_transactions,
        update_transaction,
    },
};

/// Return a router with all the app's routes.
///
/// Registration, login and the conversion passthrough are open; the
/// transaction routes require a valid bearer token.
pub fn build_router<U, T>(state: AppState<U, T>) -> Router
where
    U: UserStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::REGISTER, post(register_user::<U>))
        .route(endpoints::LOG_IN, post(log_in::<U>))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions::<T>).post(create_transaction::<T>),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction::<T>)
                .put(update_transaction::<T>)
                .delete(delete_transaction::<T>),
        )
        .route(endpoints::CONVERT_CURRENCY, get(convert_currency))
        .with_state(state)
}
