//! The client layer: one controller over three interchangeable persistence
//! backends.
//!
//! The backend is selected once at start-up by capability detection (an
//! on-device database if one can be opened, the remote REST backend if a
//! URL is configured, the in-memory store otherwise) and injected into the
//! [Controller]. After that nothing branches on the active backend.

mod adapter;
mod controller;
mod local;
mod remote;
mod session;

use std::path::PathBuf;

pub use adapter::PersistenceAdapter;
pub use controller::{Controller, ConversionClient, DashboardSummary};
pub use local::{DeviceAdapter, LocalAdapter, MockAdapter};
pub use remote::RemoteAdapter;
pub use session::{LOCAL_TOKEN, Session, SessionHandle, SessionUser};

use crate::{
    Error,
    models::{
        DatabaseID, NewTransactionData, Transaction, UpdateTransactionData, UserProfile,
    },
    stores::MemoryDatabase,
};

/// What the client knows about its environment at start-up.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// The base URL of the remote backend, if one is configured.
    pub api_url: Option<String>,
    /// The path for the on-device database, if the device provides one.
    pub device_db_path: Option<PathBuf>,
}

/// The persistence backend selected at start-up.
///
/// Delegates every operation to the wrapped adapter; the controller only
/// ever sees the [PersistenceAdapter] surface.
pub enum ClientBackend {
    /// Every operation is a call to the remote REST backend.
    Remote(RemoteAdapter),
    /// Operations run against the on-device SQLite database.
    Device(DeviceAdapter),
    /// Operations run against an in-memory store.
    Mock(MockAdapter),
}

impl PersistenceAdapter for ClientBackend {
    async fn register(&mut self, username: &str, password: &str) -> Result<UserProfile, Error> {
        match self {
            Self::Remote(adapter) => adapter.register(username, password).await,
            Self::Device(adapter) => adapter.register(username, password).await,
            Self::Mock(adapter) => adapter.register(username, password).await,
        }
    }

    async fn log_in(&mut self, username: &str, password: &str) -> Result<Session, Error> {
        match self {
            Self::Remote(adapter) => adapter.log_in(username, password).await,
            Self::Device(adapter) => adapter.log_in(username, password).await,
            Self::Mock(adapter) => adapter.log_in(username, password).await,
        }
    }

    async fn transactions(&self) -> Result<Vec<Transaction>, Error> {
        match self {
            Self::Remote(adapter) => adapter.transactions().await,
            Self::Device(adapter) => adapter.transactions().await,
            Self::Mock(adapter) => adapter.transactions().await,
        }
    }

    async fn transaction(&self, transaction_id: DatabaseID) -> Result<Transaction, Error> {
        match self {
            Self::Remote(adapter) => adapter.transaction(transaction_id).await,
            Self::Device(adapter) => adapter.transaction(transaction_id).await,
            Self::Mock(adapter) => adapter.transaction(transaction_id).await,
        }
    }

    async fn create_transaction(
        &mut self,
        data: NewTransactionData,
    ) -> Result<Transaction, Error> {
        match self {
            Self::Remote(adapter) => adapter.create_transaction(data).await,
            Self::Device(adapter) => adapter.create_transaction(data).await,
            Self::Mock(adapter) => adapter.create_transaction(data).await,
        }
    }

    async fn update_transaction(
        &mut self,
        transaction_id: DatabaseID,
        data: UpdateTransactionData,
    ) -> Result<Transaction, Error> {
        match self {
            Self::Remote(adapter) => adapter.update_transaction(transaction_id, data).await,
            Self::Device(adapter) => adapter.update_transaction(transaction_id, data).await,
            Self::Mock(adapter) => adapter.update_transaction(transaction_id, data).await,
        }
    }

    async fn delete_transaction(&mut self, transaction_id: DatabaseID) -> Result<(), Error> {
        match self {
            Self::Remote(adapter) => adapter.delete_transaction(transaction_id).await,
            Self::Device(adapter) => adapter.delete_transaction(transaction_id).await,
            Self::Mock(adapter) => adapter.delete_transaction(transaction_id).await,
        }
    }
}

/// Pick the persistence backend for this run.
///
/// An on-device database wins when it can be opened; otherwise the remote
/// backend is used when a URL is configured; the in-memory store is the
/// last resort. The choice is made once and never revisited mid-session.
pub fn select_backend(
    config: &ClientConfig,
    session: SessionHandle,
) -> Result<ClientBackend, Error> {
    if let Some(path) = &config.device_db_path {
        match DeviceAdapter::open(path, session.clone()) {
            Ok(adapter) => return Ok(ClientBackend::Device(adapter)),
            Err(e) => {
                tracing::warn!("could not open the device database at {path:?}: {e}");
            }
        }
    }

    if let Some(api_url) = &config.api_url {
        return Ok(ClientBackend::Remote(RemoteAdapter::new(
            api_url, session,
        )?));
    }

    Ok(ClientBackend::Mock(MockAdapter::over(
        MemoryDatabase::new(),
        session,
    )))
}

/// Detect the environment once and assemble a ready-to-use controller.
pub fn bootstrap(config: &ClientConfig) -> Result<Controller<ClientBackend>, Error> {
    let session = SessionHandle::new();
    let backend = select_backend(config, session.clone())?;

    let converter = match &config.api_url {
        Some(api_url) => Some(ConversionClient::new(api_url)?),
        None => None,
    };

    Ok(Controller::new(backend, session, converter))
}


#[cfg(test)]
mod contract_parity_tests {
    //! The same controller flow must behave identically on every backend.

    use std::net::SocketAddr;

    use axum_server::Handle;

    use crate::{
        Error,
        currency::ConversionGateway,
        routing::build_router,
        state::AppState,
        stores::{MemoryDatabase, MemoryTransactionStore, MemoryUserStore},
    };

    use super::{
        Controller, DeviceAdapter, MockAdapter, PersistenceAdapter, RemoteAdapter, SessionHandle,
    };

    /// Serve the full backend over in-memory stores on a random localhost
    /// port.
    async fn spawn_backend() -> SocketAddr {
        let db = MemoryDatabase::new();
        let state = AppState::new(
            "42",
            MemoryUserStore::new(db.clone()),
            MemoryTransactionStore::new(db),
            ConversionGateway::new("http://127.0.0.1:1", "test-key").unwrap(),
        );

        let handle = Handle::new();
        tokio::spawn(
            axum_server::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
                .handle(handle.clone())
                .serve(build_router(state).into_make_service()),
        );

        handle
            .listening()
            .await
            .expect("Could not bind the test backend.")
    }

    /// The flow every backend must support identically.
    async fn exercise<A: PersistenceAdapter>(mut controller: Controller<A>) {
        assert_eq!(controller.transactions().await, Err(Error::MissingToken));

        controller.register("ana", "pw1").await.unwrap();
        assert_eq!(
            controller.register("ana", "pw2").await,
            Err(Error::DuplicateUsername)
        );
        assert_eq!(
            controller.log_in("ana", "nope").await,
            Err(Error::InvalidCredentials)
        );

        controller.log_in("ana", "pw1").await.unwrap();
        assert_eq!(controller.current_user().unwrap().username, "ana");

        let income = controller
            .add_income("Salário", 1000.0, "Trabalho")
            .await
            .unwrap();
        controller
            .add_expense("Mercado", 300.0, "Alimentação")
            .await
            .unwrap();

        let summary = controller.dashboard().await.unwrap();
        assert_eq!(summary.total_income, 1000.0);
        assert_eq!(summary.total_expense, 300.0);
        assert_eq!(summary.balance, 700.0);
        assert_eq!(summary.recent.len(), 2);

        let edited = controller
            .edit_transaction(income.id(), "Bônus", 1200.0, "Extra")
            .await
            .unwrap();
        assert_eq!(edited.description(), "Bônus");
        assert_eq!(edited.kind(), "receita");

        controller.remove_transaction(income.id()).await.unwrap();
        assert_eq!(controller.transactions().await.unwrap().len(), 1);

        controller.log_out();
        assert_eq!(controller.transactions().await, Err(Error::MissingToken));
    }

    #[tokio::test]
    async fn the_in_memory_backend_passes_the_shared_flow() {
        let session = SessionHandle::new();
        let adapter = MockAdapter::over(MemoryDatabase::new(), session.clone());

        exercise(Controller::new(adapter, session, None)).await;
    }

    #[tokio::test]
    async fn the_device_backend_passes_the_shared_flow() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionHandle::new();
        let adapter = DeviceAdapter::open(&dir.path().join("gastos.db"), session.clone()).unwrap();

        exercise(Controller::new(adapter, session, None)).await;
    }

    #[tokio::test]
    async fn the_remote_backend_passes_the_shared_flow() {
        let addr = spawn_backend().await;
        let session = SessionHandle::new();
        let adapter = RemoteAdapter::new(&format!("http://{addr}"), session.clone()).unwrap();

        exercise(Controller::new(adapter, session, None)).await;
    }
}
