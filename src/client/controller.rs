//! The application controller: the page flows of the app, parameterized by
//! the active persistence backend.
//!
//! One controller replaces the per-environment page scripts. It owns the
//! session lifecycle, guards the authenticated flows, and drives whichever
//! adapter was selected at start-up. The currency converter sits beside the
//! adapter: it always talks to the backend's passthrough route and never
//! touches transaction data.

use std::time::Duration;

use serde_json::Value;

use crate::{
    Error,
    client::{
        adapter::PersistenceAdapter,
        session::{Session, SessionHandle, SessionUser},
    },
    endpoints,
    models::{
        DatabaseID, EXPENSE, INCOME, NewTransactionData, Transaction, UpdateTransactionData,
        UserProfile,
    },
};

/// How many transactions the dashboard shows as "recent".
const RECENT_TRANSACTIONS: usize = 5;

/// How long to wait for the conversion route before giving up.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The dashboard aggregation: totals plus the most recent transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    /// The most recent transactions, at most [RECENT_TRANSACTIONS] of them.
    pub recent: Vec<Transaction>,
}

/// Calls the backend's conversion passthrough route.
#[derive(Debug, Clone)]
pub struct ConversionClient {
    client: reqwest::Client,
    base_url: String,
}

impl ConversionClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    /// Returns [Error::Network] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Convert `amount` from one currency to another and return the
    /// provider's payload as relayed by the backend.
    ///
    /// # Errors
    /// Returns [Error::Network] if the backend cannot be reached and
    /// [Error::Upstream] with the reported message if the conversion failed.
    pub async fn convert(&self, from: &str, to: &str, amount: &str) -> Result<Value, Error> {
        let url = format!("{}{}", self.base_url, endpoints::CONVERT_CURRENCY);

        let response = self
            .client
            .get(&url)
            .query(&[("from", from), ("to", to), ("amount", amount)])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = payload["error"]
                .as_str()
                .unwrap_or("conversion failed")
                .to_owned();
            return Err(Error::Upstream(message));
        }

        Ok(payload)
    }
}

/// The page-level glue of the app, driving one [PersistenceAdapter].
pub struct Controller<A>
where
    A: PersistenceAdapter,
{
    adapter: A,
    session: SessionHandle,
    converter: Option<ConversionClient>,
}

impl<A> Controller<A>
where
    A: PersistenceAdapter,
{
    /// Create a controller over `adapter`.
    ///
    /// `session` must be the same handle the adapter shares. `converter` is
    /// absent when no backend URL is configured, in which case the converter
    /// flow reports the backend as unreachable.
    pub fn new(adapter: A, session: SessionHandle, converter: Option<ConversionClient>) -> Self {
        Self {
            adapter,
            session,
            converter,
        }
    }

    /// The identity of the logged-in user, if any.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.current().map(|session| session.user)
    }

    fn require_login(&self) -> Result<(), Error> {
        if self.session.is_logged_in() {
            Ok(())
        } else {
            Err(Error::MissingToken)
        }
    }

    /// The registration flow.
    pub async fn register(&mut self, username: &str, password: &str) -> Result<UserProfile, Error> {
        self.adapter.register(username, password).await
    }

    /// The login flow: verify credentials and establish the session.
    pub async fn log_in(&mut self, username: &str, password: &str) -> Result<Session, Error> {
        self.adapter.log_in(username, password).await
    }

    /// The logout flow: discard the session. Purely client-side; the server
    /// keeps no session state to invalidate.
    pub fn log_out(&mut self) {
        self.session.clear();
    }

    /// The full transaction list, most recent first.
    pub async fn transactions(&self) -> Result<Vec<Transaction>, Error> {
        self.require_login()?;

        self.adapter.transactions().await
    }

    /// One transaction, for pre-filling the edit form.
    pub async fn transaction(&self, transaction_id: DatabaseID) -> Result<Transaction, Error> {
        self.require_login()?;

        self.adapter.transaction(transaction_id).await
    }

    /// The "add income" flow.
    pub async fn add_income(
        &mut self,
        description: &str,
        amount: f64,
        category: &str,
    ) -> Result<Transaction, Error> {
        self.add_transaction(INCOME, description, amount, category)
            .await
    }

    /// The "add expense" flow.
    pub async fn add_expense(
        &mut self,
        description: &str,
        amount: f64,
        category: &str,
    ) -> Result<Transaction, Error> {
        self.add_transaction(EXPENSE, description, amount, category)
            .await
    }

    async fn add_transaction(
        &mut self,
        kind: &str,
        description: &str,
        amount: f64,
        category: &str,
    ) -> Result<Transaction, Error> {
        self.require_login()?;

        self.adapter
            .create_transaction(NewTransactionData {
                description: Some(description.to_owned()),
                amount: Some(amount),
                kind: Some(kind.to_owned()),
                category: Some(category.to_owned()),
                date: None,
            })
            .await
    }

    /// The edit flow: change a transaction's description, amount and
    /// category.
    pub async fn edit_transaction(
        &mut self,
        transaction_id: DatabaseID,
        description: &str,
        amount: f64,
        category: &str,
    ) -> Result<Transaction, Error> {
        self.require_login()?;

        self.adapter
            .update_transaction(
                transaction_id,
                UpdateTransactionData {
                    description: Some(description.to_owned()),
                    amount: Some(amount),
                    category: Some(category.to_owned()),
                },
            )
            .await
    }

    /// The delete flow.
    pub async fn remove_transaction(&mut self, transaction_id: DatabaseID) -> Result<(), Error> {
        self.require_login()?;

        self.adapter.delete_transaction(transaction_id).await
    }

    /// The dashboard aggregation: income and expense totals, the balance,
    /// and the most recent transactions.
    pub async fn dashboard(&self) -> Result<DashboardSummary, Error> {
        let transactions = self.transactions().await?;

        let mut total_income = 0.0;
        let mut total_expense = 0.0;
        for transaction in &transactions {
            if transaction.kind() == INCOME {
                total_income += transaction.amount();
            } else {
                total_expense += transaction.amount();
            }
        }

        let mut recent = transactions;
        recent.truncate(RECENT_TRANSACTIONS);

        Ok(DashboardSummary {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            recent,
        })
    }

    /// The converter flow, beside the adapter path: always asks the backend
    /// to do the conversion.
    ///
    /// # Errors
    /// Returns [Error::Network] when no backend is configured, as in a
    /// device-only setup without connectivity.
    pub async fn convert(&self, from: &str, to: &str, amount: &str) -> Result<Value, Error> {
        match &self.converter {
            Some(converter) => converter.convert(from, to, amount).await,
            None => Err(Error::Network("no backend is configured".to_owned())),
        }
    }
}

#[cfg(test)]
mod controller_tests {
    use crate::{
        Error,
        client::{
            local::MockAdapter,
            session::SessionHandle,
        },
        stores::MemoryDatabase,
    };

    use super::Controller;

    fn get_controller() -> Controller<MockAdapter> {
        let session = SessionHandle::new();
        let adapter = MockAdapter::over(MemoryDatabase::new(), session.clone());

        Controller::new(adapter, session, None)
    }

    async fn logged_in_controller() -> Controller<MockAdapter> {
        let mut controller = get_controller();
        controller.register("ana", "pw1").await.unwrap();
        controller.log_in("ana", "pw1").await.unwrap();

        controller
    }

    #[tokio::test]
    async fn authenticated_flows_are_guarded_when_logged_out() {
        let controller = get_controller();

        assert_eq!(controller.transactions().await, Err(Error::MissingToken));
        assert_eq!(controller.dashboard().await, Err(Error::MissingToken));
        assert_eq!(controller.current_user(), None);
    }

    #[tokio::test]
    async fn log_in_establishes_the_session_and_log_out_clears_it() {
        let mut controller = logged_in_controller().await;

        let user = controller.current_user().unwrap();
        assert_eq!(user.username, "ana");

        controller.log_out();
        assert_eq!(controller.current_user(), None);
        assert_eq!(controller.transactions().await, Err(Error::MissingToken));
    }

    #[tokio::test]
    async fn add_income_and_add_expense_record_their_kinds() {
        let mut controller = logged_in_controller().await;

        let income = controller
            .add_income("Salário", 1000.0, "Trabalho")
            .await
            .unwrap();
        let expense = controller
            .add_expense("Mercado", 300.0, "Alimentação")
            .await
            .unwrap();

        assert_eq!(income.kind(), "receita");
        assert_eq!(expense.kind(), "despesa");
    }

    #[tokio::test]
    async fn dashboard_totals_and_balance() {
        let mut controller = logged_in_controller().await;

        controller
            .add_income("Salário", 1000.0, "Trabalho")
            .await
            .unwrap();
        controller
            .add_expense("Mercado", 300.0, "Alimentação")
            .await
            .unwrap();
        controller
            .add_expense("Transporte", 50.0, "Transporte")
            .await
            .unwrap();

        let summary = controller.dashboard().await.unwrap();

        assert_eq!(summary.total_income, 1000.0);
        assert_eq!(summary.total_expense, 350.0);
        assert_eq!(summary.balance, 650.0);
    }

    #[tokio::test]
    async fn dashboard_recent_is_a_prefix_of_the_full_list() {
        let mut controller = logged_in_controller().await;

        for i in 0..7 {
            controller
                .add_expense(&format!("gasto {i}"), 1.0, "Outros")
                .await
                .unwrap();
        }

        let all = controller.transactions().await.unwrap();
        let summary = controller.dashboard().await.unwrap();

        assert_eq!(summary.recent.len(), 5);
        assert_eq!(summary.recent[..], all[..5]);
    }

    #[tokio::test]
    async fn edit_and_remove_flow_through_the_adapter() {
        let mut controller = logged_in_controller().await;

        let created = controller
            .add_expense("Mercado", 300.0, "Alimentação")
            .await
            .unwrap();

        let updated = controller
            .edit_transaction(created.id(), "Feira", 250.0, "Alimentação")
            .await
            .unwrap();
        assert_eq!(updated.description(), "Feira");
        assert_eq!(updated.amount(), 250.0);

        controller.remove_transaction(created.id()).await.unwrap();
        assert_eq!(controller.transactions().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn convert_without_a_backend_reports_the_network_gap() {
        let controller = get_controller();

        assert!(matches!(
            controller.convert("USD", "BRL", "10").await,
            Err(Error::Network(_))
        ));
    }
}
