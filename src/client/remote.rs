//! The adapter for the remote REST backend.
//!
//! Every operation is a network call. Failures surface as the same error
//! variants the local adapters produce, so the controller cannot tell the
//! backends apart. When the backend rejects the session token (401 or 403)
//! the shared session is cleared before the error surfaces, which forces the
//! controller back to the login flow.

use std::time::Duration;

use serde_json::{Value, json};

use crate::{
    Error,
    client::{
        adapter::PersistenceAdapter,
        session::{Session, SessionHandle},
    },
    endpoints,
    models::{
        DatabaseID, LogInResponse, NewTransactionData, Transaction, UpdateTransactionData,
        UserProfile,
    },
};

/// How long to wait for the backend before giving up on a request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// An adapter that forwards every operation to the remote REST backend.
#[derive(Debug, Clone)]
pub struct RemoteAdapter {
    client: reqwest::Client,
    base_url: String,
    session: SessionHandle,
}

impl RemoteAdapter {
    /// Create an adapter for the backend at `base_url`, sharing `session`
    /// with the controller.
    ///
    /// # Errors
    /// Returns [Error::Network] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, session: SessionHandle) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn transaction_url(&self, transaction_id: DatabaseID) -> String {
        format!("{}/{}", self.url(endpoints::TRANSACTIONS), transaction_id)
    }

    fn bearer_token(&self) -> Result<String, Error> {
        self.session
            .current()
            .map(|session| session.token)
            .ok_or(Error::MissingToken)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    /// Tear down the local session before surfacing a rejected token.
    fn check_session(&self, response: &reqwest::Response) -> Result<(), Error> {
        if matches!(response.status().as_u16(), 401 | 403) {
            self.session.clear();
            return Err(Error::InvalidToken);
        }

        Ok(())
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, Error> {
        response
            .json::<T>()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    /// Map an error response to the variant the local adapters would return.
    async fn error_from(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body["error"].as_str().map(str::to_owned));

        match status {
            400 => Error::InvalidInput(message.unwrap_or_else(|| "invalid request".to_owned())),
            404 => Error::NotFound,
            409 => Error::DuplicateUsername,
            status => Error::Api(status),
        }
    }
}

impl PersistenceAdapter for RemoteAdapter {
    async fn register(&mut self, username: &str, password: &str) -> Result<UserProfile, Error> {
        let request = self
            .client
            .post(self.url(endpoints::REGISTER))
            .json(&json!({ "username": username, "password": password }));

        let response = self.send(request).await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Self::parse(response).await
    }

    async fn log_in(&mut self, username: &str, password: &str) -> Result<Session, Error> {
        let request = self
            .client
            .post(self.url(endpoints::LOG_IN))
            .json(&json!({ "username": username, "password": password }));

        let response = self.send(request).await?;

        if response.status().as_u16() == 401 {
            self.session.clear();
            return Err(Error::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let session = Session::from(Self::parse::<LogInResponse>(response).await?);
        self.session.set(session.clone());

        Ok(session)
    }

    async fn transactions(&self) -> Result<Vec<Transaction>, Error> {
        let request = self
            .client
            .get(self.url(endpoints::TRANSACTIONS))
            .bearer_auth(self.bearer_token()?);

        let response = self.send(request).await?;
        self.check_session(&response)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Self::parse(response).await
    }

    async fn transaction(&self, transaction_id: DatabaseID) -> Result<Transaction, Error> {
        let request = self
            .client
            .get(self.transaction_url(transaction_id))
            .bearer_auth(self.bearer_token()?);

        let response = self.send(request).await?;
        self.check_session(&response)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Self::parse(response).await
    }

    async fn create_transaction(
        &mut self,
        data: NewTransactionData,
    ) -> Result<Transaction, Error> {
        let request = self
            .client
            .post(self.url(endpoints::TRANSACTIONS))
            .bearer_auth(self.bearer_token()?)
            .json(&data);

        let response = self.send(request).await?;
        self.check_session(&response)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Self::parse(response).await
    }

    async fn update_transaction(
        &mut self,
        transaction_id: DatabaseID,
        data: UpdateTransactionData,
    ) -> Result<Transaction, Error> {
        let request = self
            .client
            .put(self.transaction_url(transaction_id))
            .bearer_auth(self.bearer_token()?)
            .json(&data);

        let response = self.send(request).await?;
        self.check_session(&response)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Self::parse(response).await
    }

    async fn delete_transaction(&mut self, transaction_id: DatabaseID) -> Result<(), Error> {
        let request = self
            .client
            .delete(self.transaction_url(transaction_id))
            .bearer_auth(self.bearer_token()?);

        let response = self.send(request).await?;
        self.check_session(&response)?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }
}
