//! The currency conversion passthrough.
//!
//! The backend does not interpret exchange rates: it validates that the
//! query parameters are present, forwards the request to the exchange rate
//! provider, and relays the provider's status and JSON payload verbatim.
//! There is no caching, no retrying and no rate limiting.

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{Error, state::ConversionState};

/// How long to wait for the provider before giving up on a conversion.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The provider's response to a conversion request, relayed as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    /// The HTTP status the provider answered with.
    pub status: u16,
    /// The JSON payload the provider answered with.
    pub payload: Value,
}

/// Forwards conversion requests to the exchange rate provider.
#[derive(Debug, Clone)]
pub struct ConversionGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ConversionGateway {
    /// Create a gateway for the provider at `base_url`, authenticated with
    /// `api_key`.
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Upstream(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    /// Forward one conversion request and relay the provider's response.
    ///
    /// The parameters are passed through as given; the provider does its own
    /// validation and its error payloads are relayed like its successes.
    ///
    /// # Errors
    /// Returns [Error::Upstream] if the request could not be sent or the
    /// response was not JSON.
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: &str,
    ) -> Result<UpstreamResponse, Error> {
        let url = format!(
            "{}/{}/pair/{}/{}/{}",
            self.base_url, self.api_key, from, to, amount
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        let status = response.status().as_u16();
        let payload = response
            .json()
            .await
            .map_err(|e| Error::Upstream(e.to_string()))?;

        Ok(UpstreamResponse { status, payload })
    }
}

/// The query parameters for a conversion request.
#[derive(Debug, Deserialize)]
pub struct ConversionParams {
    /// The currency code to convert from.
    pub from: Option<String>,
    /// The currency code to convert to.
    pub to: Option<String>,
    /// The amount to convert.
    pub amount: Option<String>,
}

/// A route handler that forwards a conversion request to the exchange rate
/// provider and relays its status and payload verbatim.
///
/// # Errors
/// Returns [Error::InvalidInput] if `from`, `to` or `amount` is missing, and
/// [Error::Upstream] if the provider could not be called.
pub async fn convert_currency(
    State(state): State<ConversionState>,
    Query(params): Query<ConversionParams>,
) -> Result<Response, Error> {
    let present = |value: Option<String>| value.filter(|v| !v.is_empty());

    let (Some(from), Some(to), Some(amount)) = (
        present(params.from),
        present(params.to),
        present(params.amount),
    ) else {
        return Err(Error::InvalidInput(
            "from, to and amount are required".to_owned(),
        ));
    };

    let upstream = state.gateway.convert(&from, &to, &amount).await?;

    let status =
        StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    Ok((status, Json(upstream.payload)).into_response())
}
