use std::time::Duration;

use bon::Builder;
use reqwest::{
    Client as ReqwestClient, Method,
    header::{HeaderMap, HeaderValue},
};
use url::Url;

use super::types::{
    BalanceResponse, ChainRequest, ChainResponse, HistoryResponse, OperationsResponse,
};
use crate::error::Error;
use crate::{Result, ToQueryParams as _};

const DEFAULT_HISTORY_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`Client`]
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Upper bound for a history lookup. The default is sixty (60) seconds.
    #[builder(default = DEFAULT_HISTORY_TIMEOUT)]
    pub history_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// HTTP client for the ledger history service.
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    config: Config,
    client: ReqwestClient,
}

impl Client {
    /// Creates a new ledger client for `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid or the HTTP client fails to build.
    pub fn new(host: &str, config: Config) -> Result<Client> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("keeta_rfq_client"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self {
            host: Url::parse(host)?,
            config,
            client,
        })
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn url(&self, public_key: &str, view: &str) -> String {
        format!("{}ledger/v1/accounts/{public_key}/{view}", self.host)
    }

    async fn get<Response: serde::de::DeserializeOwned>(&self, url: String) -> Result<Response> {
        let request = self.client.request(Method::GET, url).build()?;
        crate::request(&self.client, request).await
    }

    /// History of vote staples touching `public_key`.
    ///
    /// # Errors
    ///
    /// Returns a timeout error when the service does not answer within
    /// [`Config::history_timeout`].
    pub async fn history(&self, public_key: &str) -> Result<HistoryResponse> {
        let limit = self.config.history_timeout;

        tokio::time::timeout(limit, self.get(self.url(public_key, "history")))
            .await
            .map_err(|_elapsed| {
                #[cfg(feature = "tracing")]
                tracing::warn!(public_key = %public_key, ?limit, "ledger history timed out");
                Error::timeout("ledger history", limit)
            })?
    }

    pub async fn chain(&self, public_key: &str, request: &ChainRequest) -> Result<ChainResponse> {
        let params = request.query_params(None);
        self.get(format!("{}{params}", self.url(public_key, "chain")))
            .await
    }

    pub async fn operations(&self, public_key: &str) -> Result<OperationsResponse> {
        self.get(self.url(public_key, "operations")).await
    }

    pub async fn balance(&self, public_key: &str) -> Result<BalanceResponse> {
        self.get(self.url(public_key, "balance")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_history_timeout_is_one_minute() {
        assert_eq!(Config::default().history_timeout, Duration::from_secs(60));
    }

    #[test]
    fn url_should_succeed() {
        let client = Client::new("http://localhost:4100", Config::default()).unwrap();
        assert_eq!(
            client.url("keeta_aqmaker", "balance"),
            "http://localhost:4100/ledger/v1/accounts/keeta_aqmaker/balance"
        );
    }
}
