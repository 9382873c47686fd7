//! The Zotero local HTTP client.
//!
//! Read operations go to the local API, write operations to the Connector
//! API. Both live on the same local port but have different failure
//! semantics, so they get separate request helpers.

use crate::config::ZoteroConfig;
use crate::error::{Result, ZoteroError};
use reqwest::Client;

/// Async client for Zotero's local API and Connector endpoint.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> zotero_client::error::Result<()> {
/// let client = zotero_client::ZoteroClient::from_env()?;
/// let items = client.search_items("dark matter", 10).await?;
/// for item in &items {
///     println!("{} [{}]", item.title(), item.key);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ZoteroClient {
    pub(crate) http: Client,
    pub(crate) config: ZoteroConfig,
}

impl ZoteroClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ZoteroConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ZoteroError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create a client configured from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ZoteroConfig::from_env())
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ZoteroConfig {
        &self.config
    }

    /// Make a GET request to a library-scoped local API path
    /// (e.g. `/items` becomes `/users/0/items`).
    pub(crate) async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = format!(
            "{}{}{}",
            self.config.api_base_url,
            self.config.library_prefix(),
            path
        );
        let response = self
            .http
            .get(&url)
            .header("User-Agent", concat!("zotero-client/", env!("CARGO_PKG_VERSION")))
            .query(params)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        handle_response(response).await
    }

    /// Make a POST request with a JSON body to the Connector API.
    ///
    /// The Connector is the only write path; its failures carry
    /// caller-facing remediation (start Zotero vs. retry vs. fix payload).
    pub(crate) async fn connector_post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<String> {
        let url = format!("{}{}", self.config.connector_base_url, path);
        let response = self
            .http
            .post(&url)
            .header("User-Agent", concat!("zotero-client/", env!("CARGO_PKG_VERSION")))
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        handle_write_response(response).await
    }

    /// Liveness probe: ask the Connector ping endpoint whether Zotero is up.
    ///
    /// Never fails loudly; every network problem collapses to `false`.
    pub async fn is_running(&self) -> bool {
        let url = format!("{}/ping", self.config.connector_base_url);
        let response = self
            .http
            .get(&url)
            .timeout(self.config.ping_timeout)
            .send()
            .await;

        match response {
            Ok(resp) => match resp.text().await {
                Ok(body) => body.contains("Zotero"),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    /// Map transport failures to the caller-facing taxonomy: an unreachable
    /// endpoint means Zotero is not running, a timeout is its own condition,
    /// anything else is surfaced as-is. Nothing is retried by this layer.
    fn classify_transport_error(&self, e: reqwest::Error) -> ZoteroError {
        if e.is_timeout() {
            ZoteroError::Timeout {
                seconds: self.config.timeout.as_secs(),
            }
        } else if e.is_connect() {
            ZoteroError::NotRunning(e.to_string())
        } else {
            ZoteroError::Http(e)
        }
    }
}

/// Handle a read response, mapping status codes to errors. 404 gets its own
/// variant so point lookups can translate it to an explicit absence.
async fn handle_response(response: reqwest::Response) -> Result<String> {
    let status = response.status().as_u16();

    match status {
        200..=299 => Ok(response.text().await?),
        404 => Err(ZoteroError::NotFound("Resource not found".to_string())),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ZoteroError::Api {
                status,
                message: body,
            })
        }
    }
}

/// Handle a Connector write response. A 404 here is not an expected absence,
/// so every non-2xx status keeps the upstream status and body.
async fn handle_write_response(response: reqwest::Response) -> Result<String> {
    let status = response.status().as_u16();

    match status {
        200..=299 => Ok(response.text().await?),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ZoteroError::Api {
                status,
                message: body,
            })
        }
    }
}
