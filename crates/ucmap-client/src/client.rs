//! HTTP client for the unit backend.
//!
//! Wraps `reqwest` with timeout, bounded retry and lenient decoding of the
//! unit list. Use [`BackendClient::new`] with the loaded [`AppConfig`] or
//! [`BackendClient::with_base_url`] to point at a mock server in tests.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;
use ucmap_core::{AppConfig, BoundaryOverlay, NetworkRegistry, Unit, UnitCatalog};

use crate::error::ClientError;
use crate::retry::RetryPolicy;

const NETWORKS_PATH: &str = "unidades/redes";
const UNITS_PATH: &str = "unidades/all";
const FILTERED_UNITS_PATH: &str = "unidades/filtrar";

/// Transport settings shared by every request.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Longest wait between two attempts, whatever the retry count.
    pub max_backoff_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "ucmap/0.1 (unit-map)".to_owned(),
            max_retries: 2,
            backoff_base_ms: 500,
            max_backoff_ms: 30_000,
        }
    }
}

impl From<&AppConfig> for ClientOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            ..Self::default()
        }
    }
}

pub struct BackendClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl BackendClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if the configured base URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_base_url(&config.api_base_url, &ClientOptions::from(config))
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`ClientError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(base_url: &str, options: &ClientOptions) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            retry: RetryPolicy::from(options),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches the distinct network names, in backend order.
    ///
    /// Null and non-string entries are skipped.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] on transport failure.
    /// - [`ClientError::Deserialize`] if the body is not a JSON array.
    pub async fn fetch_networks(&self) -> Result<NetworkRegistry, ClientError> {
        let url = self.build_url(NETWORKS_PATH, &[])?;
        let body = self.get_json(&url).await?;
        let entries: Vec<Value> =
            serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
                context: "GET /unidades/redes".to_owned(),
                source: e,
            })?;

        let registry = NetworkRegistry::new(
            entries
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_owned)),
        );
        tracing::debug!(networks = registry.len(), "network list fetched");
        Ok(registry)
    }

    /// Fetches every unit.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] on transport failure.
    /// - [`ClientError::Deserialize`] if the body is not a JSON array.
    pub async fn fetch_units(&self) -> Result<Vec<Unit>, ClientError> {
        let url = self.build_url(UNITS_PATH, &[])?;
        let body = self.get_json(&url).await?;
        decode_units(body, "GET /unidades/all")
    }

    /// Fetches the units of the given networks, filtered server-side.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::fetch_units`].
    pub async fn fetch_units_by_network(
        &self,
        networks: &[&str],
    ) -> Result<Vec<Unit>, ClientError> {
        let params: Vec<(&str, &str)> = networks.iter().map(|n| ("rede", *n)).collect();
        let url = self.build_url(FILTERED_UNITS_PATH, &params)?;
        let body = self.get_json(&url).await?;
        decode_units(body, "GET /unidades/filtrar")
    }

    /// Fetches the network list and the unit list concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first error from either request.
    pub async fn fetch_catalog(&self) -> Result<(NetworkRegistry, UnitCatalog), ClientError> {
        let (registry, units) = tokio::try_join!(self.fetch_networks(), self.fetch_units())?;
        let catalog = UnitCatalog::new(units);
        tracing::info!(
            networks = registry.len(),
            units = catalog.len(),
            mappable = catalog.mappable_count(),
            "catalog loaded"
        );
        Ok((registry, catalog))
    }

    /// Fetches and parses the boundary overlay at an absolute URL.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidBaseUrl`] if `url` does not parse.
    /// - [`ClientError::Http`] / [`ClientError::UnexpectedStatus`] on transport failure.
    /// - [`ClientError::Deserialize`] if the body is not JSON.
    /// - [`ClientError::Overlay`] if the JSON is not a usable FeatureCollection.
    pub async fn fetch_overlay(&self, url: &str) -> Result<BoundaryOverlay, ClientError> {
        let url = Url::parse(url).map_err(|e| ClientError::InvalidBaseUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        let body = self.get_json(&url).await?;
        let overlay = BoundaryOverlay::from_geojson(&body)?;
        tracing::debug!(features = overlay.len(), "boundary overlay fetched");
        Ok(overlay)
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_json(&self, url: &Url) -> Result<Value, ClientError> {
        self.retry.run(|| self.request_json(url)).await
    }

    /// Sends one GET, asserts a 2xx status, and parses the body as JSON.
    async fn request_json(&self, url: &Url) -> Result<Value, ClientError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

/// Decodes a unit array record by record, skipping records that are not
/// objects of the expected shape.
fn decode_units(body: Value, context: &str) -> Result<Vec<Unit>, ClientError> {
    let records: Vec<Value> =
        serde_json::from_value(body).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })?;

    let total = records.len();
    let units: Vec<Unit> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Unit>(record) {
            Ok(unit) => Some(unit),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed unit record");
                None
            }
        })
        .collect();

    if units.len() < total {
        tracing::warn!(
            skipped = total - units.len(),
            total,
            "some unit records were malformed"
        );
    }
    Ok(units)
}
