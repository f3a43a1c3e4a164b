//! Remote row store connection management.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use campus_core::config::datastore::RemoteStoreConfig;
use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;

/// Client for the hosted row store's REST endpoint.
///
/// Every table maps to `{base_url}/{table}`; filters and ordering travel as
/// query parameters, rows as JSON arrays in the body.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    /// Shared HTTP client with default auth headers.
    http: reqwest::Client,
    /// REST endpoint base URL, without trailing slash.
    base_url: String,
}

impl RemoteStore {
    /// Create a new remote store client from configuration.
    pub fn new(config: &RemoteStoreConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid service key", e)
        })?;
        let bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.service_key)).map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid service key", e)
            })?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the shared HTTP client.
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Build the endpoint URL for a table.
    pub(crate) fn endpoint(&self, table: &str) -> String {
        format!("{}/{table}", self.base_url)
    }

    /// Get the base URL.
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a non-success response into the error taxonomy.
    ///
    /// 401/403 are policy rejections from the store's access rules; anything
    /// else non-success is a transport-level failure.
    pub(crate) async fn reject(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let excerpt: String = body.chars().take(200).collect();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            AppError::policy_denied(format!("Store rejected request ({status}): {excerpt}"))
        } else {
            AppError::transport(format!("Store request failed ({status}): {excerpt}"))
        }
    }
}
