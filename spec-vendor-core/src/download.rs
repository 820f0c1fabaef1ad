use crate::config::UpstreamConfig;
use crate::contract::{FetchError, RemoteEntry, Upstream};
use reqwest::Client;
use tracing::{debug, error, info};

/// Sent on every request; the contents API rejects anonymous clients without one.
pub const USER_AGENT: &str = "opentdf-docs-spec-vendor";

/// [`Upstream`] backed by plain HTTPS requests to the code host.
pub struct HttpUpstream {
    client: Client,
    config: UpstreamConfig,
}

impl HttpUpstream {
    pub fn new(config: UpstreamConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| FetchError::Http {
                url: config.api_base.clone(),
                source,
            })?;
        Ok(Self { client, config })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        debug!(url, "Sending GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| {
                error!(url, error = ?source, "Request failed");
                FetchError::Http {
                    url: url.to_string(),
                    source,
                }
            })?;
        let status = response.status();
        if !status.is_success() {
            error!(url, status = %status, "Upstream returned error status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;
        info!(url, size = bytes.len(), "Downloaded upstream file");
        Ok(bytes.to_vec())
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, FetchError> {
        let url = self.config.contents_url(path);
        let body = self.fetch(&url).await?;
        let entries: Vec<RemoteEntry> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Json {
                url: url.clone(),
                source,
            })?;
        debug!(url = %url, count = entries.len(), "Listed upstream directory");
        Ok(entries)
    }
}
