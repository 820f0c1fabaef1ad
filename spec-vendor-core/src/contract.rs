//! # contract: the seam between the pipelines and the code host
//!
//! The drift checker and the updater only ever talk to the upstream repository through
//! the [`Upstream`] trait defined here. Production code uses
//! [`HttpUpstream`](crate::download::HttpUpstream); tests plug in the generated
//! `MockUpstream`.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, exported under the `test-export-mocks` feature
//!   so integration tests in `tests/` and the CLI crate can use it.

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use thiserror::Error;

/// Failure talking to the upstream code host.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to download {url}: status {status}")]
    Status { url: String, status: u16 },
    #[error("failed to parse listing from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Kind of an entry in a remote directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One entry of a contents-API directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    /// Path relative to the repository root.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: RemoteKind,
}

impl RemoteEntry {
    pub fn is_yaml_file(&self) -> bool {
        self.kind == RemoteKind::File && self.name.ends_with(".yaml")
    }
}

/// Read access to the upstream repository.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Downloads raw file content. Any non-success status is an error.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Lists one directory (non-recursive), `path` relative to the repository root.
    async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, FetchError>;
}
