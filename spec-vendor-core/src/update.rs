use crate::contract::{FetchError, Upstream};
use crate::registry::SpecEntry;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct UpdateFailure {
    pub id: String,
    pub path: PathBuf,
    pub error: UpdateError,
}

#[derive(Debug, Default)]
pub struct UpdateReport {
    pub updated: Vec<PathBuf>,
    pub failures: Vec<UpdateFailure>,
}

impl UpdateReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Overwrites every vendored spec that has an upstream URL with the current upstream content.
///
/// A failed entry is logged and recorded; the remaining entries are still updated.
pub async fn update_vendored<U>(upstream: &U, specs: &[SpecEntry]) -> UpdateReport
where
    U: Upstream + ?Sized,
{
    let mut report = UpdateReport::default();
    for spec in specs {
        let Some(url) = spec.upstream_url.as_deref() else {
            continue;
        };
        let path = &spec.source_path;
        info!(id = %spec.id, "Downloading {url} → {}", path.display());

        match update_one(upstream, url, path).await {
            Ok(()) => {
                info!(id = %spec.id, path = %path.display(), "Updated vendored spec");
                report.updated.push(path.clone());
            }
            Err(e) => {
                error!(id = %spec.id, path = %path.display(), error = %e, "Failed to update vendored spec");
                report.failures.push(UpdateFailure {
                    id: spec.id.clone(),
                    path: path.clone(),
                    error: e,
                });
            }
        }
    }
    info!(
        updated = report.updated.len(),
        failed = report.failures.len(),
        "Vendored OpenAPI YAML files updated"
    );
    report
}

async fn update_one<U>(upstream: &U, url: &str, path: &Path) -> Result<(), UpdateError>
where
    U: Upstream + ?Sized,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| UpdateError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let bytes = upstream.fetch(url).await?;
    fs::write(path, bytes).map_err(|e| UpdateError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
