//! Vendoring guard: detects vendored specs that fell behind upstream, and upstream specs
//! the registry does not know about yet.
//!
//! Nothing here aborts early. Every entry is checked and the findings are aggregated
//! into one [`DriftReport`]; the caller turns that into a pass/fail signal.

use crate::config::UpstreamConfig;
use crate::contract::{FetchError, Upstream};
use crate::document::OpenApiDocument;
use crate::registry::SpecEntry;
use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

/// Why an entry or an upstream file could not be checked.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to stage download in a temp file: {0}")]
    TempFile(#[source] std::io::Error),
    #[error("failed to hash {}: {source}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {url} as YAML: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug)]
pub enum DriftOutcome {
    UpToDate,
    Drifted { vendored: String, upstream: String },
    /// Download or hashing failed; counted as a failure.
    Failed(CheckError),
}

impl DriftOutcome {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, DriftOutcome::UpToDate)
    }
}

#[derive(Debug)]
pub struct EntryDrift {
    pub id: String,
    pub path: PathBuf,
    pub outcome: DriftOutcome,
}

/// An upstream spec with API paths and no registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisteredSpec {
    pub path: String,
    pub url: String,
}

/// A listing or inspection failure during the unregistered scan.
#[derive(Debug)]
pub struct ScanFailure {
    /// Remote directory or file path the failure belongs to.
    pub path: String,
    pub error: CheckError,
}

#[derive(Debug, Default)]
pub struct DriftReport {
    pub entries: Vec<EntryDrift>,
    pub unregistered: Vec<UnregisteredSpec>,
    pub scan_failures: Vec<ScanFailure>,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.outcome.is_up_to_date())
            && self.unregistered.is_empty()
            && self.scan_failures.is_empty()
    }
}

/// SHA-256 hex digest of a file; a missing file hashes as the empty string.
pub fn file_hash(path: &Path) -> std::io::Result<String> {
    match std::fs::read(path) {
        Ok(data) => {
            let mut hasher = Sha256::new();
            hasher.update(&data);
            Ok(format!("{:x}", hasher.finalize()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

/// Compares every vendored spec that has an upstream URL against a fresh download.
pub async fn check_vendored<U>(upstream: &U, specs: &[SpecEntry]) -> Vec<EntryDrift>
where
    U: Upstream + ?Sized,
{
    let mut results = Vec::new();
    for spec in specs {
        let Some(url) = spec.upstream_url.as_deref() else {
            continue;
        };
        let outcome = match compare_with_upstream(upstream, &spec.source_path, url).await {
            Ok((vendored, fresh)) if vendored == fresh => {
                info!(id = %spec.id, path = %spec.source_path.display(), "Vendored file is up to date");
                DriftOutcome::UpToDate
            }
            Ok((vendored, fresh)) => {
                error!(
                    id = %spec.id,
                    path = %spec.source_path.display(),
                    "Vendored file out of date. Please run 'spec-vendor update' to update."
                );
                DriftOutcome::Drifted {
                    vendored,
                    upstream: fresh,
                }
            }
            Err(e) => {
                error!(id = %spec.id, url, error = %e, "Could not check vendored file");
                DriftOutcome::Failed(e)
            }
        };
        results.push(EntryDrift {
            id: spec.id.clone(),
            path: spec.source_path.clone(),
            outcome,
        });
    }
    results
}

/// Downloads to a temporary file and hashes both copies; the temp file is removed on drop.
async fn compare_with_upstream<U>(
    upstream: &U,
    vendored: &Path,
    url: &str,
) -> Result<(String, String), CheckError>
where
    U: Upstream + ?Sized,
{
    let bytes = upstream.fetch(url).await?;

    let mut tmp = tempfile::NamedTempFile::new().map_err(CheckError::TempFile)?;
    tmp.write_all(&bytes)
        .and_then(|_| tmp.flush())
        .map_err(CheckError::TempFile)?;

    let vendored_hash = file_hash(vendored).map_err(|e| CheckError::Hash {
        path: vendored.to_path_buf(),
        source: e,
    })?;
    let fresh_hash = file_hash(tmp.path()).map_err(|e| CheckError::Hash {
        path: tmp.path().to_path_buf(),
        source: e,
    })?;
    Ok((vendored_hash, fresh_hash))
}

/// Walks the upstream spec tree and reports YAML files that have API paths but no entry.
///
/// Schema-only includes (no `paths`) are skipped.
pub async fn find_unregistered<U>(
    upstream: &U,
    specs: &[SpecEntry],
    config: &UpstreamConfig,
) -> (Vec<UnregisteredSpec>, Vec<ScanFailure>)
where
    U: Upstream + ?Sized,
{
    info!(root = %config.spec_root, "Checking for unregistered spec files upstream");
    let registered: HashSet<&str> = specs
        .iter()
        .filter_map(|s| s.upstream_url.as_deref())
        .collect();

    let mut found = Vec::new();
    let mut failures = Vec::new();

    let remote_paths = match list_yaml_recursive(upstream, &config.spec_root).await {
        Ok(paths) => paths,
        Err(e) => {
            error!(error = %e, "Failed to list upstream spec tree");
            failures.push(ScanFailure {
                path: config.spec_root.clone(),
                error: e.into(),
            });
            return (found, failures);
        }
    };

    for remote_path in remote_paths {
        let url = config.raw_url(&remote_path);
        if registered.contains(url.as_str()) {
            continue;
        }
        match has_api_paths(upstream, &url).await {
            Ok(true) => {
                error!(
                    path = %remote_path,
                    url = %url,
                    "Unregistered spec found upstream; add a registry entry with this upstream URL"
                );
                found.push(UnregisteredSpec {
                    path: remote_path,
                    url,
                });
            }
            Ok(false) => {
                info!(path = %remote_path, "Skipping schema-only file (no paths)");
            }
            Err(e) => {
                error!(path = %remote_path, error = %e, "Failed to inspect upstream file");
                failures.push(ScanFailure {
                    path: remote_path,
                    error: e,
                });
            }
        }
    }
    (found, failures)
}

async fn list_yaml_recursive<U>(upstream: &U, root: &str) -> Result<Vec<String>, FetchError>
where
    U: Upstream + ?Sized,
{
    let mut yaml = Vec::new();
    let mut pending = VecDeque::from([root.to_string()]);
    while let Some(dir) = pending.pop_front() {
        for entry in upstream.list_dir(&dir).await? {
            if entry.is_yaml_file() {
                yaml.push(entry.path);
            } else if entry.kind == crate::contract::RemoteKind::Dir {
                pending.push_back(entry.path);
            }
        }
    }
    Ok(yaml)
}

async fn has_api_paths<U>(upstream: &U, url: &str) -> Result<bool, CheckError>
where
    U: Upstream + ?Sized,
{
    let bytes = upstream.fetch(url).await?;
    let text = String::from_utf8_lossy(&bytes);
    let doc = OpenApiDocument::from_yaml(&text).map_err(|e| CheckError::Parse {
        url: url.to_string(),
        source: e,
    })?;
    Ok(doc.has_paths())
}

/// Both checks: vendored freshness, then (optionally) the unregistered scan.
pub async fn check_all<U>(
    upstream: &U,
    specs: &[SpecEntry],
    config: &UpstreamConfig,
    scan_unregistered: bool,
) -> DriftReport
where
    U: Upstream + ?Sized,
{
    let entries = check_vendored(upstream, specs).await;
    let (unregistered, scan_failures) = if scan_unregistered {
        find_unregistered(upstream, specs, config).await
    } else {
        (Vec::new(), Vec::new())
    };
    DriftReport {
        entries,
        unregistered,
        scan_failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_hashes_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(file_hash(&dir.path().join("absent.yaml")).unwrap(), "");
    }

    #[test]
    fn hash_is_sha256_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.yaml");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            file_hash(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn report_is_clean_only_without_findings() {
        let mut report = DriftReport::default();
        assert!(report.is_clean());
        report.entries.push(EntryDrift {
            id: "kas".into(),
            path: PathBuf::from("kas.yaml"),
            outcome: DriftOutcome::Failed(CheckError::TempFile(std::io::Error::other("offline"))),
        });
        assert!(!report.is_clean());
    }
}
