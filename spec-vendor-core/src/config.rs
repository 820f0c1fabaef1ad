use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw-content base of the upstream platform repository.
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com/opentdf/platform/refs/heads/main";
/// Contents API base of the upstream platform repository.
pub const DEFAULT_API_BASE: &str = "https://api.github.com/repos/opentdf/platform";
/// Directory in the upstream repository holding the OpenAPI specs.
pub const DEFAULT_SPEC_ROOT: &str = "docs/openapi";

/// File whose presence marks the documentation site root.
pub const REPO_ROOT_MARKER: &str = "package.json";

/// Environment flag that pulls the bundled sample specs into the build.
pub const SAMPLES_ENV_VAR: &str = "BUILD_OPENAPI_SAMPLES";

/// Directory roots the pipeline reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteLayout {
    pub repo_root: PathBuf,
    /// Vendored (authoritative) specs.
    pub specs_dir: PathBuf,
    /// Normalized copies consumed by the docs plugin.
    pub processed_dir: PathBuf,
    /// Root of the generated OpenAPI client pages.
    pub docs_output_dir: PathBuf,
    /// Root of the generated sample pages.
    pub samples_output_dir: PathBuf,
}

impl SiteLayout {
    /// Conventional layout below `repo_root`.
    pub fn from_root(repo_root: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        Self {
            specs_dir: repo_root.join("specs"),
            processed_dir: repo_root.join("specs-processed"),
            docs_output_dir: repo_root.join("docs").join("OpenAPI-clients"),
            samples_output_dir: repo_root.join("docs").join("SDK-Samples"),
            repo_root,
        }
    }

    /// Location of the OpenAPI landing page.
    pub fn index_page(&self) -> PathBuf {
        self.docs_output_dir.join("index.md")
    }

    /// Location of the JSON table the docs plugin is configured from.
    pub fn manifest_path(&self) -> PathBuf {
        self.processed_dir.join("openapi-specs.json")
    }

    pub fn trace_loaded(&self) {
        info!(
            repo_root = %self.repo_root.display(),
            specs_dir = %self.specs_dir.display(),
            processed_dir = %self.processed_dir.display(),
            "Resolved site layout"
        );
        debug!(?self, "Site layout (full debug)");
    }
}

/// Knobs for the normalization step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessOptions {
    /// Prefix `info.description` with a generation timestamp. Breaks idempotence.
    #[serde(default)]
    pub add_timestamp: bool,
    /// Copy the bundled sample specs and list them alongside the real ones.
    #[serde(default)]
    pub include_samples: bool,
}

impl PreprocessOptions {
    /// Turns samples on when the environment flag is the literal `1`; never turns them off.
    pub fn with_samples_from_env(mut self) -> Self {
        if std::env::var(SAMPLES_ENV_VAR).is_ok_and(|v| v == "1") {
            self.include_samples = true;
        }
        self
    }
}

/// Where upstream specs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub api_base: String,
    pub raw_base: String,
    pub spec_root: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            spec_root: DEFAULT_SPEC_ROOT.to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Raw download URL for a repository-relative path.
    pub fn raw_url(&self, repo_path: &str) -> String {
        format!(
            "{}/{}",
            self.raw_base.trim_end_matches('/'),
            repo_path.trim_start_matches('/')
        )
    }

    /// Contents API URL for a repository-relative directory.
    pub fn contents_url(&self, repo_path: &str) -> String {
        format!(
            "{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            repo_path.trim_start_matches('/')
        )
    }
}

/// Walks up from `start` to the first directory holding [`REPO_ROOT_MARKER`].
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(REPO_ROOT_MARKER).is_file())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_mirrors_site_conventions() {
        let layout = SiteLayout::from_root("/site");
        assert_eq!(layout.specs_dir, PathBuf::from("/site/specs"));
        assert_eq!(layout.processed_dir, PathBuf::from("/site/specs-processed"));
        assert_eq!(
            layout.index_page(),
            PathBuf::from("/site/docs/OpenAPI-clients/index.md")
        );
    }

    #[test]
    fn raw_url_joins_without_double_slash() {
        let upstream = UpstreamConfig {
            raw_base: "https://raw.example.com/main/".into(),
            ..UpstreamConfig::default()
        };
        assert_eq!(
            upstream.raw_url("/docs/openapi/kas/kas.openapi.yaml"),
            "https://raw.example.com/main/docs/openapi/kas/kas.openapi.yaml"
        );
    }

    #[test]
    fn find_repo_root_walks_up_to_marker() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(REPO_ROOT_MARKER), "{}").unwrap();
        let nested = dir.path().join("src").join("openapi");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_repo_root(&nested).as_deref(), Some(dir.path()));
    }
}
