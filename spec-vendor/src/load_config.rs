/// `load_config` module: loads the optional YAML config and adapts it into the core's
/// strongly-typed layout, options, upstream settings and registry.
///
/// This is the only place where user-supplied YAML configuration is parsed.
///
/// # Responsibilities
/// - Parse the config file into intermediate (YAML-side) structs
/// - Anchor relative directories at the repository root and relative spec paths at the specs root
/// - Fall back to the built-in registry when no `specs` are listed
/// - Validate the resulting registry before any command runs
///
/// # Errors
/// All errors use `anyhow::Error` with context and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use serde::Deserialize;
use spec_vendor_core::config::{PreprocessOptions, SiteLayout, UpstreamConfig};
use spec_vendor_core::registry::{anchor_entry, default_registry, validate_registry, SpecEntry};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Everything a command needs, fully resolved.
#[derive(Debug)]
pub struct CliConfig {
    pub layout: SiteLayout,
    pub preprocess: PreprocessOptions,
    pub upstream: UpstreamConfig,
    pub specs: Vec<SpecEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    pub specs_dir: Option<PathBuf>,
    pub processed_dir: Option<PathBuf>,
    pub docs_output_dir: Option<PathBuf>,
    pub samples_output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub layout: LayoutSection,
    pub preprocess: PreprocessOptions,
    pub upstream: Option<UpstreamConfig>,
    pub specs: Vec<SpecEntry>,
}

/// Builds the config for `root`, reading `path` when given.
pub fn load_config(path: Option<&Path>, root: &Path) -> Result<CliConfig> {
    let raw = match path {
        Some(path) => read_raw(path)?,
        None => {
            info!("No config file given, using built-in registry and layout");
            RawConfig::default()
        }
    };
    adapt(raw, root)
}

fn read_raw(path: &Path) -> Result<RawConfig> {
    info!(config_path = ?path, "Loading configuration from file");
    let content = fs::read_to_string(path).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to read config file");
        anyhow::anyhow!("Failed to read config file {:?}: {}", path, e)
    })?;

    // An empty file is a valid "all defaults" config.
    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    let raw: RawConfig = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML: {e}")
    })?;
    info!(config_path = ?path, "Parsed config YAML successfully");
    Ok(raw)
}

fn adapt(raw: RawConfig, root: &Path) -> Result<CliConfig> {
    let mut layout = SiteLayout::from_root(root);
    let under_root = |p: PathBuf| if p.is_absolute() { p } else { root.join(p) };
    if let Some(dir) = raw.layout.specs_dir {
        layout.specs_dir = under_root(dir);
    }
    if let Some(dir) = raw.layout.processed_dir {
        layout.processed_dir = under_root(dir);
    }
    if let Some(dir) = raw.layout.docs_output_dir {
        layout.docs_output_dir = under_root(dir);
    }
    if let Some(dir) = raw.layout.samples_output_dir {
        layout.samples_output_dir = under_root(dir);
    }
    layout.trace_loaded();

    let upstream = raw.upstream.unwrap_or_default();
    let specs = if raw.specs.is_empty() {
        default_registry(&layout, &upstream)
    } else {
        raw.specs
            .into_iter()
            .map(|entry| anchor_entry(entry, &layout))
            .collect()
    };
    validate_registry(&specs).context("Invalid spec registry")?;
    info!(specs = specs.len(), "Spec registry loaded");

    Ok(CliConfig {
        layout,
        preprocess: raw.preprocess,
        upstream,
        specs,
    })
}
