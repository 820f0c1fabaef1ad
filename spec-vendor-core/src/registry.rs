//! The spec registry: which OpenAPI documents the site publishes and where each one lives.
//!
//! Entries are plain data. Resolution produces a separate [`ResolvedSpec`] per entry
//! instead of filling fields in place, so a registry value never changes after it is built.

use crate::config::{SiteLayout, UpstreamConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sidebar grouping metadata handed through to the docs plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarOptions {
    pub group_paths_by: String,
    pub category_link_source: String,
}

impl SidebarOptions {
    /// Group by tag, category page from `info` (registered specs).
    pub fn by_info() -> Self {
        Self {
            group_paths_by: "tag".to_string(),
            category_link_source: "info".to_string(),
        }
    }

    /// Group by tag, category page from the tag itself (samples).
    pub fn by_tag() -> Self {
        Self {
            group_paths_by: "tag".to_string(),
            category_link_source: "tag".to_string(),
        }
    }
}

impl Default for SidebarOptions {
    fn default() -> Self {
        Self::by_info()
    }
}

/// One registered API specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecEntry {
    /// Unique label; also becomes the single tag of every operation.
    pub id: String,
    /// Vendored copy.
    pub source_path: PathBuf,
    /// Explicit processed location; derived from `source_path` when absent.
    #[serde(default)]
    pub processed_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub upstream_url: Option<String>,
    #[serde(default)]
    pub sidebar_options: SidebarOptions,
}

/// A registry entry with every derived field filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSpec {
    pub id: String,
    /// The processed copy the docs plugin reads.
    pub spec_path: PathBuf,
    pub source_path: PathBuf,
    pub output_dir: PathBuf,
    pub upstream_url: Option<String>,
    pub sidebar_options: SidebarOptions,
    /// Bundled sample, copied verbatim.
    pub sample: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate spec id {0:?}")]
    DuplicateId(String),
    #[error("spec with source {0:?} has an empty id")]
    EmptyId(PathBuf),
    #[error("spec {id:?} has an upstream URL without an http(s) scheme: {url}")]
    InvalidUpstreamUrl { id: String, url: String },
}

/// Derives the processed location by swapping the specs root for the processed root.
///
/// Sources outside the specs root keep only their file name.
pub fn resolve_processed_path(entry: &SpecEntry, layout: &SiteLayout) -> PathBuf {
    if let Some(explicit) = &entry.processed_path {
        return explicit.clone();
    }
    match entry.source_path.strip_prefix(&layout.specs_dir) {
        Ok(relative) => layout.processed_dir.join(relative),
        Err(_) => {
            let file_name = entry
                .source_path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| entry.source_path.clone());
            layout.processed_dir.join(file_name)
        }
    }
}

/// Builds the completed record for one entry.
pub fn resolve(entry: &SpecEntry, layout: &SiteLayout) -> ResolvedSpec {
    ResolvedSpec {
        id: entry.id.clone(),
        spec_path: resolve_processed_path(entry, layout),
        source_path: entry.source_path.clone(),
        output_dir: entry.output_dir.clone(),
        upstream_url: entry.upstream_url.clone(),
        sidebar_options: entry.sidebar_options.clone(),
        sample: false,
    }
}

pub fn validate_registry(entries: &[SpecEntry]) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if entry.id.trim().is_empty() {
            return Err(RegistryError::EmptyId(entry.source_path.clone()));
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(RegistryError::DuplicateId(entry.id.clone()));
        }
        if let Some(url) = &entry.upstream_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(RegistryError::InvalidUpstreamUrl {
                    id: entry.id.clone(),
                    url: url.clone(),
                });
            }
        }
    }
    Ok(())
}

/// (id, path below the specs root and upstream spec root, docs output subdirectory)
const PLATFORM_SPECS: &[(&str, &str, &str)] = &[
    (
        "Well-Known Configuration",
        "wellknownconfiguration/wellknown_configuration.openapi.yaml",
        "wellknownconfiguration",
    ),
    (
        "V1 Authorization",
        "authorization/authorization.openapi.yaml",
        "authorization/v1",
    ),
    (
        "V2 Authorization",
        "authorization/v2/authorization.openapi.yaml",
        "authorization/v2",
    ),
    (
        "V1 Entity Resolution",
        "entityresolution/entity_resolution.openapi.yaml",
        "entityresolution/v1",
    ),
    (
        "V2 Entity Resolution",
        "entityresolution/v2/entity_resolution.openapi.yaml",
        "entityresolution/v2",
    ),
    ("kas", "kas/kas.openapi.yaml", "kas"),
    ("Policy Objects", "policy/objects.openapi.yaml", "policy"),
    (
        "Key Management",
        "policy/keymanagement/key_management.openapi.yaml",
        "policy/keymanagement",
    ),
    (
        "Policy Resource Mapping",
        "policy/resourcemapping/resource_mapping.openapi.yaml",
        "policy/resourcemapping",
    ),
    (
        "Policy Namespaces",
        "policy/namespaces/namespaces.openapi.yaml",
        "policy/namespaces",
    ),
    (
        "Policy Attributes",
        "policy/attributes/attributes.openapi.yaml",
        "policy/attributes",
    ),
    (
        "Policy Unsafe Service",
        "policy/unsafe/unsafe.openapi.yaml",
        "policy/unsafe",
    ),
    (
        "Policy Actions",
        "policy/actions/actions.openapi.yaml",
        "policy/actions",
    ),
    (
        "Policy Registered Resources",
        "policy/registeredresources/registered_resources.openapi.yaml",
        "policy/registeredresources",
    ),
    (
        "Policy Subject Mapping",
        "policy/subjectmapping/subject_mapping.openapi.yaml",
        "policy/subjectmapping",
    ),
    (
        "Policy KAS Registry",
        "policy/kasregistry/key_access_server_registry.openapi.yaml",
        "policy/kasregistry",
    ),
    (
        "Policy Obligations",
        "policy/obligations/obligations.openapi.yaml",
        "policy/obligations",
    ),
    ("Policy Selectors", "policy/selectors.openapi.yaml", "policy"),
];

/// The platform specs published by the site, in navigation order.
pub fn default_registry(layout: &SiteLayout, upstream: &UpstreamConfig) -> Vec<SpecEntry> {
    PLATFORM_SPECS
        .iter()
        .map(|(id, relative, output)| SpecEntry {
            id: (*id).to_string(),
            source_path: layout.specs_dir.join(relative),
            processed_path: None,
            output_dir: layout.docs_output_dir.join(output),
            upstream_url: Some(
                upstream.raw_url(&format!("{}/{}", upstream.spec_root, relative)),
            ),
            sidebar_options: SidebarOptions::by_info(),
        })
        .collect()
}

/// Bundled example specs; no upstream, copied without normalization.
pub fn sample_entries(layout: &SiteLayout) -> Vec<SpecEntry> {
    ["petstore", "bookstore"]
        .iter()
        .map(|name| {
            let file = format!("{name}.yaml");
            SpecEntry {
                id: (*name).to_string(),
                source_path: layout.specs_dir.join(&file),
                processed_path: Some(layout.processed_dir.join(&file)),
                output_dir: layout.samples_output_dir.join(name),
                upstream_url: None,
                sidebar_options: SidebarOptions::by_tag(),
            }
        })
        .collect()
}

/// Anchors relative entry paths: sources against the specs root, outputs against the docs root.
pub fn anchor_entry(mut entry: SpecEntry, layout: &SiteLayout) -> SpecEntry {
    entry.source_path = anchor(&layout.specs_dir, &entry.source_path);
    entry.processed_path = entry
        .processed_path
        .map(|p| anchor(&layout.processed_dir, &p));
    entry.output_dir = anchor(&layout.docs_output_dir, &entry.output_dir);
    entry
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SiteLayout {
        SiteLayout::from_root("/site")
    }

    fn entry(id: &str, source: &str) -> SpecEntry {
        SpecEntry {
            id: id.to_string(),
            source_path: PathBuf::from(source),
            processed_path: None,
            output_dir: PathBuf::from("/site/docs/out"),
            upstream_url: None,
            sidebar_options: SidebarOptions::default(),
        }
    }

    #[test]
    fn processed_path_mirrors_relative_structure() {
        let e = entry("V2 Authorization", "/site/specs/authorization/v2/authorization.openapi.yaml");
        assert_eq!(
            resolve_processed_path(&e, &layout()),
            PathBuf::from("/site/specs-processed/authorization/v2/authorization.openapi.yaml")
        );
    }

    #[test]
    fn explicit_processed_path_wins() {
        let mut e = entry("kas", "/site/specs/kas/kas.openapi.yaml");
        e.processed_path = Some(PathBuf::from("/elsewhere/kas.yaml"));
        assert_eq!(
            resolve_processed_path(&e, &layout()),
            PathBuf::from("/elsewhere/kas.yaml")
        );
    }

    #[test]
    fn source_outside_specs_root_keeps_file_name() {
        let e = entry("kas", "/tmp/vendor/kas.yaml");
        assert_eq!(
            resolve_processed_path(&e, &layout()),
            PathBuf::from("/site/specs-processed/kas.yaml")
        );
    }

    #[test]
    fn resolve_does_not_touch_the_entry() {
        let e = entry("kas", "/site/specs/kas/kas.openapi.yaml");
        let before = e.clone();
        let resolved = resolve(&e, &layout());
        assert_eq!(e, before);
        assert_eq!(resolved.source_path, e.source_path);
        assert!(!resolved.sample);
    }

    #[test]
    fn default_registry_is_valid_and_points_upstream() {
        let registry = default_registry(&layout(), &UpstreamConfig::default());
        assert_eq!(registry.len(), PLATFORM_SPECS.len());
        validate_registry(&registry).expect("built-in registry must be valid");

        let kas = registry.iter().find(|e| e.id == "kas").unwrap();
        assert_eq!(
            kas.upstream_url.as_deref(),
            Some("https://raw.githubusercontent.com/opentdf/platform/refs/heads/main/docs/openapi/kas/kas.openapi.yaml")
        );
        assert_eq!(kas.output_dir, PathBuf::from("/site/docs/OpenAPI-clients/kas"));
    }

    #[test]
    fn validate_rejects_duplicates_and_bad_urls() {
        let dup = vec![entry("kas", "/a.yaml"), entry("kas", "/b.yaml")];
        assert_eq!(
            validate_registry(&dup),
            Err(RegistryError::DuplicateId("kas".into()))
        );

        let empty = vec![entry("  ", "/a.yaml")];
        assert!(matches!(
            validate_registry(&empty),
            Err(RegistryError::EmptyId(_))
        ));

        let mut bad = entry("kas", "/a.yaml");
        bad.upstream_url = Some("ftp://example.com/kas.yaml".into());
        assert!(matches!(
            validate_registry(&[bad]),
            Err(RegistryError::InvalidUpstreamUrl { .. })
        ));
    }

    #[test]
    fn anchor_entry_resolves_relative_paths() {
        let mut e = entry("kas", "kas/kas.openapi.yaml");
        e.output_dir = PathBuf::from("kas");
        let anchored = anchor_entry(e, &layout());
        assert_eq!(
            anchored.source_path,
            PathBuf::from("/site/specs/kas/kas.openapi.yaml")
        );
        assert_eq!(
            anchored.output_dir,
            PathBuf::from("/site/docs/OpenAPI-clients/kas")
        );
    }
}
