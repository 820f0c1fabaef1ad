//! Shared artifacts written once per preprocessing run.

use crate::registry::{ResolvedSpec, SidebarOptions};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Landing page for the OpenAPI section, so the section URL can be bookmarked.
pub const INDEX_PAGE_CONTENT: &str = "---
title: OpenAPI Clients
sidebar_position: 7
---
# OpenAPI Clients

OpenAPI client examples are available for platform endpoints.  

Expand each section in the navigation panel to access the OpenAPI documentation for each service.
";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn write_index_page(path: &Path) -> Result<(), OutputError> {
    write_file(path, INDEX_PAGE_CONTENT.as_bytes())?;
    info!(path = %path.display(), "Created OpenAPI index page");
    Ok(())
}

/// Writes the plugin table: an object keyed by spec id, in the given order.
pub fn write_manifest(path: &Path, specs: &[ResolvedSpec]) -> Result<(), OutputError> {
    let mut json = serde_json::to_string_pretty(&Manifest(specs))?;
    json.push('\n');
    write_file(path, json.as_bytes())?;
    info!(path = %path.display(), count = specs.len(), "Wrote OpenAPI plugin manifest");
    Ok(())
}

struct Manifest<'a>(&'a [ResolvedSpec]);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry<'a> {
    spec_path: &'a Path,
    output_dir: &'a Path,
    sidebar_options: &'a SidebarOptions,
}

impl Serialize for Manifest<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in self.0 {
            map.serialize_entry(
                &spec.id,
                &ManifestEntry {
                    spec_path: &spec.spec_path,
                    output_dir: &spec.output_dir,
                    sidebar_options: &spec.sidebar_options,
                },
            )?;
        }
        map.end()
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), OutputError> {
    let to_io_error = |source: std::io::Error| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_io_error)?;
    }
    fs::write(path, contents).map_err(to_io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str) -> ResolvedSpec {
        ResolvedSpec {
            id: id.to_string(),
            spec_path: PathBuf::from(format!("/site/specs-processed/{id}.yaml")),
            source_path: PathBuf::from(format!("/site/specs/{id}.yaml")),
            output_dir: PathBuf::from(format!("/site/docs/{id}")),
            upstream_url: None,
            sidebar_options: SidebarOptions::by_info(),
            sample: false,
        }
    }

    #[test]
    fn manifest_keeps_registry_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("openapi-specs.json");
        write_manifest(&path, &[spec("zeta"), spec("alpha")]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let zeta = text.find("\"zeta\"").unwrap();
        let alpha = text.find("\"alpha\"").unwrap();
        assert!(zeta < alpha, "manifest must follow registry order:\n{text}");
        assert!(text.contains("\"specPath\": \"/site/specs-processed/zeta.yaml\""));
        assert!(text.contains("\"groupPathsBy\": \"tag\""));
        assert!(text.contains("\"categoryLinkSource\": \"info\""));
    }

    #[test]
    fn index_page_is_written_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs").join("index.md");
        write_index_page(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, INDEX_PAGE_CONTENT);
        assert!(text.starts_with("---\ntitle: OpenAPI Clients\nsidebar_position: 7\n---\n"));
        // Markdown hard break after the first sentence.
        assert!(text.contains("platform endpoints.  \n"));
    }
}
