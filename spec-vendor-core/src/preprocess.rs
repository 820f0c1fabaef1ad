//! Preprocessing pipeline: vendored spec → normalized copy for the docs plugin.
//!
//! Entries run strictly in registry order. A failing entry is logged, recorded in the
//! report and skipped; it never stops the entries after it. Only the shared outputs
//! (index page, manifest) can fail the whole run.

use crate::config::{PreprocessOptions, SiteLayout};
use crate::document::OpenApiDocument;
use crate::normalize::normalize;
use crate::output::{write_index_page, write_manifest, OutputError};
use crate::registry::{resolve, sample_entries, ResolvedSpec, SpecEntry};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {} as YAML: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An entry that could not be processed.
#[derive(Debug)]
pub struct EntryFailure {
    pub id: String,
    pub error: PreprocessError,
}

#[derive(Debug, Default)]
pub struct PreprocessReport {
    /// Specs ready for the docs plugin, registry order, samples last. Ids are unique.
    pub resolved: Vec<ResolvedSpec>,
    pub failures: Vec<EntryFailure>,
}

impl PreprocessReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Normalizes one vendored spec and writes it to its processed location.
pub fn preprocess_spec(
    entry: &SpecEntry,
    layout: &SiteLayout,
    options: &PreprocessOptions,
) -> Result<ResolvedSpec, PreprocessError> {
    let resolved = resolve(entry, layout);
    let source = &resolved.source_path;
    let target = &resolved.spec_path;
    info!(id = %entry.id, "Processing: {} → {}", source.display(), target.display());

    let text = fs::read_to_string(source).map_err(|e| PreprocessError::Read {
        path: source.clone(),
        source: e,
    })?;
    let doc = OpenApiDocument::from_yaml(&text).map_err(|e| PreprocessError::Parse {
        path: source.clone(),
        source: e,
    })?;

    let doc = normalize(doc, &entry.id, options);

    let yaml = doc.to_yaml().map_err(|e| PreprocessError::Serialize {
        path: source.clone(),
        source: e,
    })?;
    write_creating_parents(target, yaml.as_bytes())?;

    info!(id = %entry.id, path = %target.display(), "Updated processed spec");
    Ok(resolved)
}

/// Copies a bundled sample verbatim into the processed tree.
pub fn copy_sample(entry: &SpecEntry, layout: &SiteLayout) -> Result<ResolvedSpec, PreprocessError> {
    let mut resolved = resolve(entry, layout);
    resolved.sample = true;
    let from = &resolved.source_path;
    let to = &resolved.spec_path;
    info!(id = %entry.id, "Copying sample spec from {}", from.display());

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| PreprocessError::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::copy(from, to).map_err(|e| PreprocessError::Copy {
        from: from.clone(),
        to: to.clone(),
        source: e,
    })?;
    Ok(resolved)
}

/// Runs the whole pipeline: every registered spec, optional samples, index page, manifest.
pub fn preprocess_all(
    registry: &[SpecEntry],
    layout: &SiteLayout,
    options: &PreprocessOptions,
) -> Result<PreprocessReport, OutputError> {
    info!(count = registry.len(), "Preprocessing OpenAPI specification files");
    let mut report = PreprocessReport::default();

    for entry in registry {
        match preprocess_spec(entry, layout, options) {
            Ok(resolved) => report.resolved.push(resolved),
            Err(e) => {
                error!(id = %entry.id, error = %e, "Error processing spec");
                report.failures.push(EntryFailure {
                    id: entry.id.clone(),
                    error: e,
                });
            }
        }
    }

    if options.include_samples {
        info!("Including sample OpenAPI specs (petstore, bookstore)");
        for entry in sample_entries(layout) {
            match copy_sample(&entry, layout) {
                Ok(resolved) => merge_sample(&mut report.resolved, resolved),
                Err(e) => {
                    error!(id = %entry.id, error = %e, "Error copying sample spec");
                    report.failures.push(EntryFailure {
                        id: entry.id.clone(),
                        error: e,
                    });
                }
            }
        }
    } else {
        info!("Skipping sample OpenAPI specs (BUILD_OPENAPI_SAMPLES is not set to 1)");
    }

    write_index_page(&layout.index_page())?;
    write_manifest(&layout.manifest_path(), &report.resolved)?;

    if report.is_complete() {
        info!(processed = report.resolved.len(), "OpenAPI preprocessing complete");
    } else {
        warn!(
            processed = report.resolved.len(),
            failed = report.failures.len(),
            "OpenAPI preprocessing complete with failures; processed output is partial"
        );
    }
    Ok(report)
}

/// Ids are manifest keys: a sample sharing an id with a registered spec takes over its slot.
fn merge_sample(resolved: &mut Vec<ResolvedSpec>, sample: ResolvedSpec) {
    match resolved.iter_mut().find(|s| s.id == sample.id) {
        Some(existing) => {
            warn!(id = %sample.id, "Sample spec replaces the registered spec with the same id");
            *existing = sample;
        }
        None => resolved.push(sample),
    }
}

fn write_creating_parents(path: &Path, contents: &[u8]) -> Result<(), PreprocessError> {
    let to_write_error = |e: std::io::Error| PreprocessError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_write_error)?;
    }
    fs::write(path, contents).map_err(to_write_error)
}
