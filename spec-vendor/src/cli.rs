//! # cli: subcommands and their outcomes
//!
//! This module implements the CLI interface for spec-vendor: command parsing, config
//! resolution, and the mapping from pipeline reports to a pass/fail outcome.
//!
//! All business logic (registry, normalization, drift checks) lives in [`spec-vendor-core`].
//! This module is strictly CLI glue.
//!
//! ## How To Use
//! - From the docs site: `spec-vendor preprocess` before building, `spec-vendor check` in CI,
//!   `spec-vendor update` to re-vendor.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`spec-vendor-core`]: ../../spec-vendor-core/

use crate::load_config::{load_config, CliConfig};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use spec_vendor_core::config::find_repo_root;
use spec_vendor_core::contract::Upstream;
use spec_vendor_core::download::HttpUpstream;
use spec_vendor_core::drift::{check_all, DriftOutcome};
use spec_vendor_core::preprocess::preprocess_all;
use spec_vendor_core::registry::resolve;
use spec_vendor_core::update::update_vendored;
use std::path::PathBuf;

/// CLI for spec-vendor: keep the docs site's OpenAPI specs vendored and normalized.
#[derive(Parser)]
#[clap(
    name = "spec-vendor",
    version,
    about = "Preprocess, drift-check and re-vendor the OpenAPI specs published by the docs site"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to an optional YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Docs site root; defaults to the nearest ancestor holding package.json
    #[clap(long)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Normalize every registered spec into the processed directory
    Preprocess {
        #[clap(flatten)]
        common: CommonArgs,
        /// Include the bundled sample specs (same as BUILD_OPENAPI_SAMPLES=1)
        #[clap(long)]
        samples: bool,
    },
    /// Fail if any vendored spec differs from upstream or an upstream spec is unregistered
    Check {
        #[clap(flatten)]
        common: CommonArgs,
        /// Only compare vendored files; skip the upstream tree scan
        #[clap(long)]
        skip_unregistered: bool,
    },
    /// Overwrite vendored specs with current upstream content
    Update {
        #[clap(flatten)]
        common: CommonArgs,
    },
    /// Print the resolved registry
    List {
        #[clap(flatten)]
        common: CommonArgs,
    },
}

/// What a successful invocation concluded; `main` maps it to the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// The command ran but found problems (drift, failed downloads).
    Failed,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<RunOutcome> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Preprocess { common, samples } => {
            let mut config = resolve_config(&common)?;
            config.preprocess = config.preprocess.with_samples_from_env();
            config.preprocess.include_samples |= samples;
            tracing::info!(command = "preprocess", "Starting preprocessing");

            let report = preprocess_all(&config.specs, &config.layout, &config.preprocess)
                .context("Failed to write shared preprocessing output")?;
            for failure in &report.failures {
                tracing::warn!(command = "preprocess", id = %failure.id, error = %failure.error, "Spec skipped");
            }
            Ok(RunOutcome::Success)
        }
        Commands::Check {
            common,
            skip_unregistered,
        } => {
            let config = resolve_config(&common)?;
            let upstream = http_upstream(&config)?;
            check(&upstream, &config, !skip_unregistered).await
        }
        Commands::Update { common } => {
            let config = resolve_config(&common)?;
            let upstream = http_upstream(&config)?;
            update(&upstream, &config).await
        }
        Commands::List { common } => {
            let config = resolve_config(&common)?;
            for entry in &config.specs {
                let spec = resolve(entry, &config.layout);
                println!(
                    "{}\t{}\t{}",
                    spec.id,
                    spec.spec_path.display(),
                    spec.upstream_url.as_deref().unwrap_or("-")
                );
            }
            Ok(RunOutcome::Success)
        }
    }
}

/// Drift check against any [`Upstream`]; split out so tests can pass a mock.
pub async fn check<U: Upstream>(
    upstream: &U,
    config: &CliConfig,
    scan_unregistered: bool,
) -> Result<RunOutcome> {
    tracing::info!(command = "check", "Checking vendored specs against upstream");
    let report = check_all(upstream, &config.specs, &config.upstream, scan_unregistered).await;

    let drifted = report
        .entries
        .iter()
        .filter(|e| matches!(e.outcome, DriftOutcome::Drifted { .. }))
        .count();
    let failed = report
        .entries
        .iter()
        .filter(|e| matches!(e.outcome, DriftOutcome::Failed(_)))
        .count();

    if report.is_clean() {
        tracing::info!(command = "check", checked = report.entries.len(), "All vendored specs are up to date");
        Ok(RunOutcome::Success)
    } else {
        tracing::error!(
            command = "check",
            drifted,
            failed,
            unregistered = report.unregistered.len(),
            scan_failures = report.scan_failures.len(),
            "Vendored spec check failed"
        );
        Ok(RunOutcome::Failed)
    }
}

/// Re-vendoring against any [`Upstream`].
pub async fn update<U: Upstream>(upstream: &U, config: &CliConfig) -> Result<RunOutcome> {
    tracing::info!(command = "update", "Updating vendored specs from upstream");
    let report = update_vendored(upstream, &config.specs).await;
    if report.is_success() {
        Ok(RunOutcome::Success)
    } else {
        Ok(RunOutcome::Failed)
    }
}

fn resolve_config(common: &CommonArgs) -> Result<CliConfig> {
    let root = match &common.root {
        Some(root) => root.clone(),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            find_repo_root(&cwd).unwrap_or(cwd)
        }
    };
    load_config(common.config.as_deref(), &root)
}

fn http_upstream(config: &CliConfig) -> Result<HttpUpstream> {
    HttpUpstream::new(config.upstream.clone()).context("Failed to construct HTTP client")
}
