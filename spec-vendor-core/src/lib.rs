#![doc = "spec-vendor-core: registry, preprocessing and vendoring logic for the docs site's OpenAPI specs."]

//! This crate holds all business logic; the `spec-vendor` crate is CLI glue only.
//!
//! # Modules
//! - [`registry`]: the spec table and path resolution
//! - [`document`] / [`normalize`]: partial OpenAPI model and the normalizing edits
//! - [`preprocess`] / [`output`]: the batch pipeline and its shared artifacts
//! - [`contract`] / [`download`]: upstream transport trait and its HTTP implementation
//! - [`drift`] / [`update`]: vendoring guard and re-vendoring

pub mod config;
pub mod contract;
pub mod document;
pub mod download;
pub mod drift;
pub mod normalize;
pub mod output;
pub mod preprocess;
pub mod registry;
pub mod update;
