//! Release source fetcher library.
//!
//! This crate resolves the manifest of a product release, downloads the
//! archives of the source projects it lists, and optionally extracts them.
//! It is used by the `opensource-fetch` CLI binary and can be consumed
//! programmatically with injected collaborators for testing.
//!
//! # Modules
//!
//! - [`archive`] - Archive format detection and extraction
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Layered configuration (flags, environment, TOML file)
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Semantic error types for the fetch command
//! - [`logging`] - `env_logger` initialisation from CLI verbosity
//! - [`manifest`] - Release manifest schema and parsing
//! - [`moniker`] - Release moniker derivation
//! - [`output`] - Progress and dry-run formatting
//! - [`pipeline`] - The sequential fetch-and-extract loop
//! - [`remote`] - Metadata service and archive download over HTTP
//! - [`selection`] - Case-insensitive project selection
//! - [`stager`] - Output directory preparation and archive placement

pub mod archive;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod moniker;
pub mod output;
pub mod pipeline;
pub mod remote;
pub mod selection;
pub mod stager;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
