//! Remote collaborators: the release metadata service and archive downloads.
//!
//! Both are expressed as traits so the fetch pipeline can be driven with
//! stubs and mocks in tests.
//!
//! # Sub-modules
//!
//! - [`download`] - Archive download trait and HTTP implementation.
//! - [`http`] - Shared `ureq` agent construction.
//! - [`metadata`] - Manifest lookup trait with HTTP and local-directory sources.

pub mod download;
pub mod http;
pub mod metadata;
