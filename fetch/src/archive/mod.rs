//! Archive format detection and extraction.
//!
//! # Sub-modules
//!
//! - [`extraction`] - Extraction trait and the format-dispatching extractor.
//! - [`format`] - Archive format detection from file names.

pub mod extraction;
pub mod format;
