//! Output formatting for the fetch CLI.
//!
//! Progress lines and dry-run reports are user output, written to standard
//! output through an injected writer. Diagnostics go through `log` instead.

use crate::error::{FetchError, Result};
use crate::moniker::Moniker;
use crate::pipeline::PlannedProject;
use crate::stager::OverwritePolicy;
use camino::Utf8Path;
use std::io::Write;
use url::Url;

/// Format the first progress line for a project: its archive file name.
///
/// # Example
///
/// ```
/// use opensource_fetch::output::project_header;
///
/// assert_eq!(project_header("dyld-832.7.3.tar.gz"), "* dyld-832.7.3.tar.gz");
/// ```
#[must_use]
pub fn project_header(filename: &str) -> String {
    format!("* {filename}")
}

/// Write one line to `out`.
///
/// # Errors
///
/// Returns [`FetchError::WriteFailed`] if the write fails.
pub fn write_line(out: &mut dyn Write, message: impl std::fmt::Display) -> Result<()> {
    writeln!(out, "{message}").map_err(|source| FetchError::WriteFailed { source })
}

/// Flush buffered progress output.
///
/// # Errors
///
/// Returns [`FetchError::WriteFailed`] if the flush fails.
pub fn flush(out: &mut dyn Write) -> Result<()> {
    out.flush().map_err(|source| FetchError::WriteFailed { source })
}

/// Write the two progress lines for a project about to be downloaded.
///
/// # Errors
///
/// Returns [`FetchError::WriteFailed`] if either write fails.
pub fn report_project(out: &mut dyn Write, project: &PlannedProject) -> Result<()> {
    write_line(out, project_header(&project.filename))?;
    write_line(out, &project.destination)
}

/// Everything shown by `--dry-run`.
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Release moniker the manifest was resolved with.
    pub moniker: &'a Moniker,
    /// Metadata service base URL.
    pub source: &'a Url,
    /// Directory that would receive the archives.
    pub output_dir: &'a Utf8Path,
    /// Whether archives would be extracted.
    pub extract: bool,
    /// Overwrite policy for existing archives.
    pub overwrite: OverwritePolicy,
    /// Projects that would be fetched, in order.
    pub projects: &'a [PlannedProject],
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        let mut lines = vec![
            "Dry run - no files will be downloaded".to_owned(),
            String::new(),
            format!("Release: {}", self.moniker),
            format!("Source: {}", self.source),
            format!("Output directory: {}", self.output_dir),
            format!("Extract: {}", yes_no(self.extract)),
            format!(
                "Overwrite existing: {}",
                yes_no(self.overwrite == OverwritePolicy::Replace)
            ),
            String::new(),
            "Projects to fetch:".to_owned(),
        ];

        if self.projects.is_empty() {
            lines.push("  (none)".to_owned());
        }
        for project in self.projects {
            lines.push(format!(
                "  - {}: {} -> {}",
                project.id, project.filename, project.destination
            ));
        }

        lines.join("\n")
    }
}
