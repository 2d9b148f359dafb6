//! Fetch pipeline orchestration.
//!
//! Resolves the release manifest, prepares the output directory, and walks
//! the selected projects one at a time: plan, report, download, place, and
//! optionally extract. The first failure aborts the run; nothing is retried
//! or rolled back.
//!
//! Collaborators that touch the network or unpack archives are injected
//! through [`Collaborators`] so the loop can be driven by mocks in tests.

use crate::archive::extraction::{ArchiveExtractor, FormatExtractor};
use crate::config::Settings;
use crate::error::{FetchError, Result};
use crate::manifest::{ProjectEntry, ReleaseManifest};
use crate::moniker::Moniker;
use crate::output::{DryRunInfo, report_project, write_line};
use crate::remote::download::{ArchiveDownloader, HttpDownloader, archive_filename};
use crate::remote::http::http_agent;
use crate::remote::metadata::{MetadataSource, source_for};
use crate::selection::Selection;
use crate::stager::{OverwritePolicy, Stager};
use camino::Utf8PathBuf;
use std::io::Write;
use url::Url;

/// What the caller asked to fetch.
#[derive(Clone, Debug, Default)]
pub struct FetchRequest {
    /// Product name, for example `macOS`.
    pub product: String,
    /// Release identifier, for example `11.4`.
    pub release: String,
    /// Projects to include; empty means all.
    pub selection: Selection,
    /// Whether to extract each archive after download.
    pub extract: bool,
    /// What to do with archives that already exist.
    pub overwrite: OverwritePolicy,
    /// Suppress progress lines.
    pub quiet: bool,
}

impl FetchRequest {
    /// Return the release moniker for this request.
    #[must_use]
    pub fn moniker(&self) -> Moniker {
        Moniker::new(&self.product, &self.release)
    }
}

/// Injected collaborators for a fetch run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Resolves release manifests.
    pub metadata: &'a dyn MetadataSource,
    /// Downloads project archives.
    pub downloader: &'a dyn ArchiveDownloader,
    /// Unpacks downloaded archives.
    pub extractor: &'a dyn ArchiveExtractor,
}

/// A project whose archive location has been validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedProject {
    /// Manifest identifier of the project.
    pub id: String,
    /// Archive download URL.
    pub url: Url,
    /// Archive file name, taken from the last URL path segment.
    pub filename: String,
    /// Where the archive will be written.
    pub destination: Utf8PathBuf,
}

/// Summary of a completed fetch run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Archives written, in processing order.
    pub archives: Vec<Utf8PathBuf>,
    /// Number of entries extracted across all archives.
    pub extracted_entries: usize,
}

/// Look up the manifest for the request's release.
///
/// # Errors
///
/// Returns [`FetchError::ManifestNotFound`] when the service has no manifest
/// for the moniker and [`FetchError::ManifestRequest`] for any other lookup
/// failure.
pub fn resolve_manifest(
    request: &FetchRequest,
    metadata: &dyn MetadataSource,
) -> Result<(Moniker, ReleaseManifest)> {
    let moniker = request.moniker();
    let manifest = metadata
        .fetch_manifest(&moniker)
        .map_err(|e| FetchError::from_metadata(&moniker, e))?;
    log::debug!("manifest {moniker} lists {} project(s)", manifest.len());
    Ok((moniker, manifest))
}

/// Validate a project's archive URL and compute its destination.
///
/// # Errors
///
/// Returns [`FetchError::MissingUrl`] when the entry has no URL, and
/// [`FetchError::UrlParse`] when the URL is malformed or has no final path
/// segment to name the archive.
pub fn plan_project(id: &str, entry: &ProjectEntry, stager: &Stager) -> Result<PlannedProject> {
    let raw = entry.url().ok_or_else(|| FetchError::MissingUrl {
        project: id.to_owned(),
    })?;
    let url_error = |reason: String| FetchError::UrlParse {
        project: id.to_owned(),
        url: raw.to_owned(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| url_error(e.to_string()))?;
    let filename = archive_filename(&url)
        .ok_or_else(|| url_error("URL has no archive file name".to_owned()))?;
    let destination = stager.destination(&filename);

    Ok(PlannedProject {
        id: id.to_owned(),
        url,
        filename,
        destination,
    })
}

/// Fetch the selected projects of a release using injected collaborators.
///
/// Projects are processed sequentially in manifest order. Each project is
/// planned only when reached, so an invalid URL late in the manifest does
/// not prevent earlier projects from being fetched.
///
/// # Errors
///
/// Returns the first error encountered; later projects are not attempted.
pub fn run_fetch_with(
    request: &FetchRequest,
    stager: &Stager,
    collaborators: Collaborators<'_>,
    stdout: &mut dyn Write,
) -> Result<FetchReport> {
    let (moniker, manifest) = resolve_manifest(request, collaborators.metadata)?;
    stager.prepare()?;

    let mut report = FetchReport::default();
    for (id, entry) in request.selection.filter(&manifest) {
        let project = plan_project(id, entry, stager)?;
        if !request.quiet {
            report_project(stdout, &project)?;
        }
        fetch_project(&project, stager, collaborators.downloader)?;

        if request.extract {
            report.extracted_entries +=
                extract_project(&project, stager, collaborators.extractor)?;
        }
        report.archives.push(project.destination);
    }

    if report.archives.is_empty() && !request.selection.is_empty() {
        log::warn!("no projects in {moniker} matched the selection");
    }
    Ok(report)
}

fn fetch_project(
    project: &PlannedProject,
    stager: &Stager,
    downloader: &dyn ArchiveDownloader,
) -> Result<()> {
    stager.ensure_available(&project.destination)?;

    let scratch = stager
        .scratch_file()
        .map_err(|source| FetchError::FileMove {
            path: project.destination.clone(),
            source,
        })?;
    log::debug!("downloading {} from {}", project.id, project.url);
    downloader
        .download(&project.url, scratch.path())
        .map_err(|source| FetchError::Download {
            project: project.id.clone(),
            source,
        })?;

    stager.place(scratch, &project.destination)
}

fn extract_project(
    project: &PlannedProject,
    stager: &Stager,
    extractor: &dyn ArchiveExtractor,
) -> Result<usize> {
    let entries = extractor
        .extract(
            project.destination.as_std_path(),
            stager.output_dir().as_std_path(),
        )
        .map_err(|source| FetchError::Extraction {
            path: project.destination.clone(),
            source,
        })?;
    log::debug!(
        "extracted {} entries from {}",
        entries.len(),
        project.filename
    );
    Ok(entries.len())
}

/// List what a fetch would do without creating directories or downloading.
///
/// # Errors
///
/// Returns an error if the manifest cannot be resolved, a selected project
/// has an unusable URL, or the report cannot be written.
pub fn run_dry_with(
    request: &FetchRequest,
    settings: &Settings,
    metadata: &dyn MetadataSource,
    stdout: &mut dyn Write,
) -> Result<Vec<PlannedProject>> {
    let (moniker, manifest) = resolve_manifest(request, metadata)?;
    let stager = Stager::new(settings.output_dir.clone(), request.overwrite);
    let projects = request
        .selection
        .filter(&manifest)
        .map(|(id, entry)| plan_project(id, entry, &stager))
        .collect::<Result<Vec<_>>>()?;

    let info = DryRunInfo {
        moniker: &moniker,
        source: &settings.source,
        output_dir: stager.output_dir(),
        extract: request.extract,
        overwrite: request.overwrite,
        projects: &projects,
    };
    write_line(stdout, info.display_text())?;
    Ok(projects)
}

/// Fetch a release with the production HTTP and extraction collaborators.
///
/// # Errors
///
/// Returns the first error encountered.
pub fn run_fetch(
    request: &FetchRequest,
    settings: &Settings,
    stdout: &mut dyn Write,
) -> Result<FetchReport> {
    let agent = http_agent(settings.connect_timeout);
    let metadata = source_for(&settings.source, agent.clone())
        .map_err(|e| FetchError::from_metadata(&request.moniker(), e))?;
    let downloader = HttpDownloader::new(agent);
    let extractor = FormatExtractor;
    let stager = Stager::new(settings.output_dir.clone(), request.overwrite);

    let collaborators = Collaborators {
        metadata: metadata.as_ref(),
        downloader: &downloader,
        extractor: &extractor,
    };
    run_fetch_with(request, &stager, collaborators, stdout)
}

/// Dry-run counterpart of [`run_fetch`].
///
/// # Errors
///
/// Returns an error if the manifest cannot be resolved or listed.
pub fn run_dry(
    request: &FetchRequest,
    settings: &Settings,
    stdout: &mut dyn Write,
) -> Result<Vec<PlannedProject>> {
    let metadata = source_for(&settings.source, http_agent(settings.connect_timeout))
        .map_err(|e| FetchError::from_metadata(&request.moniker(), e))?;
    run_dry_with(request, settings, metadata.as_ref(), stdout)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
