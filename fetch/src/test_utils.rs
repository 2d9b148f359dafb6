//! Shared test utilities for the fetch crate.
//!
//! Builders for manifest JSON and small archives, plus a one-shot `tiny_http`
//! server for exercising the `ureq`-backed collaborators without network
//! access.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::thread::JoinHandle;
use tiny_http::{Response, Server, StatusCode};

use crate::archive::format::ArchiveFormat;

/// Build a manifest document from `(id, name, url)` triples.
///
/// # Examples
///
/// ```
/// use opensource_fetch::test_utils::manifest_json;
///
/// let json = manifest_json(&[("a", "A", "https://example.test/a.tar.gz")]);
/// assert!(json.contains("\"projects\""));
/// ```
#[must_use]
pub fn manifest_json(projects: &[(&str, &str, &str)]) -> String {
    let table: serde_json::Map<String, serde_json::Value> = projects
        .iter()
        .map(|(id, name, url)| {
            (
                (*id).to_owned(),
                serde_json::json!({ "name": name, "url": url }),
            )
        })
        .collect();
    serde_json::json!({ "projects": table }).to_string()
}

/// A single file to place in a test archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Archive-relative path.
    pub path: String,
    /// File contents.
    pub contents: Vec<u8>,
}

impl ArchiveEntry {
    /// Create a file entry.
    #[must_use]
    pub fn file(path: &str, contents: &[u8]) -> Self {
        Self {
            path: path.to_owned(),
            contents: contents.to_vec(),
        }
    }
}

/// Write an archive containing `entries` to `path`, choosing the format from
/// the file name.
///
/// # Errors
///
/// Returns an error if the name has no recognised archive extension or any
/// write fails.
pub fn write_archive(path: &Path, entries: &[ArchiveEntry]) -> std::io::Result<()> {
    let format = ArchiveFormat::from_path(path).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("no archive format for {}", path.display()),
        )
    })?;
    let file = File::create(path)?;

    match format {
        ArchiveFormat::Tar => {
            append_tar_entries(file, entries)?;
        }
        ArchiveFormat::TarGz => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            append_tar_entries(encoder, entries)?.finish()?;
        }
        ArchiveFormat::TarZst => {
            // Explicitly finish both the tar builder and the zstd encoder to
            // ensure the frame is complete.
            let encoder = zstd::Encoder::new(file, 0)?;
            append_tar_entries(encoder, entries)?.finish()?;
        }
        ArchiveFormat::Zip => {
            let mut writer = zip::ZipWriter::new(file);
            for entry in entries {
                writer
                    .start_file(entry.path.as_str(), zip::write::SimpleFileOptions::default())
                    .map_err(std::io::Error::other)?;
                writer.write_all(&entry.contents)?;
            }
            writer.finish().map_err(std::io::Error::other)?;
        }
    }
    Ok(())
}

fn append_tar_entries<W: Write>(writer: W, entries: &[ArchiveEntry]) -> std::io::Result<W> {
    let mut builder = tar::Builder::new(writer);
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(entry.contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, &entry.path, entry.contents.as_slice())?;
    }
    builder.into_inner()
}

/// A local HTTP server that answers exactly one request.
#[derive(Debug)]
pub struct OneShotServer {
    base_url: String,
    handle: JoinHandle<String>,
}

impl OneShotServer {
    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Wait for the request to be served and return its request path.
    ///
    /// Returns an empty string if no request was received.
    #[must_use]
    pub fn request_path(self) -> String {
        self.handle.join().unwrap_or_default()
    }
}

/// Serve a single request on an ephemeral localhost port, replying with
/// `status` and `body`.
///
/// # Panics
///
/// Panics if no localhost port can be bound.
#[must_use]
pub fn serve_once(status: u16, body: Vec<u8>) -> OneShotServer {
    let server = Server::http("127.0.0.1:0").unwrap_or_else(|e| panic!("bind: {e}"));
    let port = server
        .server_addr()
        .to_ip()
        .map(|addr| addr.port())
        .unwrap_or_else(|| panic!("server is not listening on an IP address"));

    let handle = std::thread::spawn(move || {
        let Ok(request) = server.recv() else {
            return String::new();
        };
        let path = request.url().to_owned();
        let response = Response::from_data(body).with_status_code(StatusCode(status));
        if request.respond(response).is_err() {
            // The client hung up; the path is still reported.
        }
        path
    });

    OneShotServer {
        base_url: format!("http://127.0.0.1:{port}"),
        handle,
    }
}
