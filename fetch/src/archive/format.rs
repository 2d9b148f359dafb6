//! Archive format detection.

use std::fmt;
use std::path::Path;

/// Archive formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Uncompressed tar.
    Tar,
    /// Gzip-compressed tar (`.tar.gz`, `.tgz`).
    TarGz,
    /// Zstandard-compressed tar (`.tar.zst`, `.tzst`).
    TarZst,
    /// Zip archive.
    Zip,
}

impl ArchiveFormat {
    /// Detect the archive format from a file name, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use opensource_fetch::archive::format::ArchiveFormat;
    /// use std::path::Path;
    ///
    /// let format = ArchiveFormat::from_path(Path::new("dyld-832.7.3.tar.gz"));
    /// assert_eq!(format, Some(ArchiveFormat::TarGz));
    /// assert_eq!(ArchiveFormat::from_path(Path::new("README")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.zst") || name.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarZst => "tar.zst",
            Self::Zip => "zip",
        };
        f.write_str(label)
    }
}
