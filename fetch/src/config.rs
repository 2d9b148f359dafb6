//! Layered configuration for the fetch command.
//!
//! Settings are resolved from, highest priority first:
//!
//! 1. command-line flags,
//! 2. the `OPENSOURCE_FETCH_SOURCE` environment variable (source only),
//! 3. a TOML file: the `--config` path, or `config.toml` in the per-user
//!    configuration directory when present,
//! 4. built-in defaults.
//!
//! ```toml
//! source = "https://example.org/releases"
//! connect_timeout_secs = 30
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::dirs::BaseDirs;
use crate::remote::http::DEFAULT_CONNECT_TIMEOUT;

/// Metadata service used when nothing else is configured.
pub const DEFAULT_SOURCE: &str = "https://opensource.apple.com/releases";

/// Environment variable that overrides the metadata service base URL.
pub const SOURCE_ENV: &str = "OPENSOURCE_FETCH_SOURCE";

/// File name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors arising while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config file {path}: {source}")]
    Read {
        /// Path of the file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has unknown keys.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Path of the file.
        path: Utf8PathBuf,
        /// The underlying TOML error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// The metadata source is not a usable URL.
    #[error("invalid metadata source \"{value}\": {reason}")]
    InvalidSource {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The connect timeout is zero.
    #[error("connect_timeout_secs must be greater than zero")]
    ZeroTimeout,

    /// A required directory could not be determined or is not UTF-8.
    #[error("invalid path: {reason}")]
    InvalidPath {
        /// Description of the problem.
        reason: String,
    },
}

/// Values read from the TOML configuration file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Metadata service base URL.
    pub source: Option<String>,
    /// Bound on establishing HTTP connections, in seconds.
    pub connect_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Parse configuration text; `path` is used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use opensource_fetch::config::FileConfig;
    ///
    /// let config = FileConfig::parse("connect_timeout_secs = 5", Utf8Path::new("config.toml"))
    ///     .expect("valid config");
    /// assert_eq!(config.connect_timeout_secs, Some(5));
    /// assert!(config.source.is_none());
    /// ```
    pub fn parse(contents: &str, path: &Utf8Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source: Box::new(source),
        })
    }

    /// Read and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is invalid.
    pub fn load_from(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Load the explicit file if given, otherwise the default file if it
    /// exists, otherwise an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file exists but cannot be read or
    /// parsed, or if an explicit file is missing.
    pub fn load(explicit: Option<&Utf8Path>, dirs: &dyn BaseDirs) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let Some(config_dir) = dirs.config_dir() else {
            log::trace!("no configuration directory on this platform");
            return Ok(Self::default());
        };
        let path = config_dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            log::trace!("no config file at {}", path.display());
            return Ok(Self::default());
        }
        let path = Utf8PathBuf::from_path_buf(path).map_err(|path| ConfigError::InvalidPath {
            reason: format!("config path is not valid UTF-8: {}", path.display()),
        })?;
        log::debug!("loading configuration from {path}");
        Self::load_from(&path)
    }
}

/// Command-line values that take precedence over every other layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigOverrides<'a> {
    /// `--source`.
    pub source: Option<&'a str>,
    /// `--config`.
    pub config_path: Option<&'a Utf8Path>,
    /// `--output`.
    pub output: Option<&'a Utf8Path>,
}

/// Fully resolved settings for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Metadata service base URL.
    pub source: Url,
    /// Bound on establishing HTTP connections.
    pub connect_timeout: Duration,
    /// Directory that receives archives and extracted sources.
    pub output_dir: Utf8PathBuf,
}

impl Settings {
    /// Resolve settings from the process environment and configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if any layer holds an invalid value.
    pub fn load(overrides: &ConfigOverrides<'_>, dirs: &dyn BaseDirs) -> Result<Self, ConfigError> {
        let file = FileConfig::load(overrides.config_path, dirs)?;
        let env_source = std::env::var(SOURCE_ENV).ok();
        Self::resolve(overrides, env_source.as_deref(), &file, dirs)
    }

    /// Merge the configuration layers.
    ///
    /// # Errors
    ///
    /// Returns an error if the winning source is not a usable URL or path,
    /// the timeout is zero, or the default output directory is unavailable.
    pub fn resolve(
        overrides: &ConfigOverrides<'_>,
        env_source: Option<&str>,
        file: &FileConfig,
        dirs: &dyn BaseDirs,
    ) -> Result<Self, ConfigError> {
        let raw_source = overrides
            .source
            .or(env_source.filter(|value| !value.trim().is_empty()))
            .or(file.source.as_deref())
            .unwrap_or(DEFAULT_SOURCE);
        let source = parse_source(raw_source, dirs)?;

        let connect_timeout = match file.connect_timeout_secs {
            Some(0) => return Err(ConfigError::ZeroTimeout),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_CONNECT_TIMEOUT,
        };

        let output_dir = match overrides.output {
            Some(dir) => dir.to_owned(),
            None => current_dir(dirs)?,
        };

        Ok(Self {
            source,
            connect_timeout,
            output_dir,
        })
    }
}

/// Parse a source value as a URL, or as a local directory path when it has
/// no scheme.
fn parse_source(value: &str, dirs: &dyn BaseDirs) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidSource {
        value: value.to_owned(),
        reason,
    };

    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = Utf8Path::new(value);
            let absolute = if path.is_absolute() {
                path.to_owned()
            } else {
                current_dir(dirs)?.join(path)
            };
            Url::from_directory_path(absolute.as_std_path())
                .map_err(|()| invalid("not an absolute directory path".to_owned()))?
        }
        Err(e) => return Err(invalid(e.to_string())),
    };

    match url.scheme() {
        "http" | "https" | "file" => Ok(url),
        other => Err(invalid(format!("scheme {other} is not supported"))),
    }
}

fn current_dir(dirs: &dyn BaseDirs) -> Result<Utf8PathBuf, ConfigError> {
    let cwd = dirs.current_dir().ok_or_else(|| ConfigError::InvalidPath {
        reason: "could not determine the current directory".to_owned(),
    })?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|path| ConfigError::InvalidPath {
        reason: format!("current directory is not valid UTF-8: {}", path.display()),
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
