//! CLI argument definitions for the release source fetcher.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::ConfigOverrides;
use crate::pipeline::FetchRequest;
use crate::selection::Selection;
use crate::stager::OverwritePolicy;
use camino::Utf8PathBuf;
use clap::Parser;

/// Fetch the source archives of a product release.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "opensource-fetch")]
#[command(version, about)]
#[command(long_about = concat!(
    "Fetch the source archives of a product release.\n\n",
    "The product name and release identifier are combined into a release ",
    "moniker (for example macOS 11.4 becomes macos-114), which is used to ",
    "look up the release manifest from the metadata service. Every project ",
    "listed in the manifest is downloaded into the output directory, one at ",
    "a time, unless -s/--selection narrows the set.\n\n",
    "Existing archives are never overwritten unless --force is given. The ",
    "first failure stops the run with a non-zero exit status.",
))]
#[command(after_help = concat!(
    "CONFIGURATION:\n",
    "  The metadata service base URL is taken from --source, then the\n",
    "  OPENSOURCE_FETCH_SOURCE environment variable, then `source` in the\n",
    "  config file, then the built-in default. A plain directory path or a\n",
    "  file:// URL reads <moniker>.json manifests from disk.\n\n",
    "EXAMPLES:\n",
    "  Fetch every project of a release into the current directory:\n",
    "    $ opensource-fetch -p macOS -r 11.4\n\n",
    "  Fetch two projects and unpack them:\n",
    "    $ opensource-fetch -p macOS -r 11.4 -s dyld -s xnu -e -o ~/src\n\n",
    "  Preview without downloading:\n",
    "    $ opensource-fetch -p macOS -r 11.4 --dry-run",
))]
pub struct Cli {
    /// Product name, for example `macOS`.
    #[arg(short, long, value_name = "NAME")]
    pub product: String,

    /// Release identifier, for example `11.4`.
    #[arg(short, long, value_name = "VERSION")]
    pub release: String,

    /// Only fetch projects with this name (case-insensitive, repeatable).
    #[arg(short, long, value_name = "PROJECT")]
    pub selection: Vec<String>,

    /// Destination directory [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<Utf8PathBuf>,

    /// Extract each archive into the destination after downloading it.
    #[arg(short, long)]
    pub extract: bool,

    /// Overwrite archives that already exist in the destination.
    #[arg(short, long)]
    pub force: bool,

    /// Metadata service base URL or local manifest directory.
    #[arg(long, value_name = "URL")]
    pub source: Option<String>,

    /// Configuration file [default: platform config directory].
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Resolve the manifest and list what would be fetched.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Return the configuration values supplied on the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides<'_> {
        ConfigOverrides {
            source: self.source.as_deref(),
            config_path: self.config.as_deref(),
            output: self.output.as_deref(),
        }
    }

    /// Build the fetch request described by the arguments.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use opensource_fetch::cli::Cli;
    /// use opensource_fetch::stager::OverwritePolicy;
    ///
    /// let cli = Cli::parse_from(["opensource-fetch", "-p", "macOS", "-r", "11.4", "-f"]);
    /// let request = cli.request();
    /// assert_eq!(request.moniker().as_str(), "macos-114");
    /// assert_eq!(request.overwrite, OverwritePolicy::Replace);
    /// ```
    #[must_use]
    pub fn request(&self) -> FetchRequest {
        FetchRequest {
            product: self.product.clone(),
            release: self.release.clone(),
            selection: Selection::new(&self.selection),
            extract: self.extract,
            overwrite: if self.force {
                OverwritePolicy::Replace
            } else {
                OverwritePolicy::Refuse
            },
            quiet: self.quiet,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
