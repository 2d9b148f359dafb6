//! Release source fetcher CLI entrypoint.
//!
//! Resolves a release manifest, downloads the selected project archives
//! into the output directory, and optionally extracts them. Progress goes
//! to standard output; the error that stops a run goes to standard error.

use clap::Parser;
use opensource_fetch::cli::Cli;
use opensource_fetch::config::Settings;
use opensource_fetch::dirs::{BaseDirs, SystemBaseDirs};
use opensource_fetch::error::Result;
use opensource_fetch::logging;
use opensource_fetch::output;
use opensource_fetch::pipeline::{run_dry, run_fetch};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbosity, cli.quiet);

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    let run_result = run(&cli, &SystemBaseDirs, &mut stdout);
    let run_result = run_result.and(output::flush(&mut stdout));

    let mut stderr = std::io::stderr();
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, dirs: &dyn BaseDirs, stdout: &mut dyn Write) -> Result<()> {
    let settings = Settings::load(&cli.overrides(), dirs)?;
    log::debug!(
        "source {}, output {}",
        settings.source,
        settings.output_dir
    );
    let request = cli.request();

    if cli.dry_run {
        run_dry(&request, &settings, stdout)?;
        return Ok(());
    }

    let report = run_fetch(&request, &settings, stdout)?;
    log::info!(
        "fetched {} archive(s) into {}",
        report.archives.len(),
        settings.output_dir
    );
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; ignore write failures.
    }
}
