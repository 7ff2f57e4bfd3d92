//! Runtime for the `recolor` client.
//!
//! The client reads a JSON batch of colors, submits it to the service as a
//! single `run` request and prints the recolored batch. Configuration loading
//! and the IO streams can be substituted so the runtime is testable without a
//! real terminal.

use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use clap::error::ErrorKind;

mod cli;
mod config;
mod errors;
mod request;
mod transport;

use cli::Cli;
use config::split_config_arguments;
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use request::{read_batch, submit, write_batch};
use transport::Connection;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `recolor_config::Config`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--service-socket",
    "--log-filter",
    "--log-format",
];

/// Bundles the IO streams provided to the client runtime.
pub(crate) struct IoStreams<'a, R: Read, W: Write, E: Write> {
    pub(crate) stdin: &'a mut R,
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

/// Runs the client using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    let mut io = IoStreams {
        stdin,
        stdout,
        stderr,
    };
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the client with a custom configuration loader.
pub(crate) fn run_with_loader<I, R, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, R, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    match execute(&args, io, loader) {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error)) if is_informational(&error) => {
            match write!(io.stdout, "{error}") {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
        Err(error) => {
            let _ = writeln!(io.stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn is_informational(error: &clap::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

fn execute<R, W, E, L>(
    args: &[OsString],
    io: &mut IoStreams<'_, R, W, E>,
    loader: &L,
) -> Result<(), AppError>
where
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let split = split_config_arguments(args);
    let cli = Cli::try_parse_from(&split.cli_arguments).map_err(AppError::CliUsage)?;
    let config = loader.load(&split.config_arguments)?;

    let batch = match cli.input_file() {
        Some(path) => {
            let file = File::open(path).map_err(|source| AppError::ReadInput {
                origin: path.display().to_string(),
                source,
            })?;
            read_batch(file, &path.display().to_string())?
        }
        None => read_batch(&mut *io.stdin, "standard input")?,
    };

    let budget = Duration::from_millis(cli.timeout_ms);
    let mut connection = Connection::open(config.service_socket(), budget)?;
    let replaced = submit(&mut connection, &batch)?;
    write_batch(&mut *io.stdout, &replaced)
}
