//! Command-line arguments for the `recolor` client.

use std::path::PathBuf;

use clap::Parser;

/// Default budget for one exchange with the service, in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Submits a batch of RGB colors to the recolor service and prints the
/// recolored batch.
///
/// The batch is a JSON list of `{"r": .., "g": .., "b": ..}` objects.
#[derive(Parser, Debug)]
#[command(name = "recolor", version)]
pub(crate) struct Cli {
    /// Milliseconds allowed for connecting, sending and awaiting the reply.
    #[arg(
        long,
        value_name = "MILLISECONDS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub(crate) timeout_ms: u64,
    /// File holding the batch; reads standard input when omitted or `-`.
    #[arg(value_name = "FILE")]
    pub(crate) input: Option<PathBuf>,
}

impl Cli {
    /// Returns the input file, or `None` when the batch comes from stdin.
    pub(crate) fn input_file(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|path| path.as_os_str() != "-")
    }
}
