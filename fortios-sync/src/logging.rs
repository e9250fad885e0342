//! Diagnostic output for the command-line tool.
//!
//! Events go to stderr so JSON written to stdout stays machine-readable.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::Subscriber;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding extra filter directives.
pub const LOG_ENV: &str = "FORTIOS_SYNC_LOG";

/// Level selected by the `-v`/`-q` flags.
pub fn level(verbose: u8, quiet: bool) -> LevelFilter {
    match (verbose, quiet) {
        (0, true) => LevelFilter::ERROR,
        (0, false) => LevelFilter::WARN,
        (1, _) => LevelFilter::INFO,
        (2, _) => LevelFilter::DEBUG,
        (_, _) => LevelFilter::TRACE,
    }
}

pub fn init(verbose: u8, quiet: bool) {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .from_env_lossy()
        .add_directive(level(verbose, quiet).into());

    let format = fmt::format().compact();

    let builder = Subscriber::builder()
        .event_format(format)
        .without_time()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);
    builder.init();
}
