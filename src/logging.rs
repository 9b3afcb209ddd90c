//! Logging setup
//!
//! Every worker logs through `tracing`; the subscriber funnels all of it into
//! a console layer and, when configured, a shared log file. The file writer
//! sits behind one mutex, so multi-line entries from different workers never
//! interleave mid-line.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initializes the tracing subscriber.
///
/// Console verbosity follows `-v`/`-q`; the log file, when given, always
/// records info and above (append mode, created on demand).
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> io::Result<()> {
    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(console_filter(verbose, quiet));

    let file_layer = match log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(EnvFilter::new("info")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(())
}

fn console_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        // Only show errors
        return EnvFilter::new("error");
    }
    match verbose {
        0 => EnvFilter::new("propscape=info,warn"),
        1 => EnvFilter::new("propscape=debug,info"),
        2 => EnvFilter::new("propscape=trace,debug"),
        _ => EnvFilter::new("trace"),
    }
}
