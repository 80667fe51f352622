//! Log output for the sift binary.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map `-q` and the `-v` count to a maximum level.
fn level_for(verbose: u8, quiet: bool) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    }
}

/// Initialize logging to stderr.
///
/// `RUST_LOG` takes precedence over the flags when set.
pub fn init_logging(verbose: u8, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet).as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    Ok(())
}
