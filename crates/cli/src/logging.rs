use tracing_subscriber::EnvFilter;

/// Initialise logging to stderr.
///
/// Without `--verbose` the level is fixed at `info`. With it the default is
/// `debug` and `RUST_LOG` may override it.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
