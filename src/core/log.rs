use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

fn default_directives(verbose: bool) -> &'static str {
    if verbose { "fxconv=debug" } else { "off" }
}

/// `RUST_LOG` wins when set; otherwise `verbose` picks between crate debug logs and silence.
fn filter_directives(verbose: bool, env_directives: Option<String>) -> String {
    env_directives
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| default_directives(verbose).to_string())
}

/// Installs the global subscriber. Logs go to stderr so they never mix with
/// conversion output.
pub fn init_logging(verbose: bool) {
    let directives = filter_directives(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
