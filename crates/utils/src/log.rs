use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Install the global subscriber. `RUST_LOG` wins over `default_directive`.
pub fn init_tracing(default_directive: &str) {
    install(default_directive, std::io::stdout);
}

/// Same as [`init_tracing`] but logs to stderr, for binaries that own stdout.
pub fn init_tracing_stderr(default_directive: &str) {
    install(default_directive, std::io::stderr);
}

fn install<W>(default_directive: &str, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // Ignore the error when a subscriber is already installed (tests, embedding).
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_target(true).with_filter(env_filter))
        .try_init();
}
