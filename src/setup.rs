use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Loads `.env` and installs the test log subscriber.
///
/// Safe to call from every test; only the first call installs anything.
pub fn setup_globals() {
    dotenvy::dotenv().ok();
    tracing_subscriber();
}

fn tracing_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // reads directly from Cargo.toml definition
        EnvFilter::new(format!("{pkg}=debug", pkg = env!("CARGO_PKG_NAME")))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer().without_time())
        .try_init();
}
