use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a `tracing-subscriber` registry with an `EnvFilter` defaulting to `ledger=debug`.
pub fn init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "ledger=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
