use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::RuntimeEnv;

/// Initializes the global tracing subscriber: `DEV` gets the human-readable
/// `fmt` layer at `debug`, `PROD` gets JSON at `info`, each overridable via
/// `RUST_LOG`. Generalizes the teacher's single `fmt`-layer setup
/// (`wallet-service/src/main.rs`) to the DEV/PROD split the original
/// source's `lib/utils/logger/logger.go` draws between environments.
pub fn init(service_name: &str, env: RuntimeEnv) {
    let default_filter = match env {
        RuntimeEnv::Dev => format!("{service_name}=debug,wallet_core=debug,tower_http=debug"),
        RuntimeEnv::Prod => format!("{service_name}=info,wallet_core=info,tower_http=info"),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let registry = tracing_subscriber::registry().with(filter);

    match env {
        RuntimeEnv::Dev => registry.with(tracing_subscriber::fmt::layer()).init(),
        RuntimeEnv::Prod => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
    }
}
