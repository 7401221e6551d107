use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Database connection settings shared by every binary.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Reconciler sweep settings shared by `deposit-applier` and
/// `withdraw-banker`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    /// Only rows whose id starts with this hex prefix are claimed by this
    /// replica, so several replicas can shard the table (spec §4.6/§4.7).
    #[serde(default)]
    pub id_prefix: String,
    #[serde(default = "default_sleep_interval_secs")]
    pub sleep_interval_secs: u64,
}

fn default_sleep_interval_secs() -> u64 {
    10
}

/// Loads `T` layered file-then-environment, matching the original's
/// viper-based `lib/config/config.go` generalized to the idiomatic Rust
/// `config` crate: a file at `CONFIG_PATH` (default `./config.yaml`)
/// provides the base, then environment variables prefixed `APP__` and
/// separated by `__` override individual nested fields (e.g.
/// `APP__DATABASE__URL`).
pub fn load_config<T: DeserializeOwned>() -> anyhow::Result<T> {
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "./config.yaml".to_string());

    let builder = config::Config::builder()
        .add_source(config::File::with_name(&config_path).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

    let settings = builder.build()?;
    let parsed = settings.try_deserialize::<T>()?;
    Ok(parsed)
}

/// `DEV` or `PROD`, read from the `ENV` variable (defaults to `DEV`),
/// driving both the tracing layer choice and the log level (spec §6,
/// `examples/original_source/lib/utils/logger/logger.go`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Dev,
    Prod,
}

impl RuntimeEnv {
    pub fn from_env() -> Self {
        match std::env::var("ENV").unwrap_or_default().to_uppercase().as_str() {
            "PROD" | "PRODUCTION" => RuntimeEnv::Prod,
            _ => RuntimeEnv::Dev,
        }
    }
}
