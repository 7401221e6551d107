use serde::Deserialize;
use wallet_core::config::DatabaseConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub database: DatabaseConfig,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Bearer token every request must present (spec §6,
    /// `lib/rest/internal/middlewares/auth.go`).
    pub auth_token: String,
    /// How long `main` waits for in-flight requests to drain after a
    /// cancellation signal before giving up (spec §6's "graceful shutdown
    /// timeout").
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}
