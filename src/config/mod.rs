// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{BoardConfig, Config, CorsConfig, MatchMode};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_RESOURCE_PATH: &str = "/classes/messages";
pub const DEFAULT_SERVER_NAME: &str = "message-board/0.1";
pub const DEFAULT_MAX_BODY_SIZE: u32 = 1_048_576; // 1MB
pub const DEFAULT_BODY_READ_TIMEOUT_MS: u32 = 10_000;

impl Config {
    /// Load configuration from `config.toml` in the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// A missing file is not an error: every key has a default, and
    /// `BOARD__SECTION__KEY` environment variables override both.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let defaults = CorsConfig::default();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("BOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("board.resource_path", DEFAULT_RESOURCE_PATH)?
            .set_default("board.match_mode", "exact")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.shutdown_grace_period", 5)?
            .set_default("http.server_name", DEFAULT_SERVER_NAME)?
            .set_default("http.max_body_size", i64::from(DEFAULT_MAX_BODY_SIZE))?
            .set_default(
                "http.body_read_timeout_ms",
                i64::from(DEFAULT_BODY_READ_TIMEOUT_MS),
            )?
            .set_default("cors.allow_origin", defaults.allow_origin)?
            .set_default("cors.allow_methods", defaults.allow_methods)?
            .set_default("cors.allow_headers", defaults.allow_headers)?
            .set_default("cors.max_age", i64::try_from(defaults.max_age).unwrap_or(0))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
