// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub board: BoardConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub cors: CorsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: super::DEFAULT_HOST.to_string(),
            port: super::DEFAULT_PORT,
            workers: None,
        }
    }
}

/// How the request path is compared against `resource_path`
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Path must equal the resource path
    #[default]
    Exact,
    /// Path may continue the resource path with `/`
    Prefix,
}

/// Message board resource configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    /// The single resource path served (e.g. `/classes/messages`)
    pub resource_path: String,
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            resource_path: super::DEFAULT_RESOURCE_PATH.to_string(),
            match_mode: MatchMode::Exact,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Seconds an idle keep-alive connection is kept open; 0 disables keep-alive
    pub keep_alive_timeout: u64,
    /// Seconds a client has to send each request head
    pub read_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds in-flight connections get to finish after a shutdown signal
    pub shutdown_grace_period: u64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            max_connections: None,
            shutdown_grace_period: 5,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
    pub body_read_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: super::DEFAULT_SERVER_NAME.to_string(),
            max_body_size: u64::from(super::DEFAULT_MAX_BODY_SIZE),
            body_read_timeout_ms: u64::from(super::DEFAULT_BODY_READ_TIMEOUT_MS),
        }
    }
}

/// CORS headers attached to every response
#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
    /// Preflight cache lifetime in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, PUT, DELETE, OPTIONS".to_string(),
            allow_headers: "content-type, accept".to_string(),
            max_age: 10,
        }
    }
}
