//! Logger module
//!
//! Provides logging utilities for the message board server:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Level-filtered error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = Level::parse(&config.logging.level).unwrap_or_else(|| {
        eprintln!(
            "[WARN] Unknown log level '{}', using info",
            config.logging.level
        );
        Level::Info
    });
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write at `level`, falling back to stdout/stderr before `init()`
fn write(level: Level, message: &str) {
    if let Some(w) = writer::get() {
        w.write(level, message);
        return;
    }
    match level {
        Level::Error | Level::Warn => eprintln!("{message}"),
        Level::Info => println!("{message}"),
        Level::Debug => {}
    }
}

fn write_info(message: &str) {
    write(Level::Info, message);
}

/// Write to access log specifically
fn write_access(message: &str) {
    if let Some(w) = writer::get() {
        w.write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Message board server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!(
        "Resource: {} ({:?} match)",
        config.board.resource_path, config.board.match_mode
    ));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!("Max body size: {} bytes", config.http.max_body_size));
    if let Some(max_conn) = config.performance.max_connections {
        write_info(&format!("Max connections: {max_conn}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write(Level::Debug, &format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write(Level::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    write(Level::Debug, &format!("[Request] {method} {uri} {version:?}"));
}

/// Prefix `message` with the tag of `level`
fn tagged(level: Level, message: &str) -> String {
    let tag = match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
    };
    format!("[{tag}] {message}")
}

pub fn log_error(message: &str) {
    write(Level::Error, &tagged(Level::Error, message));
}

pub fn log_warning(message: &str) {
    write(Level::Warn, &tagged(Level::Warn, message));
}

pub fn log_info(message: &str) {
    write_info(&tagged(Level::Info, message));
}

pub fn log_debug(message: &str) {
    write(Level::Debug, &tagged(Level::Debug, message));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown_requested(active: usize) {
    write_info(&format!(
        "\n[Shutdown] Stopped accepting connections ({active} still active)"
    ));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections closed, bye");
    } else {
        write(
            Level::Warn,
            &format!("[Shutdown] Grace period elapsed with {remaining} connection(s) still open"),
        );
    }
}
