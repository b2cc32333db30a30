//! Request handler module
//!
//! Dispatch and business logic for the single message resource.

pub mod body;
pub mod error;
pub mod messages;
pub mod query;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
