//! HTTP protocol layer module
//!
//! Response construction shared by every handler branch, decoupled from the
//! message board logic itself.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_405_response, build_empty_response, build_json_response,
    build_options_response,
};
