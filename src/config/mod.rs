//! Task file parsing, validation and loading
//!
//! This module handles knit.yml task files: finding and parsing them,
//! validating their structure, and registering their tasks.

pub mod load;
pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use load::*;
pub use parse::*;
pub use schema::*;
pub use types::*;
