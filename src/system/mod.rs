//! Helpers task actions call into
//!
//! Shell command execution, environment variable assignment and glob-based
//! removal. Each echoes what it does with the [`COMMAND_PREFIX`].

pub mod env;
pub mod fs;
pub mod shell;

// Re-export main types
pub use env::*;
pub use fs::*;
pub use shell::*;
