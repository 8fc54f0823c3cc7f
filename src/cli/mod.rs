//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, task invocation tokens and the
//! top-level run loop.

pub mod app;
pub mod invocation;

// Re-export main types
pub use app::*;
pub use invocation::*;
