//! Task declarations
//!
//! This module holds the task entity model and the registry tasks are
//! declared into.

pub mod model;
pub mod registry;

// Re-export main types
pub use model::*;
pub use registry::*;
