//! Task execution engine
//!
//! This module turns requested task names into an execution plan and runs
//! that plan in order.

pub mod context;
pub mod dispatch;
pub mod interpolate;
pub mod resolve;

// Re-export main types
pub use context::*;
pub use dispatch::*;
pub use interpolate::*;
pub use resolve::*;
