//! Knit - a small dependency-ordered build task runner
//!
//! Tasks are declared into an explicit [`Registry`], each with a name, the
//! tasks it depends on and an action. The [`Dispatcher`] resolves requested
//! names into an execution plan, runs every task at most once with its
//! dependencies first, and stops at the first failure.
//!
//! # Example
//!
//! ```rust,no_run
//! use knit::{Dispatcher, Registry, TaskRequest};
//!
//! fn main() -> knit::Result<()> {
//!     let mut registry = Registry::new();
//!     registry.task("clean").action(|_| Ok(()))?;
//!     registry.task("build").depends_on(["clean"]).as_default().action(|_| Ok(()))?;
//!
//!     Dispatcher::new(&registry).run(&[TaskRequest::new("build")])?;
//!     Ok(())
//! }
//! ```
//!
//! Tasks can also be declared in a `knit.yml` file and run with the `knit`
//! binary; see [`config`].

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod system;
pub mod task;
pub mod ui;

// Re-export commonly used types
pub use error::{KnitError, Result};
pub use runner::{Dispatcher, ExecutionPlan, Resolver, RunSummary, TaskRequest};
pub use task::{Action, Registry, Task, TaskArgs};

/// Current version of Knit
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
