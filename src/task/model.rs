//! Task entity types
//!
//! A [`Task`] is one declared unit of work: a name, the names it depends on,
//! and the action to call when it runs.

use std::collections::BTreeMap;
use std::fmt;

/// Something a task runs
///
/// Any `Fn(&TaskArgs) -> anyhow::Result<()>` closure is an action.
pub trait Action {
    fn call(&self, args: &TaskArgs) -> anyhow::Result<()>;
}

impl<F> Action for F
where
    F: Fn(&TaskArgs) -> anyhow::Result<()>,
{
    fn call(&self, args: &TaskArgs) -> anyhow::Result<()> {
        self(args)
    }
}

/// Arguments forwarded from the command line to a task action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskArgs {
    /// Bare values, in the order given
    pub positional: Vec<String>,

    /// `key=value` pairs
    pub named: BTreeMap<String, String>,
}

impl TaskArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional value
    pub fn with_positional(mut self, value: impl Into<String>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a named value
    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    /// Get a named value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.named.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Merge another set of arguments into this one; later keys win
    pub fn merge(&mut self, other: &TaskArgs) {
        self.positional.extend(other.positional.iter().cloned());
        for (key, value) in &other.named {
            self.named.insert(key.clone(), value.clone());
        }
    }
}

/// Per-run execution state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotRun,
    Running,
    Done,
}

/// A declared unit of work
pub struct Task {
    /// Unique task name
    pub name: String,

    /// Tasks that must run first, in order
    pub dependencies: Vec<String>,

    /// Whether this is the task run when none is requested
    pub is_default: bool,

    /// One-line help text
    pub description: Option<String>,

    /// Skip the action but still run dependencies
    pub ignored: bool,

    /// Accepted argument keys; `None` accepts anything
    pub params: Option<Vec<String>>,

    action: Box<dyn Action>,
}

impl Task {
    /// Create a task with no dependencies from a closure
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&TaskArgs) -> anyhow::Result<()> + 'static,
    {
        Self::with_action(name, action)
    }

    /// Create a task with no dependencies from any [`Action`]
    pub fn with_action(name: impl Into<String>, action: impl Action + 'static) -> Self {
        Task {
            name: name.into(),
            dependencies: Vec::new(),
            is_default: false,
            description: None,
            ignored: false,
            params: None,
            action: Box::new(action),
        }
    }

    /// Invoke the task's action
    pub fn call(&self, args: &TaskArgs) -> anyhow::Result<()> {
        self.action.call(args)
    }

    /// Whether this task accepts the named argument `key`
    pub fn accepts(&self, key: &str) -> bool {
        match &self.params {
            Some(params) => params.iter().any(|p| p == key),
            None => true,
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("is_default", &self.is_default)
            .field("description", &self.description)
            .field("ignored", &self.ignored)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
