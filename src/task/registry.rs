//! Task registry
//!
//! The registry owns every declared task, keyed by name, in declaration order.
//! It is an explicit object: build one, register tasks into it, and hand it to
//! a [`Resolver`](crate::runner::Resolver) or
//! [`Dispatcher`](crate::runner::Dispatcher).

use crate::error::{RegistryError, RegistryResult};
use crate::task::{Action, Task, TaskArgs};
use std::collections::HashMap;

/// Table of declared tasks
#[derive(Debug, Default)]
pub struct Registry {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    default: Option<usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task
    ///
    /// Fails if the name is taken or if the task claims to be the default
    /// while another task already is. A failed registration leaves the
    /// registry unchanged.
    pub fn register(&mut self, task: Task) -> RegistryResult<()> {
        if self.index.contains_key(&task.name) {
            return Err(RegistryError::DuplicateTask(task.name));
        }

        if task.is_default {
            if let Some(existing) = self.default_task() {
                return Err(RegistryError::MultipleDefaults {
                    existing: existing.name.clone(),
                    new: task.name,
                });
            }
        }

        let position = self.tasks.len();
        if task.is_default {
            self.default = Some(position);
        }
        self.index.insert(task.name.clone(), position);
        self.tasks.push(task);

        Ok(())
    }

    /// Start declaring a task
    pub fn task(&mut self, name: impl Into<String>) -> TaskBuilder<'_> {
        TaskBuilder {
            registry: self,
            name: name.into(),
            dependencies: Vec::new(),
            is_default: false,
            description: None,
            ignored: false,
            params: None,
        }
    }

    /// Look up a task by name
    pub fn lookup(&self, name: &str) -> RegistryResult<&Task> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownTask(name.to_string()))
    }

    /// Look up a task by name, if present
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    /// All tasks in declaration order
    pub fn list_all(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// The task marked as default, if any
    pub fn default_task(&self) -> Option<&Task> {
        self.default.map(|i| &self.tasks[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Builder that declares a task and registers it on [`TaskBuilder::action`]
pub struct TaskBuilder<'r> {
    registry: &'r mut Registry,
    name: String,
    dependencies: Vec<String>,
    is_default: bool,
    description: Option<String>,
    ignored: bool,
    params: Option<Vec<String>>,
}

impl<'r> TaskBuilder<'r> {
    /// Add dependencies, run in the given order
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    /// Mark as the default task
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Skip this task's action when it is reached
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Restrict the named arguments the task accepts
    pub fn params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Attach a closure as the action and register the task
    pub fn action<F>(self, action: F) -> RegistryResult<()>
    where
        F: Fn(&TaskArgs) -> anyhow::Result<()> + 'static,
    {
        self.with_action(action)
    }

    /// Attach any [`Action`] and register the task
    pub fn with_action(self, action: impl Action + 'static) -> RegistryResult<()> {
        let mut task = Task::with_action(self.name, action);
        task.dependencies = self.dependencies;
        task.is_default = self.is_default;
        task.description = self.description;
        task.ignored = self.ignored;
        task.params = self.params;
        self.registry.register(task)
    }
}
