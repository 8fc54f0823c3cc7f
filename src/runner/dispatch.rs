//! Plan execution
//!
//! The dispatcher resolves a request against a registry and runs the
//! resulting plan strictly in order, stopping at the first failure.

use crate::error::{KnitError, ResolveError, Result};
use crate::runner::{Context, ExecutionPlan, Resolver};
use crate::task::{Registry, RunState, TaskArgs};
use std::collections::HashMap;

/// One task requested on the command line, with its arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRequest {
    pub name: String,
    pub args: TaskArgs,
}

impl TaskRequest {
    pub fn new(name: impl Into<String>) -> Self {
        TaskRequest {
            name: name.into(),
            args: TaskArgs::default(),
        }
    }

    pub fn with_args(mut self, args: TaskArgs) -> Self {
        self.args = args;
        self
    }
}

/// What a successful run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks whose action ran, in order
    pub executed: Vec<String>,

    /// Tasks reached but skipped because they are marked ignored
    pub ignored: Vec<String>,
}

/// Runs requested tasks and their dependencies
pub struct Dispatcher<'r> {
    registry: &'r Registry,
    ctx: Context,
    states: HashMap<String, RunState>,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Dispatcher {
            registry,
            ctx: Context::new(),
            states: HashMap::new(),
        }
    }

    pub fn with_context(mut self, ctx: Context) -> Self {
        self.ctx = ctx;
        self
    }

    /// State of a task in the most recent run
    pub fn state(&self, name: &str) -> RunState {
        self.states.get(name).copied().unwrap_or_default()
    }

    /// Resolve a request without running anything
    pub fn plan(&self, requests: &[TaskRequest]) -> Result<ExecutionPlan<'r>> {
        let (plan, _) = self.prepare(requests)?;
        Ok(plan)
    }

    /// Resolve and run a request
    ///
    /// An empty request runs the default task. Arguments go to the tasks
    /// that were asked for by name; tasks pulled in as dependencies get
    /// none. The first failing action ends the run.
    pub fn run(&mut self, requests: &[TaskRequest]) -> Result<RunSummary> {
        self.states.clear();

        let (plan, args) = self.prepare(requests)?;
        self.ctx
            .print_debug(&format!("Execution plan: {}", plan.names().join(", ")));

        let no_args = TaskArgs::default();
        let mut summary = RunSummary::default();

        for task in plan.tasks() {
            if self.state(&task.name) == RunState::Done {
                continue;
            }

            if task.ignored {
                self.ctx.print_task_skip(&task.name, "marked as ignored");
                self.states.insert(task.name.clone(), RunState::Done);
                summary.ignored.push(task.name.clone());
                continue;
            }

            self.states.insert(task.name.clone(), RunState::Running);
            self.ctx.print_task_start(&task.name);

            let task_args = args.get(task.name.as_str()).unwrap_or(&no_args);
            task.call(task_args)
                .map_err(|source| KnitError::TaskExecution {
                    task: task.name.clone(),
                    source,
                })?;

            self.states.insert(task.name.clone(), RunState::Done);
            self.ctx.print_task_complete(&task.name);
            summary.executed.push(task.name.clone());
        }

        Ok(summary)
    }

    /// Substitute the default task, check arguments and resolve
    fn prepare(
        &self,
        requests: &[TaskRequest],
    ) -> Result<(ExecutionPlan<'r>, HashMap<&'r str, TaskArgs>)> {
        let mut args: HashMap<&'r str, TaskArgs> = HashMap::new();
        let mut names: Vec<&'r str> = Vec::new();

        if requests.is_empty() {
            let task = self
                .registry
                .default_task()
                .ok_or(ResolveError::NoDefaultTask)?;
            names.push(task.name.as_str());
        }

        for request in requests {
            let task = self
                .registry
                .get(&request.name)
                .ok_or_else(|| ResolveError::UnknownTask(request.name.clone()))?;

            if let Some(parameter) = request.args.named.keys().find(|k| !task.accepts(k)) {
                return Err(ResolveError::UnknownParameter {
                    task: task.name.clone(),
                    parameter: parameter.clone(),
                }
                .into());
            }

            args.entry(task.name.as_str())
                .or_default()
                .merge(&request.args);
            names.push(task.name.as_str());
        }

        let plan = Resolver::new(self.registry).resolve(&names)?;
        Ok((plan, args))
    }
}
