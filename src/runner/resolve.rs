//! Dependency resolution
//!
//! Turns a list of requested task names into an [`ExecutionPlan`]: every
//! reachable task exactly once, each after all of its dependencies.
//!
//! Resolution is a depth-first walk with three-colour marking. A task that is
//! still in progress when it is reached again closes a cycle; a finished task
//! is already in the plan and is not appended twice. Roots are expanded in
//! request order and dependencies in declaration order, so the first
//! depth-first encounter decides a task's position.

use crate::error::{ResolveError, ResolveResult};
use crate::task::{Registry, Task};
use std::collections::HashMap;

/// Ordered, deduplicated list of tasks to run
#[derive(Debug)]
pub struct ExecutionPlan<'r> {
    tasks: Vec<&'r Task>,
}

impl<'r> ExecutionPlan<'r> {
    /// Tasks in execution order
    pub fn tasks(&self) -> &[&'r Task] {
        &self.tasks
    }

    /// Task names in execution order
    pub fn names(&self) -> Vec<&'r str> {
        self.tasks.iter().map(|t| t.name.as_str()).collect()
    }

    /// Index of a task in the plan
    pub fn position(&self, name: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Finished,
}

/// Builds execution plans against a registry
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r Registry,
}

/// State of one resolution pass
struct Walk<'r> {
    marks: HashMap<&'r str, Mark>,
    path: Vec<&'r str>,
    plan: Vec<&'r Task>,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Resolver { registry }
    }

    /// Resolve the requested names into a plan
    ///
    /// Nothing is executed here; an unknown name or a cycle is reported
    /// before any task can run.
    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> ResolveResult<ExecutionPlan<'r>> {
        let mut walk = Walk {
            marks: HashMap::new(),
            path: Vec::new(),
            plan: Vec::new(),
        };

        for name in requested {
            self.visit(name.as_ref(), &mut walk)?;
        }

        Ok(ExecutionPlan { tasks: walk.plan })
    }

    /// Depth-first walk from one root, with an explicit stack of
    /// `(task, next dependency index)` frames
    fn visit(&self, root: &str, walk: &mut Walk<'r>) -> ResolveResult<()> {
        let mut stack: Vec<(&'r Task, usize)> = Vec::new();
        if let Some(task) = self.enter(root, walk)? {
            stack.push((task, 0));
        }

        while let Some(frame) = stack.last_mut() {
            let (task, index) = *frame;
            frame.1 += 1;

            match task.dependencies.get(index) {
                Some(dependency) => {
                    if let Some(next) = self.enter(dependency, walk)? {
                        stack.push((next, 0));
                    }
                }
                None => {
                    stack.pop();
                    walk.path.pop();
                    walk.marks.insert(task.name.as_str(), Mark::Finished);
                    walk.plan.push(task);
                }
            }
        }

        Ok(())
    }

    /// Mark a task in progress; `None` when it is already in the plan
    fn enter(&self, name: &str, walk: &mut Walk<'r>) -> ResolveResult<Option<&'r Task>> {
        let task = self
            .registry
            .get(name)
            .ok_or_else(|| ResolveError::UnknownTask(name.to_string()))?;
        let name = task.name.as_str();

        match walk.marks.get(name) {
            Some(Mark::Finished) => return Ok(None),
            Some(Mark::InProgress) => {
                let start = walk.path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> =
                    walk.path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(ResolveError::CircularDependency(cycle));
            }
            None => {}
        }

        walk.marks.insert(name, Mark::InProgress);
        walk.path.push(name);
        Ok(Some(task))
    }
}
