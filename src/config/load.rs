//! Registering task file definitions
//!
//! Each task file entry becomes a registry task whose action runs the entry's
//! steps through a shared [`Shell`].

use crate::config::types::{Config, Step};
use crate::error::KnitError;
use crate::runner::{interpolate, interpolate_list, task_vars};
use crate::system::{remove_paths, set_environment_variables, RemoveOptions, Shell};
use crate::task::{Action, Registry, Task, TaskArgs};
use glob::Pattern;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Action built from a task file entry
struct StepAction {
    steps: Vec<Step>,
    defaults: HashMap<String, String>,
    shell: Rc<Shell>,
}

impl Action for StepAction {
    fn call(&self, args: &TaskArgs) -> anyhow::Result<()> {
        let vars = task_vars(&self.defaults, args)?;

        for step in &self.steps {
            match step {
                Step::Command(command) => {
                    let command = interpolate(command, &vars)?;
                    self.shell.run_one(&command)?;
                }
                Step::Environment(env) => {
                    let mut assignments = Vec::with_capacity(env.set_environment.len());
                    for (key, value) in &env.set_environment {
                        assignments.push((key.clone(), interpolate(value, &vars)?));
                    }
                    set_environment_variables(assignments, self.shell.echo)?;
                }
                Step::Remove(remove) => {
                    let patterns = interpolate_list(&remove.remove, &vars)?;
                    // The directory is literal text; only the task's own pattern globs
                    let patterns = match &self.shell.working_dir {
                        Some(dir) => {
                            let base = Pattern::escape(&dir.display().to_string());
                            patterns
                                .iter()
                                .map(|p| Path::new(&base).join(p).display().to_string())
                                .collect()
                        }
                        None => patterns,
                    };
                    let options = RemoveOptions {
                        ignore_missing: remove.ignore_missing,
                        ignore_undeletable: remove.ignore_undeletable,
                        echo: self.shell.echo,
                    };
                    remove_paths(patterns, options)?;
                }
            }
        }

        Ok(())
    }
}

/// Register every task of a task file into a new registry
///
/// `config_path` anchors relative `dir` settings; `shell` carries the
/// interpreter and echo settings shared by all tasks.
pub fn build_registry(
    config: &Config,
    config_path: Option<&Path>,
    shell: Shell,
) -> Result<Registry, KnitError> {
    let base_dir = config_path
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty());
    let shell = match &config.interpreter {
        Some(interpreter) => shell.with_interpreter(interpreter.clone()),
        None => shell,
    };
    let shared = Rc::new(shell);

    let mut registry = Registry::new();

    for (name, def) in &config.tasks {
        let task_shell = match (&def.dir, base_dir) {
            (Some(dir), Some(base)) => Rc::new((*shared).clone().with_working_dir(base.join(dir))),
            (Some(dir), None) => Rc::new((*shared).clone().with_working_dir(dir.into())),
            (None, Some(base)) if shared.working_dir.is_none() => {
                Rc::new((*shared).clone().with_working_dir(base.to_path_buf()))
            }
            (None, _) => Rc::clone(&shared),
        };

        let action = StepAction {
            steps: def.run.clone(),
            defaults: def.vars.clone(),
            shell: task_shell,
        };

        let mut task = Task::with_action(name.clone(), action);
        task.dependencies = def.deps.clone();
        task.is_default = def.default;
        task.description = def.description.clone();
        task.ignored = def.ignore;
        task.params = def.params.clone();

        registry.register(task)?;
    }

    Ok(registry)
}
