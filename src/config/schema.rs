//! Task file validation
//!
//! Structural checks that do not need the task graph. Duplicate names,
//! multiple defaults, unknown dependencies and cycles are reported by the
//! registry and the resolver.

use crate::config::types::{Config, Step, Task};
use crate::error::{ConfigError, ConfigResult};

/// Characters that would make a task name ambiguous on the command line
const RESERVED_NAME_CHARS: &[char] = &['=', '[', ']', ','];

/// Validate a complete task file
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name at least a program".to_string(),
            ));
        }
    }

    for (name, task) in &config.tasks {
        validate_task_name(name)?;
        validate_task(name, task)?;
    }

    Ok(())
}

/// Check that a name can be typed as a task invocation
pub fn validate_task_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::Invalid("task name cannot be empty".to_string()));
    }

    if name.starts_with('-') {
        return Err(ConfigError::Invalid(format!(
            "task name '{}' cannot start with '-'",
            name
        )));
    }

    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || RESERVED_NAME_CHARS.contains(c))
    {
        return Err(ConfigError::Invalid(format!(
            "task name '{}' cannot contain '{}'",
            name, c
        )));
    }

    Ok(())
}

/// Validate a single task
pub fn validate_task(name: &str, task: &Task) -> ConfigResult<()> {
    if let Some(params) = &task.params {
        for var in task.vars.keys() {
            if !params.contains(var) {
                return Err(ConfigError::Invalid(format!(
                    "task '{}' gives a default for '{}' which is not in its params",
                    name, var
                )));
            }
        }
    }

    for step in &task.run {
        validate_step(name, step)?;
    }

    Ok(())
}

fn validate_step(name: &str, step: &Step) -> ConfigResult<()> {
    let problem = match step {
        Step::Command(command) if command.trim().is_empty() => "empty command",
        Step::Environment(env) if env.set_environment.is_empty() => "empty set-environment",
        Step::Remove(remove) if remove.remove.is_empty() => "empty remove list",
        _ => return Ok(()),
    };

    Err(ConfigError::Invalid(format!("task '{}' has an {}", name, problem)))
}
