//! Terminal rendering for task listings and plans

use crate::runner::ExecutionPlan;
use crate::task::Registry;
use colored::Colorize;
use std::fmt::Write;

/// Render every registered task with its dependencies and default marker
pub fn format_task_list(registry: &Registry) -> String {
    let mut out = String::new();

    if registry.is_empty() {
        out.push_str("No tasks defined\n");
        return out;
    }

    let width = registry
        .list_all()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0);

    let _ = writeln!(out, "{}", "Tasks:".bold());
    for task in registry.list_all() {
        let padding = " ".repeat(width - task.name.chars().count());
        let _ = write!(out, "  {}{}", task.name.cyan(), padding);

        if let Some(description) = &task.description {
            let _ = write!(out, "  {}", description);
        }
        if !task.dependencies.is_empty() {
            let _ = write!(
                out,
                "  {}",
                format!("[{}]", task.dependencies.join(", ")).dimmed()
            );
        }
        if task.is_default {
            let _ = write!(out, "  {}", "(default)".green());
        }
        if task.ignored {
            let _ = write!(out, "  {}", "(ignored)".yellow());
        }
        out.push('\n');
    }

    out
}

/// Render an execution plan, one numbered task per line
pub fn format_plan(plan: &ExecutionPlan<'_>) -> String {
    let mut out = String::new();
    for (i, task) in plan.tasks().iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", i + 1, task.name);
    }
    out
}
