//! Core configuration types
//!
//! This module defines the data structures that represent a knit.yml task file.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Top-level task file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Application name (optional)
    #[serde(default)]
    pub name: Option<String>,

    /// Application usage description (optional)
    #[serde(default)]
    pub usage: Option<String>,

    /// Global interpreter to use for commands (e.g., ["sh", "-c"])
    #[serde(default)]
    pub interpreter: Option<Vec<String>>,

    /// Environment file loaded before any task runs, relative to the task file
    #[serde(default)]
    pub dotenv: Option<String>,

    /// Tasks in declaration order
    #[serde(default, deserialize_with = "deserialize_tasks")]
    pub tasks: Vec<(String, Task)>,
}

impl Config {
    /// Look up a task definition by name
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Task {
    /// One-line description for the task listing
    #[serde(default, alias = "usage")]
    pub description: Option<String>,

    /// Tasks that must run first
    #[serde(default, alias = "depends", deserialize_with = "string_or_list")]
    pub deps: Vec<String>,

    /// Run this task when none is named
    #[serde(default)]
    pub default: bool,

    /// Skip this task's steps but still run its dependencies
    #[serde(default)]
    pub ignore: bool,

    /// Accepted `key=value` argument names; anything goes when absent
    #[serde(default)]
    pub params: Option<Vec<String>>,

    /// Default values for arguments
    #[serde(default)]
    pub vars: HashMap<String, String>,

    /// Working directory for commands, relative to the task file
    #[serde(default)]
    pub dir: Option<String>,

    /// Steps to execute
    #[serde(default, deserialize_with = "deserialize_steps")]
    pub run: Vec<Step>,
}

/// One step of a task
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Shell command
    Command(String),

    /// Environment variables to set
    Environment(EnvironmentStep),

    /// Paths to delete
    Remove(RemoveStep),
}

/// Environment assignment step
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentStep {
    #[serde(rename = "set-environment")]
    pub set_environment: BTreeMap<String, String>,
}

/// Path removal step
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoveStep {
    /// Glob patterns to delete
    #[serde(deserialize_with = "string_or_list")]
    pub remove: Vec<String>,

    /// A pattern matching nothing is not an error
    #[serde(rename = "ignore-missing", default = "default_true")]
    pub ignore_missing: bool,

    /// Deletion failures are skipped
    #[serde(rename = "ignore-undeletable", default)]
    pub ignore_undeletable: bool,
}

fn default_true() -> bool {
    true
}

/// Deserialize the task mapping, keeping declaration order and rejecting
/// duplicate names
fn deserialize_tasks<'de, D>(deserializer: D) -> Result<Vec<(String, Task)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct TasksVisitor;

    impl<'de> Visitor<'de> for TasksVisitor {
        type Value = Vec<(String, Task)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a mapping of task names to task definitions")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut tasks: Vec<(String, Task)> = Vec::new();
            while let Some((name, task)) = map.next_entry::<String, Option<Task>>()? {
                if tasks.iter().any(|(n, _)| *n == name) {
                    return Err(serde::de::Error::custom(format!(
                        "task '{}' is defined more than once",
                        name
                    )));
                }
                tasks.push((name, task.unwrap_or_default()));
            }
            Ok(tasks)
        }
    }

    deserializer.deserialize_any(TasksVisitor)
}

/// Deserialize steps - can be a single string or list
fn deserialize_steps<'de, D>(deserializer: D) -> Result<Vec<Step>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StepOrList {
        Single(Step),
        List(Vec<Step>),
    }

    match Option::<StepOrList>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(StepOrList::Single(step)) => Ok(vec![step]),
        Some(StepOrList::List(steps)) => Ok(steps),
    }
}

/// Deserialize a single string or a list of strings
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        Single(String),
        List(Vec<String>),
    }

    match Option::<StringOrList>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(StringOrList::Single(s)) => Ok(vec![s]),
        Some(StringOrList::List(list)) => Ok(list),
    }
}
