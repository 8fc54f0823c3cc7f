//! Error types for Knit

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Knit operations
pub type Result<T> = std::result::Result<T, KnitError>;

/// Exit code for a run that was interrupted from outside
pub const EXIT_INTERRUPTED: i32 = 130;

/// Exit code for a command that could not be started
pub const EXIT_CANNOT_EXECUTE: i32 = 126;

/// Exit code for every failure without a more specific code
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for Knit
#[derive(Error, Debug)]
pub enum KnitError {
    /// Task declaration errors
    #[error("Registration error: {0}")]
    Registry(#[from] RegistryError),

    /// Plan resolution errors
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// A task action failed while the plan was running
    #[error("Task '{task}' failed: {source:#}")]
    TaskExecution {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    /// Task file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed command line
    #[error("Invocation error: {0}")]
    Invocation(#[from] InvocationError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// Shell, environment and filesystem helper errors
    #[error(transparent)]
    System(#[from] SystemError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl KnitError {
    /// Process exit code for this error
    ///
    /// A task failure whose cause chain contains a [`SystemError`] exits with
    /// that error's code, so a failing shell command propagates its own status.
    pub fn exit_code(&self) -> i32 {
        match self {
            KnitError::System(err) => err.exit_code(),
            KnitError::TaskExecution { source, .. } => source
                .chain()
                .find_map(|cause| cause.downcast_ref::<SystemError>())
                .map(SystemError::exit_code)
                .unwrap_or(EXIT_FAILURE),
            _ => EXIT_FAILURE,
        }
    }

    /// Whether this error was caused by an external interruption
    pub fn is_interrupted(&self) -> bool {
        self.exit_code() == EXIT_INTERRUPTED
    }
}

/// Errors raised while declaring tasks
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Task '{0}' is already defined")]
    DuplicateTask(String),

    #[error("Task '{new}' cannot be the default task, '{existing}' already is")]
    MultipleDefaults { existing: String, new: String },

    #[error("Task '{0}' is not defined")]
    UnknownTask(String),
}

/// Errors raised while turning a request into an execution plan
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Task '{0}' is not defined")]
    UnknownTask(String),

    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),

    #[error("No task given and no default task is defined")]
    NoDefaultTask,

    #[error("Task '{task}' does not accept parameter '{parameter}'")]
    UnknownParameter { task: String, parameter: String },
}

/// Task file discovery and parsing errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find task file (searched: {0})")]
    NotFound(String),

    #[error("Invalid task file: {0}")]
    Invalid(String),

    #[error("Failed to load environment file '{path}': {error}")]
    DotEnv { path: PathBuf, error: String },
}

/// Command line token errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Argument '{0}' is not attached to any task")]
    DanglingArgument(String),

    #[error("Malformed task invocation '{0}'")]
    Malformed(String),
}

/// Variable interpolation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Errors from the shell, environment and filesystem helpers
#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Command '{command}' failed with exit code {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Command '{command}' could not be executed: {error}")]
    CannotExecute { command: String, error: io::Error },

    #[error("Command '{0}' was interrupted")]
    Interrupted(String),

    #[error("Invalid environment variable '{key}': {reason}")]
    InvalidEnvironment { key: String, reason: String },

    #[error("Invalid pattern '{pattern}': {error}")]
    Pattern { pattern: String, error: String },

    #[error("'{0}' No such file or directory exists")]
    NoMatch(String),

    #[error("Unable to delete '{path}': {error}")]
    Remove { path: PathBuf, error: io::Error },

    #[error("Unable to install interrupt handler: {0}")]
    InterruptHandler(ctrlc::Error),
}

impl SystemError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            SystemError::CommandFailed { code, .. } => code.unwrap_or(EXIT_FAILURE),
            SystemError::CannotExecute { .. } => EXIT_CANNOT_EXECUTE,
            SystemError::Interrupted(_) => EXIT_INTERRUPTED,
            _ => EXIT_FAILURE,
        }
    }
}

/// Specialized result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Specialized result type for resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;

/// Specialized result type for system helpers
pub type SystemResult<T> = std::result::Result<T, SystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_exit_code_propagates() {
        let err = KnitError::TaskExecution {
            task: "test".to_string(),
            source: anyhow::Error::new(SystemError::CommandFailed {
                command: "false".to_string(),
                code: Some(3),
            }),
        };
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_wrapped_system_error_is_found_in_chain() {
        let inner = anyhow::Error::new(SystemError::Interrupted("sleep 10".to_string()))
            .context("while building");
        let err = KnitError::TaskExecution {
            task: "build".to_string(),
            source: inner,
        };
        assert_eq!(err.exit_code(), EXIT_INTERRUPTED);
        assert!(err.is_interrupted());
    }

    #[test]
    fn test_opaque_failure_uses_generic_code() {
        let err = KnitError::TaskExecution {
            task: "lint".to_string(),
            source: anyhow::anyhow!("lint found problems"),
        };
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert_eq!(err.to_string(), "Task 'lint' failed: lint found problems");
    }

    #[test]
    fn test_resolution_errors_use_generic_code() {
        let err = KnitError::from(ResolveError::NoDefaultTask);
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_cycle_message_lists_members() {
        let err = ResolveError::CircularDependency(vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
        ]);
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
    }

    #[test]
    fn test_cannot_execute_code() {
        let err = SystemError::CannotExecute {
            command: "x".to_string(),
            error: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.exit_code(), EXIT_CANNOT_EXECUTE);
    }
}
