//! Shell command execution
//!
//! Commands run through an interpreter (`sh -c` by default) with inherited
//! stdio, echoed with a `>>>` prefix before they start.

use crate::error::{SystemError, SystemResult, EXIT_INTERRUPTED};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{self, Child, Command as StdCommand, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Prefix printed before every echoed command
pub const COMMAND_PREFIX: &str = ">>>";

/// How long a cancelled command may take to exit before it is killed
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Shared flag asking running commands to stop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs shell commands
#[derive(Debug, Clone)]
pub struct Shell {
    /// Interpreter and its arguments, never empty
    interpreter: Vec<String>,

    /// Working directory for commands; the current one when unset
    pub working_dir: Option<PathBuf>,

    /// Echo each command before running it
    pub echo: bool,

    cancel: CancelToken,
    grace_period: Duration,
}

impl Shell {
    pub fn new() -> Self {
        Shell {
            interpreter: default_interpreter(),
            working_dir: None,
            echo: true,
            cancel: CancelToken::new(),
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Set the interpreter; an empty list keeps the default
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        if !interpreter.is_empty() {
            self.interpreter = interpreter;
        }
        self
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Interpreter and its arguments, e.g. `["sh", "-c"]`
    pub fn interpreter(&self) -> &[String] {
        &self.interpreter
    }

    /// Run each command in turn, terminating the process on failure
    ///
    /// The process exits with the failing command's own exit code, with 126
    /// when the command could not be started and 130 when it was
    /// interrupted. Use [`Shell::run`] to get the failure back instead.
    pub fn execute<I, S>(&self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Err(err) = self.run(commands) {
            println!("{}", err);
            let _ = io::stdout().flush();
            process::exit(err.exit_code());
        }
    }

    /// Run each command in turn, stopping at the first failure
    pub fn run<I, S>(&self, commands: I) -> SystemResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for command in commands {
            self.run_one(command.as_ref())?;
        }
        Ok(())
    }

    /// Run a single command
    pub fn run_one(&self, command: &str) -> SystemResult<()> {
        if self.echo {
            println!("{} {}", COMMAND_PREFIX, command);
            let _ = io::stdout().flush();
        }

        let mut cmd = StdCommand::new(&self.interpreter[0]);
        cmd.args(&self.interpreter[1..])
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        // Own process group, so cancellation reaches the command's children too
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        if self.cancel.is_cancelled() {
            return Err(SystemError::Interrupted(command.to_string()));
        }

        let child = cmd.spawn().map_err(|error| SystemError::CannotExecute {
            command: command.to_string(),
            error,
        })?;

        self.wait(child, command)
    }

    /// Wait for a child, honouring cancellation
    fn wait(&self, mut child: Child, command: &str) -> SystemResult<()> {
        loop {
            if let Some(status) = try_wait(&mut child, command)? {
                return check_status(status, command);
            }

            if self.cancel.is_cancelled() {
                return self.terminate(child, command);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Interrupt a cancelled child, give it the grace period to exit, then kill it
    fn terminate(&self, mut child: Child, command: &str) -> SystemResult<()> {
        interrupt(&child);
        let deadline = Instant::now() + self.grace_period;

        while Instant::now() < deadline {
            if try_wait(&mut child, command)?.is_some() {
                kill(&mut child);
                return Err(SystemError::Interrupted(command.to_string()));
            }
            thread::sleep(POLL_INTERVAL);
        }

        kill(&mut child);
        let _ = child.wait();
        Err(SystemError::Interrupted(command.to_string()))
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

fn default_interpreter() -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string()]
    } else {
        vec!["sh".to_string(), "-c".to_string()]
    }
}

/// Send SIGINT to the child's process group
#[cfg(unix)]
fn interrupt(child: &Child) {
    signal_group(child, libc::SIGINT);
}

#[cfg(not(unix))]
fn interrupt(_child: &Child) {}

/// Kill the child and whatever is left of its process group
#[cfg(unix)]
fn kill(child: &mut Child) {
    signal_group(child, libc::SIGKILL);
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill(child: &mut Child) {
    let _ = child.kill();
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: libc::c_int) {
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) has no memory effects; the child leads its own group
    unsafe {
        libc::kill(-pgid, signal);
    }
}

fn try_wait(child: &mut Child, command: &str) -> SystemResult<Option<ExitStatus>> {
    child.try_wait().map_err(|error| SystemError::CannotExecute {
        command: command.to_string(),
        error,
    })
}

/// Map a finished command's status to a result
fn check_status(status: ExitStatus, command: &str) -> SystemResult<()> {
    if status.success() {
        return Ok(());
    }

    let code = exit_code(status);
    if code == Some(EXIT_INTERRUPTED) {
        return Err(SystemError::Interrupted(command.to_string()));
    }

    Err(SystemError::CommandFailed {
        command: command.to_string(),
        code,
    })
}

/// Exit code of a status; signals map to `128 + signal` like a shell reports them
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(libc::SIGINT) => Some(EXIT_INTERRUPTED),
        Some(signal) => Some(128 + signal),
        None => status.code(),
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}
