//! Main CLI application

use crate::cli::parse_invocation;
use crate::config::{
    build_registry, find_config_file, load_dotenv, parse_config_file, validate_config,
};
use crate::error::{KnitError, SystemError};
use crate::runner::{Context, Dispatcher, Verbosity};
use crate::system::{CancelToken, Shell};
use crate::task::Registry;
use crate::ui::{format_plan, format_task_list};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::OnceLock;

/// What the command line asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Resolve and run the requested tasks
    Run,
    /// List tasks without running anything
    List,
    /// Print the plan without running anything
    DryRun,
}

/// Parsed command line
#[derive(Debug, Clone)]
pub struct Options {
    pub file: Option<PathBuf>,
    pub mode: Mode,
    pub verbosity: Verbosity,
    pub tasks: Vec<String>,
}

/// CLI application
pub struct App {
    /// Registered tasks
    registry: Registry,
    /// Execution context
    ctx: Context,
}

impl App {
    /// Load the task file named by the options, or discover one
    ///
    /// Commands started by the loaded tasks stop when `cancel` is tripped.
    pub fn from_options(options: &Options, cancel: CancelToken) -> Result<Self, KnitError> {
        let config_path = match &options.file {
            Some(path) => path.clone(),
            None => find_config_file()?,
        };

        let config = parse_config_file(&config_path)?;
        validate_config(&config)?;
        load_dotenv(&config, &config_path)?;

        let ctx = Context::new().with_verbosity(options.verbosity);
        let shell = Shell::new()
            .with_echo(ctx.echo_commands())
            .with_cancel_token(cancel);
        let registry = build_registry(&config, Some(&config_path), shell)?;

        ctx.print_debug(&format!(
            "Loaded {} task(s) from {}",
            registry.len(),
            config_path.display()
        ));

        Ok(App { registry, ctx })
    }

    /// Create an app around an existing registry
    pub fn with_registry(registry: Registry, ctx: Context) -> Self {
        App { registry, ctx }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Carry out the requested mode
    pub fn run(&self, options: &Options) -> Result<(), KnitError> {
        if options.mode == Mode::List {
            print!("{}", format_task_list(&self.registry));
            return Ok(());
        }

        let requests = parse_invocation(&options.tasks)?;
        let mut dispatcher = Dispatcher::new(&self.registry).with_context(self.ctx.clone());

        if options.mode == Mode::DryRun {
            let plan = dispatcher.plan(&requests)?;
            print!("{}", format_plan(&plan));
            return Ok(());
        }

        let summary = dispatcher.run(&requests)?;
        self.ctx.print_debug(&format!(
            "Ran {} task(s), ignored {}",
            summary.executed.len(),
            summary.ignored.len()
        ));

        Ok(())
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("knit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A small dependency-ordered build task runner")
        .arg(
            Arg::new("tasks")
                .value_name("TASK")
                .help("Tasks to run, each optionally followed by key=value arguments")
                .num_args(0..),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to knit.yml task file"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List tasks and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Print the execution plan without running it")
                .action(ArgAction::SetTrue)
                .conflicts_with("list"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Turn clap matches into options
pub fn parse_options(matches: &ArgMatches) -> Options {
    let mode = if matches.get_flag("list") {
        Mode::List
    } else if matches.get_flag("dry-run") {
        Mode::DryRun
    } else {
        Mode::Run
    };

    Options {
        file: matches.get_one::<String>("file").map(PathBuf::from),
        mode,
        verbosity: get_verbosity(matches),
        tasks: matches
            .get_many::<String>("tasks")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    }
}

/// Run the CLI application with the given arguments
pub fn run_from<I, T>(args: I) -> Result<(), KnitError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);
    let options = parse_options(&matches);

    let app = App::from_options(&options, interrupt_token()?)?;
    let result = app.run(&options);

    if let Err(err) = &result {
        app.ctx.print_debug(&format!("Run failed: {:?}", err));
    }
    result
}

/// Token tripped by Ctrl-C
///
/// The handler is installed once per process; later calls reset and share
/// the same token.
fn interrupt_token() -> Result<CancelToken, KnitError> {
    static TOKEN: OnceLock<CancelToken> = OnceLock::new();

    if let Some(token) = TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancelToken::new();
    let handler = token.clone();
    ctrlc::set_handler(move || handler.cancel()).map_err(SystemError::InterruptHandler)?;
    Ok(TOKEN.get_or_init(|| token).clone())
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<(), KnitError> {
    run_from(std::env::args_os())
}
