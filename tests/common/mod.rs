//! Common test utilities

#![allow(dead_code)]

use knit::runner::{Context, Dispatcher, Verbosity};
use knit::{Registry, TaskArgs};
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

/// Shared record of which tasks ran, in order
pub type Log = Rc<RefCell<Vec<String>>>;

/// Create a temporary directory with a knit.yml file
pub fn create_test_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("knit.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Register a task that appends its name to `log`
pub fn recording_task(registry: &mut Registry, log: &Log, name: &str, deps: &[&str]) {
    let log = Rc::clone(log);
    let label = name.to_string();
    registry
        .task(name)
        .depends_on(deps.iter().copied())
        .action(move |_: &TaskArgs| {
            log.borrow_mut().push(label.clone());
            Ok(())
        })
        .unwrap();
}

/// Dispatcher that prints nothing
pub fn silent_dispatcher(registry: &Registry) -> Dispatcher<'_> {
    Dispatcher::new(registry).with_context(Context::new().with_verbosity(Verbosity::Silent))
}

/// Whether `pid` names a live process; zombies count as gone
#[cfg(target_os = "linux")]
pub fn process_alive(pid: i32) -> bool {
    match fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => !stat
            .rsplit(')')
            .next()
            .unwrap_or("")
            .trim_start()
            .starts_with('Z'),
        Err(_) => false,
    }
}

/// Poll until `path` exists or `timeout` passes
pub fn wait_for_file(path: &std::path::Path, timeout: std::time::Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while !path.exists() {
        if std::time::Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    true
}
