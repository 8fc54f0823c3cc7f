//! End-to-end tests for the knit binary

#![cfg(unix)]

mod common;

use assert_cmd::Command;
use common::create_test_config;
use predicates::prelude::*;
use std::fs;

const PIPELINE: &str = r#"
tasks:
  clean:
    description: Start from scratch
    run: echo clean >> order.txt
  build:
    deps: [clean]
    run: echo build >> order.txt
  test:
    deps: [build]
    run: echo test >> order.txt
  all:
    deps: [build, test]
    default: true
    run: echo all >> order.txt
"#;

fn knit() -> Command {
    Command::cargo_bin("knit").unwrap()
}

#[test]
fn test_runs_default_task() {
    let (dir, path) = create_test_config(PIPELINE);

    knit().arg("-f").arg(&path).assert().success();

    let order = fs::read_to_string(dir.path().join("order.txt")).unwrap();
    assert_eq!(order, "clean\nbuild\ntest\nall\n");
}

#[test]
fn test_echoes_commands() {
    let (_dir, path) = create_test_config(PIPELINE);

    knit()
        .arg("-f")
        .arg(&path)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains(">>> echo clean >> order.txt"));
}

#[test]
fn test_failing_task_exit_code_and_report() {
    let (dir, path) = create_test_config(
        r#"
tasks:
  clean:
    run: echo clean >> order.txt
  build:
    deps: [clean]
    run: echo build >> order.txt
  test:
    deps: [build]
    run: exit 3
  all:
    deps: [build, test]
    default: true
    run: echo all >> order.txt
"#,
    );

    knit()
        .arg("-f")
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Task 'test' failed"));

    let order = fs::read_to_string(dir.path().join("order.txt")).unwrap();
    assert_eq!(order, "clean\nbuild\n");
}

#[test]
fn test_key_value_arguments_reach_the_task() {
    let (dir, path) = create_test_config(
        r#"
tasks:
  greet:
    params: [name]
    run: echo "hello ${name}" > greeting.txt
"#,
    );

    knit()
        .arg("-f")
        .arg(&path)
        .args(["greet", "name=knit"])
        .assert()
        .success();

    let greeting = fs::read_to_string(dir.path().join("greeting.txt")).unwrap();
    assert_eq!(greeting.trim(), "hello knit");
}

#[test]
fn test_unknown_parameter_is_rejected() {
    let (dir, path) = create_test_config(
        r#"
tasks:
  greet:
    params: [name]
    run: touch ran.txt
"#,
    );

    knit()
        .arg("-f")
        .arg(&path)
        .args(["greet", "nmae=typo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not accept parameter 'nmae'"));

    assert!(!dir.path().join("ran.txt").exists());
}

#[test]
fn test_unknown_task() {
    let (dir, path) = create_test_config(PIPELINE);

    knit()
        .arg("-f")
        .arg(&path)
        .args(["clean", "deploy"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task 'deploy' is not defined"));

    assert!(!dir.path().join("order.txt").exists());
}

#[test]
fn test_no_default_task() {
    let (_dir, path) = create_test_config(
        r#"
tasks:
  build:
    run: "true"
"#,
    );

    knit()
        .arg("-f")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no default task"));
}

#[test]
fn test_cycle_is_reported() {
    let (_dir, path) = create_test_config(
        r#"
tasks:
  a:
    deps: [b]
  b:
    deps: [a]
"#,
    );

    knit()
        .arg("-f")
        .arg(&path)
        .arg("a")
        .assert()
        .failure()
        .stderr(predicate::str::contains("a -> b -> a"));
}

#[test]
fn test_list_mode() {
    let (dir, path) = create_test_config(PIPELINE);

    knit()
        .arg("-f")
        .arg(&path)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Start from scratch"))
        .stdout(predicate::str::contains("(default)"));

    assert!(!dir.path().join("order.txt").exists());
}

#[test]
fn test_dry_run_prints_plan() {
    let (dir, path) = create_test_config(PIPELINE);

    knit()
        .arg("-f")
        .arg(&path)
        .args(["--dry-run", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. clean"))
        .stdout(predicate::str::contains("3. test"));

    assert!(!dir.path().join("order.txt").exists());
}

#[test]
fn test_discovers_task_file_in_parent() {
    let (dir, _path) = create_test_config(PIPELINE);
    let sub_dir = dir.path().join("nested");
    fs::create_dir(&sub_dir).unwrap();

    knit().current_dir(&sub_dir).arg("clean").assert().success();

    assert!(dir.path().join("order.txt").exists());
}

#[test]
fn test_missing_task_file() {
    let dir = tempfile::TempDir::new().unwrap();

    knit()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to find task file"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_interrupt_stops_running_command_and_its_children() {
    use common::{process_alive, wait_for_file};
    use std::process::{Command as StdCommand, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};

    let (dir, path) = create_test_config(
        r#"
tasks:
  hang:
    run: trap "" INT; sleep 30 & echo $! > worker.pid; wait
"#,
    );
    let pid_file = dir.path().join("worker.pid");

    let mut knit = StdCommand::new(assert_cmd::cargo::cargo_bin("knit"))
        .arg("-q")
        .arg("-f")
        .arg(&path)
        .arg("hang")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    assert!(wait_for_file(&pid_file, Duration::from_secs(10)));
    thread::sleep(Duration::from_millis(100));
    let worker: i32 = fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();

    unsafe {
        libc::kill(knit.id() as libc::pid_t, libc::SIGINT);
    }

    let deadline = Instant::now() + Duration::from_secs(20);
    let status = loop {
        if let Some(status) = knit.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            let _ = knit.kill();
            panic!("knit did not stop after SIGINT");
        }
        thread::sleep(Duration::from_millis(20));
    };
    assert_eq!(status.code(), Some(130));

    let deadline = Instant::now() + Duration::from_secs(2);
    while process_alive(worker) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(!process_alive(worker));
}
