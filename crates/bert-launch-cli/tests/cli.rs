//! Runs the `bert-launch` binary as a user would

use std::fs;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// `bert-launch` with a clean environment, run from `cwd`
fn bert_launch(cwd: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bert-launch"));
    cmd.current_dir(cwd.path());
    for key in [
        "BERT_LAUNCH_BASE_DIR",
        "BERT_LAUNCH_DEVICE",
        "BERT_LAUNCH_PYTHON",
        "BERT_LAUNCH_SCRIPT",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_invalid_mode_message_and_status() {
    let cwd = TempDir::new().unwrap();
    let output = bert_launch(&cwd)
        .args(["data-bin/dialogre", "bogus"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "Invalid mode bogus!!!\n");
    assert!(!cwd.path().join("workplace").exists());
}

#[test]
fn test_dry_run_prints_train_command() {
    let cwd = TempDir::new().unwrap();
    let output = bert_launch(&cwd)
        .args(["data-bin/dialogre", "train", "--dry-run"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("CUDA_VISIBLE_DEVICES=0 python run.py --do_train --do_eval"));
    assert!(stdout.contains("--save_data data-bin/dialogre"));
    assert!(stdout.contains("tee workplace/output/bert-base-512-seed-3-v2-baseline/run.log"));
    assert!(!cwd.path().join("workplace").exists());
}

#[cfg(unix)]
#[test]
fn test_child_exit_code_is_the_cli_status() {
    let cwd = TempDir::new().unwrap();
    let script = cwd.path().join("run.py");
    fs::write(&script, "echo evaluated\nexit 5\n").unwrap();

    let output = bert_launch(&cwd)
        .env("BERT_LAUNCH_PYTHON", "sh")
        .env("BERT_LAUNCH_SCRIPT", &script)
        .args(["d", "train"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(5));
    assert_eq!(output.stdout, b"evaluated\n");
    let log = cwd
        .path()
        .join("workplace/output/bert-base-512-seed-3-v2-baseline/run.log");
    assert_eq!(fs::read(log).unwrap(), b"evaluated\n");
}

#[cfg(unix)]
#[test]
fn test_progress_without_newline_reaches_stdout_promptly() {
    let cwd = TempDir::new().unwrap();
    let script = cwd.path().join("run.py");
    fs::write(&script, "printf 'Iteration 0: 50%%\\r' >&2\nsleep 3\necho done\n").unwrap();

    let started = Instant::now();
    let mut child = bert_launch(&cwd)
        .env("BERT_LAUNCH_PYTHON", "sh")
        .env("BERT_LAUNCH_SCRIPT", &script)
        .args(["d", "train"])
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    let mut stdout = child.stdout.take().unwrap();

    let mut first = Vec::new();
    let mut buf = [0u8; 64];
    while !first.contains(&b'\r') {
        let n = stdout.read(&mut buf).unwrap();
        assert!(n > 0, "stdout closed before progress line");
        first.extend_from_slice(&buf[..n]);
    }
    let elapsed = started.elapsed();

    let mut rest = Vec::new();
    stdout.read_to_end(&mut rest).unwrap();
    let status = child.wait().unwrap();

    assert_eq!(first, b"Iteration 0: 50%\r");
    assert!(elapsed < Duration::from_millis(2500), "first chunk after {elapsed:?}");
    assert_eq!(rest, b"done\n");
    assert!(status.success());
}
