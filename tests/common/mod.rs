//! Shared harness for CLI integration tests: runs the `artpath` binary and
//! keeps a per-case log under the cargo target tmpdir.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

pub struct CliResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CliResult {
    run_cli_case_with_env(case_name, args, &[])
}

pub fn run_cli_case_with_env(case_name: &str, args: &[&str], env: &[(&str, &str)]) -> CliResult {
    let mut command = Command::new(env!("CARGO_BIN_EXE_artpath"));
    command.args(args);
    command.env_remove("ARTPATH_MAX_SAFE_FILENAME_BYTES");
    command.env_remove("ARTPATH_OUTPUT_ROOT");
    command.env_remove("ARTPATH_LOG_PATH");
    command.env("NO_COLOR", "1");
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().expect("failed to spawn artpath");
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let log_path = write_case_log(case_name, args, &stdout, &stderr, &output.status);
    CliResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}

fn write_case_log(
    case_name: &str,
    args: &[&str],
    stdout: &str,
    stderr: &str,
    status: &ExitStatus,
) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("cli-cases");
    fs::create_dir_all(&dir).expect("create case log dir");
    let log_path = dir.join(format!("{case_name}.log"));
    let body = format!(
        "args: {args:?}\nstatus: {status}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n"
    );
    fs::write(&log_path, body).expect("write case log");
    log_path
}
