//! Subprocess execution with a hard timeout, grounded on the teacher's
//! `csa-hooks::guard` pattern: spawn, poll `try_wait()` on a short interval,
//! and on timeout kill the whole process group on unix rather than leaving
//! an orphaned grandchild running.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::unix::process::CommandExt;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub stdout: String,
    pub exit_code: i32,
    pub timed_out: bool,
}

/// Abstraction over "run this assembled command", so the security-block
/// test scenario can assert that a blocked request never reaches a real
/// subprocess by injecting [`testing::NullCommandRunner`].
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        command: &str,
        timeout_secs: u64,
        cwd: &Path,
        env_overrides: &BTreeMap<String, String>,
    ) -> ExecOutcome;
}

pub struct SubprocessRunner;

#[cfg(unix)]
fn native_shell() -> (&'static str, &'static str) {
    ("sh", "-c")
}

#[cfg(windows)]
fn native_shell() -> (&'static str, &'static str) {
    ("cmd", "/C")
}

impl CommandRunner for SubprocessRunner {
    fn run(
        &self,
        command: &str,
        timeout_secs: u64,
        cwd: &Path,
        env_overrides: &BTreeMap<String, String>,
    ) -> ExecOutcome {
        let (shell, flag) = native_shell();
        let mut cmd = Command::new(shell);
        cmd.arg(flag)
            .arg(command)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in env_overrides {
            cmd.env(key, value);
        }
        #[cfg(unix)]
        {
            // Run in its own process group so a timeout can kill the whole
            // tree, not just the immediate shell child.
            cmd.process_group(0);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return ExecOutcome {
                    stdout: format!("failed to spawn command: {err}"),
                    exit_code: -1,
                    timed_out: false,
                };
            }
        };

        let deadline = Instant::now() + Duration::from_secs(timeout_secs);
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) => {
                    if Instant::now() >= deadline {
                        break None;
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(_) => break None,
            }
        };

        match status {
            Some(status) => {
                let output = child.wait_with_output().unwrap_or_else(|_| {
                    std::process::Output {
                        status,
                        stdout: Vec::new(),
                        stderr: Vec::new(),
                    }
                });
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.is_empty() {
                    if !combined.is_empty() {
                        combined.push('\n');
                    }
                    combined.push_str(&stderr);
                }
                if combined.is_empty() {
                    combined = "(no output)".to_string();
                }
                ExecOutcome {
                    stdout: combined,
                    exit_code: status.code().unwrap_or(-1),
                    timed_out: false,
                }
            }
            None => {
                tracing::warn!(command, timeout_secs, "command exceeded timeout, killing process group");
                kill_process_group(&mut child);
                ExecOutcome {
                    stdout: String::new(),
                    exit_code: -1,
                    timed_out: true,
                }
            }
        }
    }
}

#[cfg(unix)]
fn kill_process_group(child: &mut std::process::Child) {
    let pid = child.id() as i32;
    // SAFETY: kill(2) with a negative pid targets the process group created
    // by `process_group(0)` above; this is a plain libc call with no
    // pointers, just a signal to our own child's group.
    unsafe {
        libc::kill(-pid, libc::SIGKILL);
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut std::process::Child) {
    let _ = child.kill();
    let _ = child.wait();
}

pub mod testing {
    use super::*;

    /// A [`CommandRunner`] that panics if invoked. Used to assert that a
    /// blocked gateway request never reaches a subprocess (spec §8
    /// scenario 3: "asserted via a null-execution injected adapter").
    pub struct NullCommandRunner;

    impl CommandRunner for NullCommandRunner {
        fn run(
            &self,
            _command: &str,
            _timeout_secs: u64,
            _cwd: &Path,
            _env_overrides: &BTreeMap<String, String>,
        ) -> ExecOutcome {
            panic!("NullCommandRunner invoked: a blocked or invalid request reached execution");
        }
    }
}
