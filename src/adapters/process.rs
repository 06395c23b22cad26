//! External process execution with a time limit.
//!
//! Every external tool (gmsh, SU2_CFD, the MPI launcher) goes through
//! [`ExternalCommand`]. Children are started in their own process group so a
//! timeout can take down MPI ranks along with the launcher.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Failure to get an exit status out of a child process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {}s", .limit.as_secs())]
    Timeout { program: String, limit: Duration },

    #[error("failed while waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Last non-empty line of stderr, falling back to stdout.
    pub fn last_diagnostic(&self) -> Option<&str> {
        last_line(&self.stderr).or_else(|| last_line(&self.stdout))
    }
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().map(str::trim).find(|l| !l.is_empty())
}

/// A command line plus its working directory and time limit.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
    transcript: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: Duration::from_secs(600),
            transcript: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = limit;
        self
    }

    /// Write stdout and stderr of the finished process to `path`.
    #[must_use]
    pub fn transcript(mut self, path: impl Into<PathBuf>) -> Self {
        self.transcript = Some(path.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Human-readable command line.
    pub fn describe(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion or until the time limit.
    pub async fn run(&self) -> Result<ProcessOutcome, ProcessError> {
        let program = self.program.display().to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        debug!(command = %self.describe(), cwd = ?self.current_dir, "spawning external process");

        let started = Instant::now();
        let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ProcessError::Wait {
                program: program.clone(),
                source,
            })?,
            Err(_) => {
                warn!(
                    command = %self.describe(),
                    limit_secs = self.timeout.as_secs(),
                    "external process timed out"
                );
                if let Some(pid) = pid {
                    terminate_group(pid);
                }
                return Err(ProcessError::Timeout {
                    program,
                    limit: self.timeout,
                });
            }
        };

        let outcome = ProcessOutcome {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed: started.elapsed(),
        };

        if let Some(path) = &self.transcript {
            let body = format!(
                "$ {}\n--- stdout ---\n{}\n--- stderr ---\n{}\n--- {} ---\n",
                self.describe(),
                outcome.stdout,
                outcome.stderr,
                outcome.status
            );
            if let Err(e) = tokio::fs::write(path, body).await {
                warn!(path = %path.display(), error = %e, "failed to write process transcript");
            }
        }

        debug!(
            command = %self.describe(),
            status = %outcome.status,
            elapsed_ms = outcome.elapsed.as_millis(),
            "external process finished"
        );

        Ok(outcome)
    }
}

/// Delete an output left by an earlier run. A missing file is fine.
pub async fn remove_stale(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Signal the whole process group started for a timed-out child.
#[cfg(unix)]
fn terminate_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(errno) = killpg(Pid::from_raw(raw), Signal::SIGTERM) {
        debug!(pid, error = %errno, "process group already gone");
    }
}

#[cfg(not(unix))]
fn terminate_group(_pid: u32) {}
