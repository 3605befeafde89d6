//! Build process execution with live output
//!
//! One child per run, started through the platform shell. Both pipes are
//! drained by their own task into a single channel; the caller's loop writes
//! each chunk to the sink as it arrives, then waits for the exit status once
//! both streams have closed.

use std::io::Write;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use console::style;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::error::CrossgoError;

const CHUNK_SIZE: usize = 8 * 1024;
const CHANNEL_DEPTH: usize = 64;

/// A shell command line plus environment for the child
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellCommand {
    /// Line handed to `sh -c` / `cmd /C`
    pub line: String,
    /// Variables added to the inherited environment
    pub envs: Vec<(String, String)>,
}

impl ShellCommand {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            envs: Vec::new(),
        }
    }

    pub fn with_envs(mut self, envs: Vec<(String, String)>) -> Self {
        self.envs = envs;
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.line);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.line);
            cmd
        };
        cmd.envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        // An early return from `run` must not leave the build running.
        cmd.kill_on_drop(true);
        cmd
    }
}

/// How the child finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code, `None` when the child was terminated by a signal
    pub code: Option<i32>,
    /// Terminating signal (Unix only)
    pub signal: Option<i32>,
}

impl RunOutcome {
    fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }

    /// Exit code this process should finish with
    pub fn exit_code(&self) -> i32 {
        match (self.code, self.signal) {
            (Some(code), _) => code,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }

    /// Print the completion line
    pub fn report<W: Write>(&self, sink: &mut W) -> std::io::Result<()> {
        match (self.code, self.signal) {
            (Some(0), _) => writeln!(sink, "{}", style("Done!").green().bold()),
            (Some(code), _) => writeln!(
                sink,
                "{} {}",
                style("Exited with exit code:").red().bold(),
                code
            ),
            (None, Some(signal)) => writeln!(
                sink,
                "{} {}",
                style("Terminated by signal:").red().bold(),
                signal
            ),
            (None, None) => writeln!(
                sink,
                "{}",
                style("Exited without an exit code").red().bold()
            ),
        }
    }
}

/// Forward one pipe into the channel until EOF or the receiver goes away
async fn pump<R>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        if tx.send(buf[..n].to_vec()).await.is_err() {
            return Ok(());
        }
    }
}

/// Run `command` to completion, writing its output to `sink` as it arrives.
///
/// No retries and no timeout: the child runs until it exits on its own or is
/// killed from outside.
pub async fn run<W: Write>(command: &ShellCommand, sink: &mut W) -> Result<RunOutcome> {
    let mut child = command
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CrossgoError::spawn_failure(&command.line, e))?;

    let stdout = child.stdout.take().context("Child stdout was not captured")?;
    let stderr = child.stderr.take().context("Child stderr was not captured")?;

    let (tx, mut rx) = mpsc::channel(CHANNEL_DEPTH);
    let stdout_task = tokio::spawn(pump(stdout, tx.clone()));
    let stderr_task = tokio::spawn(pump(stderr, tx));

    // Ends once both pumps have dropped their senders.
    while let Some(chunk) = rx.recv().await {
        sink.write_all(&chunk)
            .context("Failed to forward build output")?;
        sink.flush().context("Failed to forward build output")?;
    }

    for task in [stdout_task, stderr_task] {
        task.await
            .context("Output reader task panicked")?
            .context("Failed to read build output")?;
    }

    let status = child.wait().await.context("Failed to wait for build process")?;
    Ok(RunOutcome::from_status(status))
}
