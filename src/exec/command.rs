// src/exec/command.rs

//! Shell-command actions.
//!
//! External tools (compilers, test runners, ...) are opaque subprocesses:
//! exit code 0 is success, anything else fails the task with the captured
//! output attached.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::{Result, TaskwatchError};
use crate::exec::action::{ActionFuture, TaskAction, TaskContext};

/// Runs one or more shell commands in sequence, stopping at the first failure.
#[derive(Debug, Clone)]
pub struct ShellCommandAction {
    cmds: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ShellCommandAction {
    pub fn new(cmds: Vec<String>) -> Self {
        Self { cmds, cwd: None }
    }

    pub fn single(cmd: impl Into<String>) -> Self {
        Self::new(vec![cmd.into()])
    }

    /// Run the commands inside `dir` instead of the current directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn commands(&self) -> &[String] {
        &self.cmds
    }
}

impl TaskAction for ShellCommandAction {
    fn execute(&self, ctx: TaskContext) -> ActionFuture {
        let cmds = self.cmds.clone();
        let cwd = self.cwd.clone();

        Box::pin(async move {
            for cmd in &cmds {
                let output = run_shell_command(&ctx, cmd, cwd.as_ref()).await?;
                if !output.success {
                    return Err(TaskwatchError::TaskExecution {
                        task: ctx.task.clone(),
                        exit_code: output.exit_code,
                        output: output.failure_text(),
                    });
                }
            }
            Ok(())
        })
    }

    fn describe(&self) -> String {
        self.cmds.join(" && ")
    }
}

/// Captured result of one subprocess.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Text reported to the user on failure: stderr, or stdout when the tool
    /// wrote its diagnostics there.
    pub fn failure_text(&self) -> String {
        if self.stderr.trim().is_empty() {
            self.stdout.clone()
        } else {
            self.stderr.clone()
        }
    }
}

/// Spawn `cmd` through the platform shell and wait for it, capturing both
/// output streams.
///
/// The child is spawned with `kill_on_drop`, so aborting the surrounding Tokio
/// task (watch mode with `cancel`) also stops the process.
pub async fn run_shell_command(
    ctx: &TaskContext,
    cmd: &str,
    cwd: Option<&PathBuf>,
) -> Result<CommandOutput> {
    info!(
        task = %ctx.task,
        run_id = ctx.run_id,
        cmd = %cmd,
        "starting task process"
    );

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", ctx.task))?;

    let stdout_reader = child
        .stdout
        .take()
        .map(|out| tokio::spawn(collect_lines(out, ctx.task.clone(), "stdout")));
    let stderr_reader = child
        .stderr
        .take()
        .map(|err| tokio::spawn(collect_lines(err, ctx.task.clone(), "stderr")));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{}'", ctx.task))?;

    let stdout = match stdout_reader {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    };
    let stderr = match stderr_reader {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    };

    let exit_code = status.code().unwrap_or(-1);
    info!(
        task = %ctx.task,
        run_id = ctx.run_id,
        exit_code,
        success = status.success(),
        "task process exited"
    );

    Ok(CommandOutput {
        success: status.success(),
        exit_code,
        stdout,
        stderr,
    })
}

/// Drain a child stream line by line, echoing it at debug level.
///
/// Lines are decoded lossily and reading continues to EOF, so the child
/// never sees a closed pipe.
async fn collect_lines<R>(stream: R, task: String, label: &'static str) -> String
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf: Vec<u8> = Vec::new();
    let mut collected = String::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                debug!(task = %task, "{label}: {line}");
                collected.push_str(line);
                collected.push('\n');
            }
            Err(err) => {
                warn!(task = %task, "failed reading {label}: {err}");
                break;
            }
        }
    }

    collected
}
