use std::{collections::VecDeque, process::Stdio};

use frontend_defs::{CommandSpec, FrontendError};
use log::{debug, warn};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::{Child, Command},
};

const STDERR_TAIL_LINES: usize = 50;

fn command_for(spec: &CommandSpec) -> Result<Command, FrontendError> {
    if !spec.cwd.is_dir() {
        return Err(FrontendError::MissingWorkingDirectory(
            spec.cwd.display().to_string(),
        ));
    }

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(&spec.cwd)
        .envs(&spec.env)
        .stdin(Stdio::null());
    Ok(command)
}

/// Runs a command to completion in its working directory with the configured
/// environment layered over the inherited one. Every stdout line is handed to
/// `on_stdout`; the tail of stderr is logged when the command fails.
pub async fn run_command(
    spec: &CommandSpec,
    mut on_stdout: impl FnMut(&str),
) -> Result<i32, FrontendError> {
    let display = spec.display();
    let mut command = command_for(spec)?;
    command.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("Running {} in {}", display, spec.cwd.display());
    let mut child = command.spawn().map_err(|source| FrontendError::CommandSpawn {
        command: display.clone(),
        source,
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("stdout of {} was not captured", display))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow::anyhow!("stderr of {} was not captured", display))?;

    // Lines are read as bytes so output that is not UTF-8 never stops the draining
    let mut stdout_reader = BufReader::new(stdout);
    let mut stderr_reader = BufReader::new(stderr);
    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();
    let mut stderr_tail = VecDeque::new();

    let mut stdout_done = false;
    let mut stderr_done = false;

    while !stdout_done || !stderr_done {
        tokio::select! {
            read = stdout_reader.read_until(b'\n', &mut stdout_buf), if !stdout_done => match read {
                Ok(0) => stdout_done = true,
                Ok(_) => on_stdout(&take_line(&mut stdout_buf)),
                Err(e) => {
                    warn!("Error reading stdout of {}: {}", display, e);
                    stdout_done = true;
                }
            },
            read = stderr_reader.read_until(b'\n', &mut stderr_buf), if !stderr_done => match read {
                Ok(0) => stderr_done = true,
                Ok(_) => {
                    let line = take_line(&mut stderr_buf);
                    debug!("{}", line);
                    stderr_tail.push_back(line);
                    if stderr_tail.len() > STDERR_TAIL_LINES {
                        stderr_tail.pop_front();
                    }
                }
                Err(e) => {
                    warn!("Error reading stderr of {}: {}", display, e);
                    stderr_done = true;
                }
            },
        }
    }

    let status = child.wait().await?;
    match status.code() {
        Some(0) => Ok(0),
        Some(code) => {
            if !stderr_tail.is_empty() {
                let tail = Vec::from(stderr_tail).join("\n");
                warn!("{} failed with stderr:\n{}", display, tail);
            }
            Err(FrontendError::CommandFailed {
                command: display,
                code,
            })
        }
        None => Err(FrontendError::CommandTerminated { command: display }),
    }
}

// Empties `buf` into one line without its terminator, replacing invalid UTF-8
fn take_line(buf: &mut Vec<u8>) -> String {
    let line = String::from_utf8_lossy(buf)
        .trim_end_matches(['\n', '\r'])
        .to_string();
    buf.clear();
    line
}

/// A long running command, such as a development server.
pub struct DevServer {
    command: String,
    child: Child,
}

impl DevServer {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Waits for the process to exit on its own.
    pub async fn wait(&mut self) -> Result<i32, FrontendError> {
        let status = self.child.wait().await?;
        match status.code() {
            Some(0) => Ok(0),
            Some(code) => Err(FrontendError::CommandFailed {
                command: self.command.clone(),
                code,
            }),
            None => Err(FrontendError::CommandTerminated {
                command: self.command.clone(),
            }),
        }
    }

    pub async fn stop(mut self) -> Result<(), FrontendError> {
        if self.child.id().is_some() {
            debug!("Stopping {}", self.command);
            self.child.kill().await?;
        }
        Ok(())
    }
}

/// Starts a command with inherited stdio and returns without waiting for it.
pub fn spawn_command(spec: &CommandSpec) -> Result<DevServer, FrontendError> {
    let display = spec.display();
    let mut command = command_for(spec)?;
    command
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    debug!("Starting {} in {}", display, spec.cwd.display());
    let child = command.spawn().map_err(|source| FrontendError::CommandSpawn {
        command: display.clone(),
        source,
    })?;

    Ok(DevServer {
        command: display,
        child,
    })
}
