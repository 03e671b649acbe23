//! `shell` backend.
//!
//! Commands run through the platform shell in the context's working
//! directory. The child is killed if the timeout fires or the invocation
//! future is dropped.

use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::{ToolFailure, ToolSuccess};
use crate::tools::parse_args;
use crate::types::Error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct Args {
    command: String,
    timeout: Option<i64>,
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

fn effective_timeout(requested: Option<i64>, ctx: &ToolContext) -> Result<Duration, Error> {
    let max = ctx.limits().max_shell_timeout;
    match requested {
        None => Ok(ctx.limits().shell_timeout.min(max)),
        Some(secs) if secs <= 0 => Err(Error::validation("timeout must be at least 1 second")),
        Some(secs) => {
            let wanted = Duration::from_secs(secs as u64);
            if wanted > max {
                Err(Error::validation(format!(
                    "timeout must be at most {} seconds",
                    max.as_secs()
                )))
            } else {
                Ok(wanted)
            }
        }
    }
}

/// `shell` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Shell;

#[async_trait]
impl ToolBackend for Shell {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let args: Args = parse_args(args)?;
        if args.command.trim().is_empty() {
            return Err(Error::validation("command must not be empty").into());
        }
        let timeout = effective_timeout(args.timeout, ctx)?;

        let child = shell_command(&args.command)
            .current_dir(ctx.work_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::internal(format!("failed to spawn shell: {}", e)))?;

        tracing::debug!(command = %args.command, timeout_secs = timeout.as_secs(), "running command");

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(Error::from)?,
            Err(_) => {
                return Err(Error::timeout(format!(
                    "Command killed by timeout ({}s)",
                    timeout.as_secs()
                ))
                .into())
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let combined = format!("{}{}", stdout, stderr);
        let exit_code = output.status.code();

        if output.status.success() {
            Ok(ToolSuccess::new(combined)
                .with_message("Command executed successfully.")
                .with_data(json!({
                    "stdout": stdout,
                    "stderr": stderr,
                    "exit_code": exit_code,
                })))
        } else {
            let message = match exit_code {
                Some(code) => format!("Command failed with exit code: {}", code),
                None => "Command terminated by signal".to_string(),
            };
            tracing::debug!(command = %args.command, ?exit_code, "command failed");
            Err(ToolFailure::from(Error::command_failed(message)).with_output(combined))
        }
    }
}
