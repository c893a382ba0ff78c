use crate::services::recognizers::OcrError;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs external programs with a hard timeout.
#[derive(Clone)]
pub struct CommandExecutor {
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `program` with `args`, writing `stdin` to the child when given.
    ///
    /// The child is killed if the timeout elapses first.
    pub async fn execute(
        &self,
        program: &str,
        args: &[&str],
        stdin: Option<&[u8]>,
    ) -> Result<Output, OcrError> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %program,
            args = ?args,
            stdin_bytes = stdin.map_or(0, |b| b.len()),
            timeout_secs = %self.timeout.as_secs(),
            "Executing command"
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| OcrError::Engine(format!("Failed to start {}: {}", program, e)))?;

        let run = async {
            if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
                // A child may exit before reading all of stdin; its status
                // and stderr are still collected below.
                match pipe.write_all(input).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                        tracing::debug!(program = %program, "Child closed stdin early");
                    }
                    Err(e) => return Err(e),
                }
                // Close stdin so the child sees EOF.
                drop(pipe);
            }
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| {
                OcrError::Engine(format!(
                    "{} timed out after {} seconds",
                    program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| OcrError::Engine(format!("Failed to run {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(
                program = %program,
                args = ?args,
                status = %output.status,
                stderr = %stderr,
                "Command failed"
            );
            return Err(OcrError::Engine(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(
            program = %program,
            output_size = output.stdout.len(),
            "Command succeeded"
        );

        Ok(output)
    }
}
