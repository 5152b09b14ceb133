use crate::domain::model::{ProcessCommand, ProcessOutput};
use crate::domain::ports::ProcessRunner;
use crate::utils::error::{KioskError, Result};
use async_trait::async_trait;
use std::process::Stdio;

/// Spawns children through `tokio::process`, so awaiting them never blocks the runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput> {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // 只改變子行程的工作目錄，伺服器本身的 cwd 不受影響
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|e| KioskError::ProcessSpawn {
            program: command.display_program(),
            source: e,
        })?;

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        tracing::debug!(
            "{} exited with {:?}",
            command.display_program(),
            result.exit_code
        );
        Ok(result)
    }
}
