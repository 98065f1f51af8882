// Bounded execution of external commands (systemctl, nvidia-smi)

use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program} not found")]
    NotFound { program: String },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Runs `program args..` and captures its output. The child is killed if the timeout fires.
/// A non-zero exit status is not an error here; callers inspect `Output::status`.
pub async fn run_command(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<Output, CommandError> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Err(_) => Err(CommandError::Timeout {
            program: program.into(),
            timeout,
        }),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(CommandError::NotFound {
            program: program.into(),
        }),
        Ok(Err(e)) => Err(CommandError::Io {
            program: program.into(),
            source: e,
        }),
        Ok(Ok(output)) => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let err = run_command("homewatch-no-such-tool", &[], Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
    }
}
