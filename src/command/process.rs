use super::{command_line, CommandError, CommandResult};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Executes `argv` on the host and captures its output. `input` is written to the process stdin.
///
/// The child is killed if the returned future is dropped before it finishes.
pub async fn run_process<S: AsRef<str>>(
    argv: &[S],
    input: Option<&[u8]>,
) -> Result<CommandResult, CommandError> {
    let (program, args) = argv.split_first().ok_or(CommandError::EmptyCommand)?;
    let command = command_line(argv);
    debug!(%command, "running command");

    let args: Vec<&str> = args.iter().map(|arg| arg.as_ref()).collect();

    let mut child = Command::new(program.as_ref())
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(input) = input {
        let mut stdin = child
            .stdin
            .take()
            .ok_or(CommandError::StreamPipeError("stdin".to_string()))?;
        stdin.write_all(input).await?;
        // closing stdin lets commands like `kubectl apply -f -` finish reading
        drop(stdin);
    }

    let output = child.wait_with_output().await?;
    let result = CommandResult {
        command,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        // terminated by a signal
        exit_code: output.status.code().map(i64::from).unwrap_or(-1),
    };
    debug!(command = %result.command, exit_code = result.exit_code, "command finished");

    Ok(result)
}
