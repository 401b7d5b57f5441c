//! Running commands and capturing their output: on the host, inside a one-shot container
//! created from an image, or inside a deployed pod.
pub mod docker;
pub mod error;
pub mod process;
pub mod runner;

use std::fmt::{Display, Formatter};

pub use docker::DockerRunner;
pub use error::CommandError;
pub use runner::{ensure_image_contains_paths, CommandRunner, ExecTarget, ImageRunner};

/// Captured outcome of a command. It is returned whatever the exit code was, so callers can
/// assert on the output of commands that are expected to fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turns a non zero exit into [CommandError::UnexpectedExit] when success was expected.
    pub fn check(self, expect_success: bool) -> Result<Self, CommandError> {
        if expect_success && !self.success() {
            return Err(CommandError::UnexpectedExit {
                command: self.command,
                exit_code: self.exit_code,
                stdout: self.stdout,
                stderr: self.stderr,
            });
        }
        Ok(self)
    }
}

impl Display for CommandResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "command\n{}\nexit code: {}\nStdout: {}\nStderr: {}",
            self.command, self.exit_code, self.stdout, self.stderr
        )
    }
}

/// Renders an argument vector as a POSIX shell command line that can be pasted as is.
pub fn command_line<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .map(|arg| shell_quote(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Single quotes `arg` unless it only holds characters no shell interprets.
fn shell_quote(arg: &str) -> String {
    let plain = |c: char| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c);
    if !arg.is_empty() && arg.chars().all(plain) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn failed() -> CommandResult {
        CommandResult {
            command: "/velero version".to_string(),
            stdout: String::new(),
            stderr: "error finding Kubernetes API server config in --kubeconfig".to_string(),
            exit_code: 1,
        }
    }

    #[test]
    fn unexpected_exit_keeps_the_output() {
        let err = failed().check(true).unwrap_err();
        assert_matches!(
            err,
            CommandError::UnexpectedExit { exit_code: 1, stderr, .. } => {
                assert!(stderr.contains("error finding Kubernetes API server config"));
            }
        );
    }

    #[test]
    fn failures_are_returned_when_not_expecting_success() {
        let result = failed().check(false).unwrap();
        assert!(!result.success());
        assert_eq!(result, failed());
    }

    #[test]
    fn shell_like_command_line() {
        assert_eq!(
            command_line(&["velero", "backup", "create", "a b", "", "it's"]),
            r"velero backup create 'a b' '' 'it'\''s'"
        );
        assert_eq!(
            command_line(&["--set", "configuration.backupStorageLocation[0].provider=aws"]),
            "--set 'configuration.backupStorageLocation[0].provider=aws'"
        );
    }

    #[test]
    fn command_line_is_parsed_back_by_the_shell() {
        let argv = [
            "helm",
            "--set",
            "credentials.secretContents.cloud=\n[default]\naws_access_key_id = minio\n",
            "--set",
            "configuration.backupStorageLocation[0].config.s3Url=http://minio.velero.svc:9000",
            "--set",
            r"podAnnotations.note=a\,b 'quoted' $HOME *",
            "",
        ]
        .map(str::to_string);

        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("printf '%s\\0' {}", command_line(&argv)))
            .output()
            .unwrap();

        let parsed: Vec<String> = String::from_utf8(output.stdout)
            .unwrap()
            .split_terminator('\0')
            .map(str::to_string)
            .collect();
        assert_eq!(parsed, argv);
    }
}
