use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("`{command}` exited with code {exit_code}\nStdout: {stdout}\nStderr: {stderr}")]
    UnexpectedExit {
        command: String,
        exit_code: i64,
        stdout: String,
        stderr: String,
    },

    #[error("image `{image}` is missing expected paths: {}", .missing.join(", "))]
    MissingPaths { image: String, missing: Vec<String> },

    #[error("`{0}` not piped")]
    StreamPipeError(String),

    #[error("docker error: `{0}`")]
    DockerError(#[from] bollard::errors::Error),

    #[error("io error: `{0}`")]
    IOError(#[from] std::io::Error),
}
