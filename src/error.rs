use crate::command::CommandError;
use crate::config::ConfigError;
use crate::helm::HelmError;
use crate::k8s::K8sError;
use crate::logging::LoggingError;
use crate::sanity::SanityError;
use crate::scenario::ScenarioError;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Failure categories surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid input: environment variables, config file, helm values.
    Configuration,
    /// The deployment to observe does not exist.
    NotFound,
    /// A wait did not reach the expected state in time.
    Timeout,
    /// A command that had to succeed exited with a non zero code.
    UnexpectedExit,
    /// Files expected in an image are absent.
    MissingPath,
    /// Command output does not contain what was expected.
    Assertion,
    /// Transport failures talking to the cluster, the container engine or the OS.
    Runtime,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Configuration => "configuration",
            Self::NotFound => "not found",
            Self::Timeout => "timeout",
            Self::UnexpectedExit => "unexpected exit",
            Self::MissingPath => "missing path",
            Self::Assertion => "assertion",
            Self::Runtime => "runtime",
        };
        f.write_str(kind)
    }
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Helm(#[from] HelmError),

    #[error(transparent)]
    K8s(#[from] K8sError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Sanity(#[from] SanityError),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error(transparent)]
    Logging(#[from] LoggingError),
}

impl HarnessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Helm(_) => ErrorKind::Configuration,
            Self::K8s(err) => match err {
                K8sError::DeploymentNotFound(_) => ErrorKind::NotFound,
                K8sError::Timeout { .. } => ErrorKind::Timeout,
                K8sError::UnableToSetupClientKubeconfig(_) => ErrorKind::Configuration,
                K8sError::Generic(_) => ErrorKind::Runtime,
            },
            Self::Command(err) => command_kind(err),
            Self::Sanity(err) => match err {
                SanityError::Command(err) => command_kind(err),
                SanityError::InvalidVersion { .. } => ErrorKind::Configuration,
                SanityError::OutputMismatch { .. } => ErrorKind::Assertion,
            },
            Self::Scenario(ScenarioError::StepFailed { source, .. }) => source.kind(),
            Self::Logging(_) => ErrorKind::Runtime,
        }
    }
}

fn command_kind(err: &CommandError) -> ErrorKind {
    match err {
        CommandError::UnexpectedExit { .. } => ErrorKind::UnexpectedExit,
        CommandError::MissingPaths { .. } => ErrorKind::MissingPath,
        CommandError::EmptyCommand => ErrorKind::Configuration,
        CommandError::StreamPipeError(_)
        | CommandError::DockerError(_)
        | CommandError::IOError(_) => ErrorKind::Runtime,
    }
}
