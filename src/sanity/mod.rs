//! Sanity checks run against a rock image without any cluster.
pub mod kubectl;
pub mod velero;
pub mod vsphere;

use crate::command::{
    ensure_image_contains_paths, CommandError, CommandRunner, ExecTarget, ImageRunner,
};
use crate::image::ImageReference;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SanityError {
    #[error("`{check}`: expected {stream} to contain `{expected}`, got:\n{actual}")]
    OutputMismatch {
        check: String,
        stream: Stream,
        expected: String,
        actual: String,
    },

    #[error("invalid version `{version}`: {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error(transparent)]
    Command(#[from] CommandError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Display for Stream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Substring expected in one of the output streams.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub stream: Stream,
    pub contains: String,
}

impl Expectation {
    pub fn stdout(contains: impl Into<String>) -> Self {
        Self {
            stream: Stream::Stdout,
            contains: contains.into(),
        }
    }

    pub fn stderr(contains: impl Into<String>) -> Self {
        Self {
            stream: Stream::Stderr,
            contains: contains.into(),
        }
    }
}

/// A command run in the image and what its output must contain.
#[derive(Debug, Clone, PartialEq)]
pub struct RockCheck {
    pub description: String,
    pub argv: Vec<String>,
    /// When false the command is expected to exit with an error, e.g. binaries that need a
    /// cluster, and only its output is checked.
    pub expect_success: bool,
    pub expectations: Vec<Expectation>,
}

impl RockCheck {
    pub fn new(argv: &[&str], expect_success: bool) -> Self {
        Self {
            description: argv.join(" "),
            argv: argv.iter().map(|arg| arg.to_string()).collect(),
            expect_success,
            expectations: Vec::new(),
        }
    }

    pub fn expecting(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SanitySuite {
    pub image: ImageReference,
    pub required_paths: Vec<String>,
    pub checks: Vec<RockCheck>,
}

/// Checks the required paths first, then runs every check in order, stopping at the first
/// failure.
pub async fn run_suite<R>(
    runner: &CommandRunner<R>,
    suite: &SanitySuite,
) -> Result<(), SanityError>
where
    R: ImageRunner + Send + Sync,
{
    info!(image = %suite.image, checks = suite.checks.len(), "running sanity suite");
    if !suite.required_paths.is_empty() {
        ensure_image_contains_paths(
            runner.images(),
            &suite.image.to_string(),
            &suite.required_paths,
        )
        .await?;
    }

    let target = ExecTarget::Image(suite.image.clone());
    for check in &suite.checks {
        let result = runner
            .run_in_command(&target, &check.argv, check.expect_success)
            .await?;

        for expectation in &check.expectations {
            let actual = match expectation.stream {
                Stream::Stdout => &result.stdout,
                Stream::Stderr => &result.stderr,
            };
            if !actual.contains(&expectation.contains) {
                return Err(SanityError::OutputMismatch {
                    check: check.description.clone(),
                    stream: expectation.stream,
                    expected: expectation.contains.clone(),
                    actual: actual.clone(),
                });
            }
        }
        info!(image = %suite.image, check = %check.description, "check passed");
    }
    Ok(())
}
