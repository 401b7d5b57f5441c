use super::{CommandError, CommandResult};
use crate::image::ImageReference;
use crate::k8s::{DeploymentHandle, Kubectl};
use async_trait::async_trait;
use std::fmt::{Display, Formatter};
use tracing::{debug, info};

/// Operations over container images, implemented on top of a container engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageRunner {
    /// Runs `argv` in a fresh container created from `image`, using `argv[0]` as entrypoint.
    /// The container is removed afterwards whatever the outcome.
    async fn run_in_image(&self, image: &str, argv: &[String])
        -> Result<CommandResult, CommandError>;

    /// Version label of the image, if it declares one.
    async fn image_version(&self, image: &str) -> Result<Option<String>, CommandError>;

    /// Whether `path` exists in the image filesystem, without running the image.
    async fn path_exists(&self, image: &str, path: &str) -> Result<bool, CommandError>;
}

/// Fails with [CommandError::MissingPaths] listing every path absent from the image.
pub async fn ensure_image_contains_paths<R>(
    runner: &R,
    image: &str,
    paths: &[String],
) -> Result<(), CommandError>
where
    R: ImageRunner + Sync + ?Sized,
{
    let mut missing = Vec::new();
    for path in paths {
        if !runner.path_exists(image, path).await? {
            debug!(%image, %path, "path not found in image");
            missing.push(path.clone());
        }
    }
    if !missing.is_empty() {
        return Err(CommandError::MissingPaths {
            image: image.to_string(),
            missing,
        });
    }
    info!(%image, paths = paths.len(), "image contains all expected paths");
    Ok(())
}

/// Where a command is executed.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecTarget {
    /// One-shot container created from the image.
    Image(ImageReference),
    /// A pod of an already deployed Deployment.
    Deployment(DeploymentHandle),
}

impl Display for ExecTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image(image) => write!(f, "image {image}"),
            Self::Deployment(deployment) => write!(f, "deployment {deployment}"),
        }
    }
}

pub struct CommandRunner<I> {
    images: I,
    kubectl: Kubectl,
}

impl<I> CommandRunner<I>
where
    I: ImageRunner + Send + Sync,
{
    pub fn new(images: I, kubectl: Kubectl) -> Self {
        Self { images, kubectl }
    }

    pub fn images(&self) -> &I {
        &self.images
    }

    pub fn kubectl(&self) -> &Kubectl {
        &self.kubectl
    }

    /// Runs `argv` in `target`. With `expect_success` a non zero exit is an error, otherwise the
    /// result is returned whatever the exit code.
    pub async fn run_in_command(
        &self,
        target: &ExecTarget,
        argv: &[String],
        expect_success: bool,
    ) -> Result<CommandResult, CommandError> {
        if argv.is_empty() {
            return Err(CommandError::EmptyCommand);
        }
        let result = match target {
            ExecTarget::Image(image) => {
                self.images
                    .run_in_image(&image.to_string(), argv)
                    .await?
            }
            ExecTarget::Deployment(deployment) => {
                self.kubectl.exec_in_deployment(deployment, argv).await?
            }
        };
        result.check(expect_success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use mockall::predicate::eq;
    use std::str::FromStr;

    const VELERO: &str = "ghcr.io/canonical/velero:1.13.2";

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    fn exited(code: i64) -> CommandResult {
        CommandResult {
            command: "/velero version".to_string(),
            stdout: String::new(),
            stderr: "error finding Kubernetes API server config in --kubeconfig".to_string(),
            exit_code: code,
        }
    }

    fn velero_target() -> ExecTarget {
        ExecTarget::Image(ImageReference::from_str(VELERO).unwrap())
    }

    #[tokio::test]
    async fn non_zero_exit_is_returned_when_failure_is_expected() {
        let mut images = MockImageRunner::new();
        images
            .expect_run_in_image()
            .with(eq(VELERO), eq(argv(&["/velero", "version"])))
            .once()
            .returning(|_, _| Ok(exited(1)));
        let runner = CommandRunner::new(images, Kubectl::default());

        let result = runner
            .run_in_command(&velero_target(), &argv(&["/velero", "version"]), false)
            .await
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(result.stderr.contains("error finding Kubernetes API server config"));
    }

    #[tokio::test]
    async fn non_zero_exit_fails_when_success_is_expected() {
        let mut images = MockImageRunner::new();
        images
            .expect_run_in_image()
            .once()
            .returning(|_, _| Ok(exited(1)));
        let runner = CommandRunner::new(images, Kubectl::default());

        let err = runner
            .run_in_command(&velero_target(), &argv(&["/velero", "version"]), true)
            .await
            .unwrap_err();

        assert_matches!(
            err,
            CommandError::UnexpectedExit { exit_code: 1, stderr, .. } => {
                assert!(stderr.contains("--kubeconfig"));
            }
        );
    }

    #[tokio::test]
    async fn empty_argv_is_rejected() {
        let runner = CommandRunner::new(MockImageRunner::new(), Kubectl::default());

        assert_matches!(
            runner.run_in_command(&velero_target(), &[], false).await,
            Err(CommandError::EmptyCommand)
        );
    }

    #[tokio::test]
    async fn deployment_target_runs_through_kubectl() {
        // `false` ignores its arguments and exits with 1
        let runner = CommandRunner::new(
            MockImageRunner::new(),
            Kubectl::new(vec!["false".to_string()]),
        );
        let target = ExecTarget::Deployment(DeploymentHandle::new("velero", "velero"));
        let backup = argv(&["/velero", "backup", "create", "nginx-backup"]);

        let result = runner.run_in_command(&target, &backup, false).await.unwrap();
        assert_eq!(result.exit_code, 1);

        assert_matches!(
            runner.run_in_command(&target, &backup, true).await,
            Err(CommandError::UnexpectedExit { exit_code: 1, command, .. }) => {
                assert!(command.ends_with("deployment.apps/velero -- /velero backup create nginx-backup"));
            }
        );
    }

    #[tokio::test]
    async fn every_missing_path_is_reported() {
        let mut images = MockImageRunner::new();
        images
            .expect_path_exists()
            .with(eq("vsphere"), eq("/backup-driver"))
            .once()
            .returning(|_, _| Ok(true));
        images
            .expect_path_exists()
            .with(eq("vsphere"), eq("/data-manager-for-plugin"))
            .once()
            .returning(|_, _| Ok(false));
        images
            .expect_path_exists()
            .with(eq("vsphere"), eq("/plugins/libvixDiskLib.so"))
            .once()
            .returning(|_, _| Ok(false));
        let paths = argv(&[
            "/backup-driver",
            "/data-manager-for-plugin",
            "/plugins/libvixDiskLib.so",
        ]);

        let err = ensure_image_contains_paths(&images, "vsphere", &paths)
            .await
            .unwrap_err();

        assert_matches!(
            err,
            CommandError::MissingPaths { image, missing } => {
                assert_eq!(image, "vsphere");
                assert_eq!(missing, argv(&["/data-manager-for-plugin", "/plugins/libvixDiskLib.so"]));
            }
        );
    }

    #[tokio::test]
    async fn present_paths_pass() {
        let mut images = MockImageRunner::new();
        images
            .expect_path_exists()
            .once()
            .returning(|_, _| Ok(true));

        ensure_image_contains_paths(&images, "vsphere", &argv(&["/scripts/install.sh"]))
            .await
            .unwrap();
    }

    #[test]
    fn target_display() {
        assert_eq!(velero_target().to_string(), format!("image {VELERO}"));
        assert_eq!(
            ExecTarget::Deployment(DeploymentHandle::new("velero", "velero")).to_string(),
            "deployment velero/velero"
        );
    }
}
