use super::DeploymentHandle;
use crate::command::process::run_process;
use crate::command::{CommandError, CommandResult};
use std::time::Duration;
use tracing::info;

/// Wrapper over the `kubectl` invocation configured for the harness, e.g. `["microk8s", "kubectl"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kubectl {
    command: Vec<String>,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::new(vec!["kubectl".to_string()])
    }
}

impl Kubectl {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    fn argv<I, S>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command
            .iter()
            .cloned()
            .chain(args.into_iter().map(Into::into))
            .collect()
    }

    pub fn apply_argv(&self) -> Vec<String> {
        self.argv(["apply", "-f", "-"])
    }

    pub fn delete_namespace_argv(&self, namespace: &str, timeout: Duration) -> Vec<String> {
        self.argv([
            "delete".to_string(),
            "--wait".to_string(),
            "namespace".to_string(),
            namespace.to_string(),
            "--timeout".to_string(),
            format!("{}s", timeout.as_secs()),
        ])
    }

    pub fn exec_argv(&self, deployment: &DeploymentHandle, argv: &[String]) -> Vec<String> {
        self.argv(
            [
                "exec".to_string(),
                "--namespace".to_string(),
                deployment.namespace.clone(),
                format!("deployment.apps/{}", deployment.name),
                "--".to_string(),
            ]
            .into_iter()
            .chain(argv.iter().cloned()),
        )
    }

    /// Applies a manifest passed through stdin.
    pub async fn apply_manifest(&self, manifest: &[u8]) -> Result<CommandResult, CommandError> {
        run_process(&self.apply_argv(), Some(manifest))
            .await?
            .check(true)
    }

    /// Deletes the namespace and waits for it to be gone.
    pub async fn delete_namespace(
        &self,
        namespace: &str,
        timeout: Duration,
    ) -> Result<CommandResult, CommandError> {
        info!(%namespace, ?timeout, "deleting namespace");
        run_process(&self.delete_namespace_argv(namespace, timeout), None)
            .await?
            .check(true)
    }

    /// Runs `argv` in one pod of the deployment. The result is returned whatever the exit code.
    pub async fn exec_in_deployment(
        &self,
        deployment: &DeploymentHandle,
        argv: &[String],
    ) -> Result<CommandResult, CommandError> {
        run_process(&self.exec_argv(deployment, argv), None).await
    }
}
