//! Cluster side effects used by the scenarios.
use crate::command::process::run_process;
use crate::command::{CommandResult, CommandRunner, DockerRunner, ExecTarget};
use crate::config::{ConfigError, HarnessConfig};
use crate::error::HarnessError;
use crate::helm::HelmInstall;
use crate::k8s::{DeploymentHandle, DeploymentWaiter, K8sClient, Kubectl};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterOps {
    async fn apply_manifest(&self, manifest: &Path) -> Result<(), HarnessError>;

    /// Waits for the deployment, `None` meaning the configured default timeout.
    async fn wait_for_deployment(
        &self,
        deployment: &DeploymentHandle,
        timeout: Option<Duration>,
    ) -> Result<(), HarnessError>;

    async fn helm_install(&self, install: &HelmInstall) -> Result<(), HarnessError>;

    /// Runs `argv` in `target`. A non zero exit is only an error with `expect_success`.
    async fn run_in_command(
        &self,
        target: &ExecTarget,
        argv: &[String],
        expect_success: bool,
    ) -> Result<CommandResult, HarnessError>;

    async fn delete_namespace(&self, namespace: &str, timeout: Duration)
        -> Result<(), HarnessError>;
}

/// [ClusterOps] backed by the kube API for reads and the `kubectl`/`helm` binaries for writes.
pub struct Cluster {
    commands: CommandRunner<DockerRunner>,
    helm: Vec<String>,
    waiter: DeploymentWaiter<K8sClient>,
    default_timeout: Duration,
}

impl Cluster {
    pub fn new(config: &HarnessConfig, client: K8sClient, images: DockerRunner) -> Self {
        Self {
            commands: CommandRunner::new(images, Kubectl::new(config.kubectl.clone())),
            helm: config.helm.clone(),
            waiter: DeploymentWaiter::new(client, config.deployment_wait.interval),
            default_timeout: config.deployment_wait.timeout,
        }
    }

    pub async fn try_new(config: &HarnessConfig) -> Result<Self, HarnessError> {
        Ok(Self::new(
            config,
            K8sClient::try_default().await?,
            DockerRunner::connect()?,
        ))
    }

    pub fn kubectl(&self) -> &Kubectl {
        self.commands.kubectl()
    }
}

#[async_trait]
impl ClusterOps for Cluster {
    async fn apply_manifest(&self, manifest: &Path) -> Result<(), HarnessError> {
        info!(manifest = %manifest.display(), "applying manifest");
        let content = read_manifest(manifest).await?;
        self.kubectl().apply_manifest(&content).await?;
        Ok(())
    }

    async fn wait_for_deployment(
        &self,
        deployment: &DeploymentHandle,
        timeout: Option<Duration>,
    ) -> Result<(), HarnessError> {
        self.waiter
            .wait_for_deployment(deployment, timeout.unwrap_or(self.default_timeout))
            .await?;
        Ok(())
    }

    async fn helm_install(&self, install: &HelmInstall) -> Result<(), HarnessError> {
        info!(
            release = install.release(),
            namespace = install.namespace(),
            chart_version = install.chart_version().unwrap_or("latest"),
            "installing helm chart"
        );
        let argv = install.argv(&self.helm)?;
        run_process(&argv, None).await?.check(true)?;
        Ok(())
    }

    async fn run_in_command(
        &self,
        target: &ExecTarget,
        argv: &[String],
        expect_success: bool,
    ) -> Result<CommandResult, HarnessError> {
        let result = self
            .commands
            .run_in_command(target, argv, expect_success)
            .await?;
        info!(%target, "{result}");
        Ok(result)
    }

    async fn delete_namespace(
        &self,
        namespace: &str,
        timeout: Duration,
    ) -> Result<(), HarnessError> {
        self.kubectl().delete_namespace(namespace, timeout).await?;
        Ok(())
    }
}

async fn read_manifest(manifest: &Path) -> Result<Vec<u8>, ConfigError> {
    Ok(tokio::fs::read(manifest).await?)
}
