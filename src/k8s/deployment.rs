use super::error::K8sError;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::DeploymentStatus;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info};

/// Names a Deployment. The harness only observes it, it never creates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeploymentHandle {
    pub name: String,
    pub namespace: String,
}

impl DeploymentHandle {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl Display for DeploymentHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Replica counters reported by the Deployment status subresource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeploymentStatusSnapshot {
    pub replicas: i32,
    pub available_replicas: i32,
    pub ready_replicas: i32,
    pub updated_replicas: i32,
}

impl DeploymentStatusSnapshot {
    pub fn is_available(&self) -> bool {
        self.replicas > 0 && self.available_replicas == self.replicas
    }
}

impl From<DeploymentStatus> for DeploymentStatusSnapshot {
    fn from(status: DeploymentStatus) -> Self {
        Self {
            replicas: status.replicas.unwrap_or_default(),
            available_replicas: status.available_replicas.unwrap_or_default(),
            ready_replicas: status.ready_replicas.unwrap_or_default(),
            updated_replicas: status.updated_replicas.unwrap_or_default(),
        }
    }
}

impl Display for DeploymentStatusSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} available (ready: {}, updated: {})",
            self.available_replicas, self.replicas, self.ready_replicas, self.updated_replicas
        )
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeploymentStatusReader {
    /// Returns the current status of the deployment or `None` if it does not exist.
    async fn deployment_status(
        &self,
        deployment: &DeploymentHandle,
    ) -> Result<Option<DeploymentStatusSnapshot>, K8sError>;
}

/// Polls Deployments until all their replicas are available.
pub struct DeploymentWaiter<R> {
    reader: R,
    interval: Duration,
}

impl<R> DeploymentWaiter<R>
where
    R: DeploymentStatusReader + Send + Sync,
{
    pub fn new(reader: R, interval: Duration) -> Self {
        Self { reader, interval }
    }

    /// Waits until `status.availableReplicas == status.replicas` with at least one replica.
    ///
    /// The deployment must exist when called, and keep existing while waiting. Nothing is
    /// modified in the cluster, so it is safe to call it again on a ready deployment.
    pub async fn wait_for_deployment(
        &self,
        deployment: &DeploymentHandle,
        timeout: Duration,
    ) -> Result<(), K8sError> {
        info!(%deployment, ?timeout, "waiting for deployment to be available");
        let started = Instant::now();
        let deadline = started + timeout;
        let mut last_status = DeploymentStatusSnapshot::default();

        loop {
            // a read hanging on the API server must not outlive the deadline
            let status = timeout_at(deadline, self.reader.deployment_status(deployment))
                .await
                .map_err(|_| K8sError::Timeout {
                    deployment: deployment.clone(),
                    timeout,
                    last_status,
                })??
                .ok_or_else(|| K8sError::DeploymentNotFound(deployment.clone()))?;
            last_status = status;

            if status.is_available() {
                info!(%deployment, %status, "deployment is available");
                return Ok(());
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                return Err(K8sError::Timeout {
                    deployment: deployment.clone(),
                    timeout,
                    last_status: status,
                });
            }

            debug!(%deployment, %status, "deployment not available yet");
            sleep(self.interval.min(timeout - elapsed)).await;
        }
    }
}
