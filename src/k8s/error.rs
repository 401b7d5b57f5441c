use super::deployment::{DeploymentHandle, DeploymentStatusSnapshot};
use kube::config::KubeconfigError;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum K8sError {
    #[error("the kube client returned an error: `{0}`")]
    Generic(#[from] kube::Error),

    #[error("it is not possible to read kubeconfig: `{0}`")]
    UnableToSetupClientKubeconfig(#[from] KubeconfigError),

    #[error("deployment `{0}` not found")]
    DeploymentNotFound(DeploymentHandle),

    #[error("deployment `{deployment}` not available after {timeout:?}, last observed status: {last_status}")]
    Timeout {
        deployment: DeploymentHandle,
        timeout: Duration,
        last_status: DeploymentStatusSnapshot,
    },
}
