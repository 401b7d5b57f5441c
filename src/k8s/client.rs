use super::deployment::{DeploymentHandle, DeploymentStatusReader, DeploymentStatusSnapshot};
use super::error::K8sError;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::config::KubeConfigOptions;
use kube::{Api, Client, Config};
use tracing::debug;

/// Read-only access to the cluster objects the harness observes.
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    /// Constructs a new Kubernetes client.
    ///
    /// If loading from the inCluster config fail we fall back to kube-config
    /// This will respect the `$KUBECONFIG` envvar, but otherwise default to `~/.kube/config`.
    pub async fn try_default() -> Result<Self, K8sError> {
        debug!("trying inClusterConfig for k8s client");

        let config = match Config::incluster() {
            Ok(c) => c,
            Err(e) => {
                debug!("inClusterConfig {}, trying kubeconfig for k8s client", e);
                Config::from_kubeconfig(&KubeConfigOptions::default()).await?
            }
        };

        let client = Client::try_from(config)?;
        debug!("k8s client initialization succeeded");

        Ok(Self::new(client))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DeploymentStatusReader for K8sClient {
    async fn deployment_status(
        &self,
        deployment: &DeploymentHandle,
    ) -> Result<Option<DeploymentStatusSnapshot>, K8sError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), &deployment.namespace);
        let found = api.get_opt(&deployment.name).await?;

        Ok(found.map(|d| DeploymentStatusSnapshot::from(d.status.unwrap_or_default())))
    }
}
