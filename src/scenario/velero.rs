use super::{Scenario, Step};
use crate::config::{resolve_rock, ConfigError, HarnessConfig};
use crate::helm::velero::{ObjectStorage, VeleroChart, VELERO_NAMESPACE, VELERO_RELEASE};
use crate::helm::HelmError;
use crate::k8s::DeploymentHandle;
use std::time::Duration;
use ulid::Ulid;

/// Rocks deployed by the integration scenario.
pub const VELERO_ROCK_VERSION: &str = "1.13.2";
pub const KUBECTL_ROCK_VERSION: &str = "1.30.2";

pub const MINIO_MANIFEST: &str = "minio-deployment.yaml";
pub const NGINX_MANIFEST: &str = "nginx-deployment.yaml";
pub const NGINX_NAMESPACE: &str = "nginx-example";
const NGINX_DEPLOYMENT: &str = "nginx-deployment";
const NGINX_SELECTOR: &str = "app=nginx";
const MINIO_DEPLOYMENT: &str = "minio";
const VELERO_BINARY: &str = "/velero";
const NAMESPACE_DELETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Unique name for a backup, valid as a Kubernetes object name.
pub fn backup_name() -> String {
    format!("nginx-backup-{}", Ulid::new().to_string().to_lowercase())
}

/// Velero chart pinned to the Velero and kubectl rocks found in the environment, storing backups
/// in the Minio deployment of the scenario.
pub fn velero_rock_chart(
    config: &HarnessConfig,
    chart_version: Option<&str>,
) -> Result<VeleroChart, ConfigError> {
    let velero = resolve_rock("velero", Some(VELERO_ROCK_VERSION), &config.arch)?;
    let kubectl = resolve_rock("kubectl", Some(KUBECTL_ROCK_VERSION), &config.arch)?;

    let chart = VeleroChart::new(velero.image, ObjectStorage::minio(VELERO_NAMESPACE))
        .with_kubectl_image(kubectl.image);
    Ok(match chart_version {
        Some(version) => chart.with_chart_version(version),
        None => chart,
    })
}

/// Backs up the nginx example namespace with the rock under test, deletes it and restores it.
pub fn velero_backup_restore(
    config: &HarnessConfig,
    chart: &VeleroChart,
) -> Result<Scenario, HelmError> {
    velero_backup_restore_named(config, chart, &backup_name())
}

pub(crate) fn velero_backup_restore_named(
    config: &HarnessConfig,
    chart: &VeleroChart,
    backup: &str,
) -> Result<Scenario, HelmError> {
    let minio = DeploymentHandle::new(MINIO_DEPLOYMENT, VELERO_NAMESPACE);
    let velero = DeploymentHandle::new(VELERO_RELEASE, VELERO_NAMESPACE);
    let nginx = DeploymentHandle::new(NGINX_DEPLOYMENT, NGINX_NAMESPACE);
    let wait = |deployment: &DeploymentHandle| Step::WaitForDeployment {
        deployment: deployment.clone(),
        timeout: None,
    };
    let velero_exec = |args: &[&str]| Step::ExecInDeployment {
        deployment: velero.clone(),
        argv: std::iter::once(VELERO_BINARY)
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect(),
        expect_success: true,
    };

    Ok(Scenario {
        name: "velero_backup_restore".to_string(),
        setup: vec![
            Step::ApplyManifest {
                manifest: config.manifest(MINIO_MANIFEST),
            },
            wait(&minio),
            Step::HelmInstall(chart.install()?),
            wait(&velero),
            Step::ApplyManifest {
                manifest: config.manifest(NGINX_MANIFEST),
            },
            wait(&nginx),
        ],
        action: vec![
            velero_exec(&["backup", "create", backup, "--selector", NGINX_SELECTOR, "--wait"]),
            Step::DeleteNamespace {
                namespace: NGINX_NAMESPACE.to_string(),
                timeout: NAMESPACE_DELETION_TIMEOUT,
            },
            velero_exec(&["restore", "create", "--from-backup", backup, "--wait"]),
        ],
        verification: vec![wait(&nginx)],
        teardown: vec![
            Step::DeleteNamespace {
                namespace: NGINX_NAMESPACE.to_string(),
                timeout: NAMESPACE_DELETION_TIMEOUT,
            },
            Step::DeleteNamespace {
                namespace: VELERO_NAMESPACE.to_string(),
                timeout: config.deployment_wait.timeout,
            },
        ],
    })
}
