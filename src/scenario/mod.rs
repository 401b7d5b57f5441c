//! Integration scenarios as ordered lists of cluster steps.
pub mod velero;

use crate::cluster::ClusterOps;
use crate::command::ExecTarget;
use crate::error::HarnessError;
use crate::helm::HelmInstall;
use crate::k8s::DeploymentHandle;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub use velero::velero_backup_restore;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("scenario `{scenario}` failed in {phase} at `{step}`: {source}")]
    StepFailed {
        scenario: String,
        phase: Phase,
        step: String,
        #[source]
        source: Box<HarnessError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Action,
    Verification,
    Teardown,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let phase = match self {
            Self::Setup => "setup",
            Self::Action => "action",
            Self::Verification => "verification",
            Self::Teardown => "teardown",
        };
        f.write_str(phase)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    ApplyManifest {
        manifest: PathBuf,
    },
    WaitForDeployment {
        deployment: DeploymentHandle,
        /// `None` uses the configured timeout.
        timeout: Option<Duration>,
    },
    HelmInstall(HelmInstall),
    ExecInDeployment {
        deployment: DeploymentHandle,
        argv: Vec<String>,
        expect_success: bool,
    },
    DeleteNamespace {
        namespace: String,
        timeout: Duration,
    },
}

impl Step {
    pub async fn run<O>(&self, ops: &O) -> Result<(), HarnessError>
    where
        O: ClusterOps + Sync + ?Sized,
    {
        match self {
            Self::ApplyManifest { manifest } => ops.apply_manifest(manifest).await,
            Self::WaitForDeployment {
                deployment,
                timeout,
            } => ops.wait_for_deployment(deployment, *timeout).await,
            Self::HelmInstall(install) => ops.helm_install(install).await,
            Self::ExecInDeployment {
                deployment,
                argv,
                expect_success,
            } => {
                let target = ExecTarget::Deployment(deployment.clone());
                ops.run_in_command(&target, argv, *expect_success).await?;
                Ok(())
            }
            Self::DeleteNamespace { namespace, timeout } => {
                ops.delete_namespace(namespace, *timeout).await
            }
        }
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApplyManifest { manifest } => write!(f, "apply {}", manifest.display()),
            Self::WaitForDeployment { deployment, .. } => write!(f, "wait for {deployment}"),
            Self::HelmInstall(install) => write!(
                f,
                "helm install {} in {}",
                install.release(),
                install.namespace()
            ),
            Self::ExecInDeployment {
                deployment, argv, ..
            } => write!(f, "exec `{}` in {deployment}", argv.join(" ")),
            Self::DeleteNamespace { namespace, .. } => write!(f, "delete namespace {namespace}"),
        }
    }
}

/// Steps grouped by phase. Setup, action and verification stop at the first failure, teardown
/// always runs to completion afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scenario {
    pub name: String,
    pub setup: Vec<Step>,
    pub action: Vec<Step>,
    pub verification: Vec<Step>,
    pub teardown: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub async fn run<O>(&self, ops: &O) -> Result<(), ScenarioError>
    where
        O: ClusterOps + Sync + ?Sized,
    {
        info!(scenario = %self.name, "running scenario");
        let result = self.run_phases(ops).await;

        for step in &self.teardown {
            if let Err(err) = step.run(ops).await {
                warn!(scenario = %self.name, %step, %err, "teardown step failed");
            }
        }

        if result.is_ok() {
            info!(scenario = %self.name, "scenario passed");
        }
        result
    }

    async fn run_phases<O>(&self, ops: &O) -> Result<(), ScenarioError>
    where
        O: ClusterOps + Sync + ?Sized,
    {
        let phases = [
            (Phase::Setup, &self.setup),
            (Phase::Action, &self.action),
            (Phase::Verification, &self.verification),
        ];
        for (phase, steps) in phases {
            for step in steps {
                info!(scenario = %self.name, %phase, %step, "running step");
                step.run(ops)
                    .await
                    .map_err(|err| ScenarioError::StepFailed {
                        scenario: self.name.clone(),
                        phase,
                        step: step.to_string(),
                        source: Box::new(err),
                    })?;
            }
        }
        Ok(())
    }
}
