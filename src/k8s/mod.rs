pub mod client;
pub mod deployment;
pub mod error;
pub mod kubectl;

pub use client::K8sClient;
pub use deployment::{
    DeploymentHandle, DeploymentStatusReader, DeploymentStatusSnapshot, DeploymentWaiter,
};
pub use error::K8sError;
pub use kubectl::Kubectl;
