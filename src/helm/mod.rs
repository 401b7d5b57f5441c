//! Helm command construction.
//!
//! Commands are plain argument vectors: building them never touches a cluster, running them is
//! up to the caller (see [crate::cluster]).
pub mod command;
pub mod layout;
pub mod parse;
pub mod velero;

use thiserror::Error;

pub use command::{build_install_command, HelmImage, HelmInstall, HelmOverride};
pub use layout::{StorageLocationLayout, INDEXED_STORAGE_LOCATIONS_SINCE};
pub use parse::ParsedInstall;

#[derive(Error, Debug, PartialEq)]
pub enum HelmError {
    #[error("helm install requires a non empty `{0}`")]
    EmptyField(&'static str),

    #[error("invalid chart version `{version}`: {reason}")]
    InvalidChartVersion { version: String, reason: String },

    #[error("invalid `--set` override `{0}`, expected `key=value`")]
    InvalidOverride(String),

    #[error("invalid helm install command line: {0}")]
    InvalidCommand(String),
}
