//! Sanity and integration checks for the Velero, kubectl and vSphere plugin rocks.
pub mod cli;
pub mod cluster;
pub mod command;
pub mod config;
pub mod error;
pub mod helm;
pub mod image;
pub mod k8s;
pub mod logging;
pub mod sanity;
pub mod scenario;
