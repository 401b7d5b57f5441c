use crate::image::ImageReferenceError;
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable `{0}` is not set")]
    MissingEnvVar(String),

    #[error("`{var}` holds an invalid image reference: `{source}`")]
    InvalidImage {
        var: String,
        #[source]
        source: ImageReferenceError,
    },

    #[error("`{0}` must not be empty")]
    EmptyField(String),

    #[error("error loading config: `{0}`")]
    IOError(#[from] std::io::Error),

    #[error("error loading config: `{0}`")]
    SerdeYamlError(#[from] serde_yaml::Error),
}
