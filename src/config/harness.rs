use super::error::ConfigError;
use duration_str::deserialize_duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const DEFAULT_MANIFESTS_DIR: &str = "templates";
const DEFAULT_ARCH: &str = "amd64";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Everything a scenario or a sanity suite needs to know about its environment.
///
/// It is built once per test run and handed to the components that need it, so every test
/// declares where its binaries and manifests come from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Invocation used for kubectl, e.g. `[kubectl]` or `[k8s, kubectl]`.
    pub kubectl: Vec<String>,
    /// Invocation used for helm, e.g. `[helm]` or `[k8s, helm]`.
    pub helm: Vec<String>,
    /// Directory holding the manifests applied by the integration scenarios.
    pub manifests_dir: PathBuf,
    /// Architecture the rock images were built for.
    pub arch: String,
    pub deployment_wait: DeploymentWaitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeploymentWaitConfig {
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for DeploymentWaitConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            kubectl: vec!["kubectl".to_string()],
            helm: vec!["helm".to_string()],
            manifests_dir: PathBuf::from(DEFAULT_MANIFESTS_DIR),
            arch: DEFAULT_ARCH.to_string(),
            deployment_wait: DeploymentWaitConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads the config from the provided YAML file, or the defaults if there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading harness config");
                let file = std::fs::File::open(path)?;
                serde_yaml::from_reader(file)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn manifest(&self, file_name: &str) -> PathBuf {
        self.manifests_dir.join(file_name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.kubectl.is_empty() {
            return Err(ConfigError::EmptyField("kubectl".to_string()));
        }
        if self.helm.is_empty() {
            return Err(ConfigError::EmptyField("helm".to_string()));
        }
        if self.arch.is_empty() {
            return Err(ConfigError::EmptyField("arch".to_string()));
        }
        Ok(())
    }
}
