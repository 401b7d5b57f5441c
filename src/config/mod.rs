pub mod error;
pub mod harness;
pub mod rock;

pub use error::ConfigError;
pub use harness::{DeploymentWaitConfig, HarnessConfig};
pub use rock::{resolve_rock, rock_env_var, RockImage};
