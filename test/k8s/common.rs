use rock_test_harness::config::HarnessConfig;
use std::path::{Path, PathBuf};

/// Config file used by the cluster tests, defaults are used when unset.
const CONFIG_ENV_VAR: &str = "ROCK_TEST_HARNESS_CONFIG";

/// Harness config with manifests resolved against the crate root, so tests do not depend on the
/// directory cargo runs them from.
pub fn harness_config() -> HarnessConfig {
    let path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let mut config = HarnessConfig::load(path.as_deref()).unwrap();
    if config.manifests_dir.is_relative() {
        config.manifests_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(&config.manifests_dir);
    }
    config
}
