use super::error::ConfigError;
use crate::image::ImageReference;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::debug;

const ROCK_ENV_PREFIX: &str = "ROCK";

/// A rock image resolved for a given component, software version and architecture.
#[derive(Debug, Clone, PartialEq)]
pub struct RockImage {
    pub name: String,
    pub version: Option<String>,
    pub arch: String,
    pub image: ImageReference,
}

impl Display for RockImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {} ({}): {}", self.name, version, self.arch, self.image),
            None => write!(f, "{} ({}): {}", self.name, self.arch, self.image),
        }
    }
}

/// Name of the variable holding the image of a rock, e.g. `ROCK_VELERO_1_13_2` or
/// `ROCK_VELERO_PLUGIN_FOR_VSPHERE` when no version applies.
pub fn rock_env_var(component: &str, version: Option<&str>) -> String {
    let mut parts = vec![ROCK_ENV_PREFIX.to_string(), component.to_string()];
    parts.extend(version.map(str::to_string));
    parts
        .join("_")
        .chars()
        .map(|c| match c {
            '-' | '.' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Resolves the rock image from the process environment.
pub fn resolve_rock(
    component: &str,
    version: Option<&str>,
    arch: &str,
) -> Result<RockImage, ConfigError> {
    resolve_rock_with(|var| std::env::var(var).ok(), component, version, arch)
}

/// Resolves the rock image using `lookup` to read variables. An unset or blank variable is a
/// configuration error, never a reason to skip.
pub fn resolve_rock_with<F>(
    lookup: F,
    component: &str,
    version: Option<&str>,
    arch: &str,
) -> Result<RockImage, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if component.is_empty() {
        return Err(ConfigError::EmptyField("component".to_string()));
    }
    let var = rock_env_var(component, version);
    let value = lookup(&var)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(var.clone()))?;

    let image = ImageReference::from_str(&value)
        .map_err(|source| ConfigError::InvalidImage { var: var.clone(), source })?;
    debug!(%var, %image, "resolved rock image");

    Ok(RockImage {
        name: component.to_string(),
        version: version.map(str::to_string),
        arch: arch.to_string(),
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    #[test]
    fn env_var_names() {
        assert_eq!(rock_env_var("velero", Some("1.13.2")), "ROCK_VELERO_1_13_2");
        assert_eq!(rock_env_var("kubectl", Some("1.30.2")), "ROCK_KUBECTL_1_30_2");
        assert_eq!(
            rock_env_var("velero-plugin-for-vsphere", None),
            "ROCK_VELERO_PLUGIN_FOR_VSPHERE"
        );
    }

    #[test]
    fn resolve_from_lookup() {
        let env = HashMap::from([(
            "ROCK_VELERO_1_13_2".to_string(),
            "ghcr.io/canonical/velero:1.13.2".to_string(),
        )]);

        let rock =
            resolve_rock_with(|var| env.get(var).cloned(), "velero", Some("1.13.2"), "amd64")
                .unwrap();

        assert_eq!(rock.name, "velero");
        assert_eq!(rock.version.as_deref(), Some("1.13.2"));
        assert_eq!(rock.image.repository(), "ghcr.io/canonical/velero");
        assert_eq!(rock.image.tag(), Some("1.13.2"));
    }

    #[test]
    fn missing_or_blank_variable_is_a_configuration_error() {
        let err = resolve_rock_with(|_| None, "velero", Some("1.12.1"), "amd64").unwrap_err();
        assert_matches!(err, ConfigError::MissingEnvVar(var) if var == "ROCK_VELERO_1_12_1");

        let err = resolve_rock_with(|_| Some(" ".to_string()), "kubectl", Some("1.30.2"), "amd64")
            .unwrap_err();
        assert_matches!(err, ConfigError::MissingEnvVar(_));
    }

    #[test]
    fn invalid_image_in_variable() {
        let err = resolve_rock_with(|_| Some("velero:".to_string()), "velero", None, "amd64")
            .unwrap_err();
        assert_matches!(err, ConfigError::InvalidImage { var, .. } if var == "ROCK_VELERO");
    }
}
