use super::{run_suite, Expectation, RockCheck, SanityError, SanitySuite};
use crate::command::{CommandRunner, ImageRunner};
use crate::image::ImageReference;
use semver::Version;

/// kubectl rock versions under test.
pub const KUBECTL_ROCKS: &[&str] = &["1.30.2"];

/// `kubectl version` fails without a cluster but still prints the client version, of which only
/// the minor release is checked.
pub fn kubectl_suite(
    image: &ImageReference,
    kubectl_version: &str,
) -> Result<SanitySuite, SanityError> {
    let version = Version::parse(kubectl_version.trim().trim_start_matches('v')).map_err(|err| {
        SanityError::InvalidVersion {
            version: kubectl_version.to_string(),
            reason: err.to_string(),
        }
    })?;
    let client_version = format!("Client Version: v{}.{}", version.major, version.minor);

    Ok(SanitySuite {
        image: image.clone(),
        required_paths: Vec::new(),
        checks: vec![RockCheck::new(&["kubectl", "version"], false)
            .expecting(Expectation::stdout(client_version))],
    })
}

pub async fn check_kubectl_rock<R>(
    runner: &CommandRunner<R>,
    image: &ImageReference,
    kubectl_version: &str,
) -> Result<(), SanityError>
where
    R: ImageRunner + Send + Sync,
{
    run_suite(runner, &kubectl_suite(image, kubectl_version)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanity::Stream;
    use assert_matches::assert_matches;
    use std::str::FromStr;

    fn kubectl_image() -> ImageReference {
        ImageReference::from_str("kubectl:1.30.2").unwrap()
    }

    #[test]
    fn checks_the_client_minor_version() {
        let suite = kubectl_suite(&kubectl_image(), "1.30.2").unwrap();

        assert_eq!(suite.checks.len(), 1);
        let check = &suite.checks[0];
        assert_eq!(check.argv, vec!["kubectl", "version"]);
        assert!(!check.expect_success);
        assert_eq!(check.expectations[0].stream, Stream::Stdout);
        assert_eq!(check.expectations[0].contains, "Client Version: v1.30");
    }

    #[test]
    fn invalid_version() {
        assert_matches!(
            kubectl_suite(&kubectl_image(), "1.30"),
            Err(SanityError::InvalidVersion { .. })
        );
    }
}
