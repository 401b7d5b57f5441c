use super::{run_suite, Expectation, RockCheck, SanityError, SanitySuite};
use crate::command::{CommandRunner, ImageRunner};
use crate::image::ImageReference;
use semver::Version;
use tracing::{debug, warn};

/// First Velero release shipping `/velero-helper`.
pub const VELERO_HELPER_SINCE: Version = Version::new(1, 10, 0);

/// Velero rock versions under test and the restic release bundled with each of them.
pub const VELERO_ROCKS: &[(&str, &str)] = &[
    ("1.13.2", "0.15.0"),
    ("1.12.1", "0.15.0"),
    ("1.9.5", "0.14.0"),
];

pub fn bundled_restic_version(velero_version: &str) -> Option<&'static str> {
    VELERO_ROCKS
        .iter()
        .find(|(velero, _)| *velero == velero_version)
        .map(|(_, restic)| *restic)
}

pub fn ships_velero_helper(velero_version: &str) -> Result<bool, SanityError> {
    let version = Version::parse(velero_version.trim().trim_start_matches('v')).map_err(|err| {
        SanityError::InvalidVersion {
            version: velero_version.to_string(),
            reason: err.to_string(),
        }
    })?;
    Ok(version >= VELERO_HELPER_SINCE)
}

pub fn velero_suite(
    image: &ImageReference,
    restic_version: &str,
    with_helper: bool,
) -> SanitySuite {
    let mut checks = vec![RockCheck::new(&["/velero", "version"], false).expecting(
        Expectation::stderr("error finding Kubernetes API server config in --kubeconfig"),
    )];
    if with_helper {
        checks.push(
            RockCheck::new(&["/velero-helper"], false).expecting(Expectation::stderr(
                "at least one argument must be provided, the working mode",
            )),
        );
    }
    checks.push(
        RockCheck::new(&["restic", "version"], true)
            .expecting(Expectation::stdout("restic"))
            .expecting(Expectation::stdout(restic_version)),
    );

    SanitySuite {
        image: image.clone(),
        required_paths: Vec::new(),
        checks,
    }
}

/// Runs the Velero suite. Whether the helper binary is expected depends on the version declared
/// by the image label, falling back to `velero_version` when the label is absent or not semver.
pub async fn check_velero_rock<R>(
    runner: &CommandRunner<R>,
    image: &ImageReference,
    velero_version: &str,
) -> Result<(), SanityError>
where
    R: ImageRunner + Send + Sync,
{
    let restic_version =
        bundled_restic_version(velero_version).ok_or_else(|| SanityError::InvalidVersion {
            version: velero_version.to_string(),
            reason: "no known bundled restic version".to_string(),
        })?;
    let with_helper = match runner.images().image_version(&image.to_string()).await? {
        Some(label) => match ships_velero_helper(&label) {
            Ok(with_helper) => with_helper,
            Err(err) => {
                warn!(%image, %err, "unusable version label, using the declared version");
                ships_velero_helper(velero_version)?
            }
        },
        None => ships_velero_helper(velero_version)?,
    };
    debug!(%image, velero_version, with_helper, "velero rock");

    run_suite(runner, &velero_suite(image, restic_version, with_helper)).await
}
