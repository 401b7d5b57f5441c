use super::{run_suite, Expectation, RockCheck, SanityError, SanitySuite};
use crate::command::{CommandRunner, ImageRunner};
use crate::image::ImageReference;

pub const VSPHERE_PLUGIN_PATHS: &[&str] = &[
    "/backup-driver",
    "/data-manager-for-plugin",
    "/plugins/libvixDiskLib.so",
    "/plugins/velero-plugin-for-vsphere",
    "/scripts/install.sh",
];

pub fn vsphere_plugin_suite(image: &ImageReference) -> SanitySuite {
    SanitySuite {
        image: image.clone(),
        required_paths: VSPHERE_PLUGIN_PATHS.iter().map(|p| p.to_string()).collect(),
        checks: vec![
            RockCheck::new(&["/backup-driver", "--help"], true).expecting(Expectation::stdout(
                "Backup driver is a component in Velero vSphere plugin",
            )),
            RockCheck::new(&["/data-manager-for-plugin", "--help"], true).expecting(
                Expectation::stdout("Data manager is a component in Velero vSphere plugin"),
            ),
            RockCheck::new(&["/plugins/velero-plugin-for-vsphere"], false).expecting(
                Expectation::stderr(
                    "This binary is a plugin. These are not meant to be executed directly.",
                ),
            ),
            // the script exits early outside a cluster
            RockCheck::new(&["/scripts/install.sh"], false).expecting(Expectation::stdout(
                "No namespace specified in the namespace file",
            )),
        ],
    }
}

pub async fn check_vsphere_plugin_rock<R>(
    runner: &CommandRunner<R>,
    image: &ImageReference,
) -> Result<(), SanityError>
where
    R: ImageRunner + Send + Sync,
{
    run_suite(runner, &vsphere_plugin_suite(image)).await
}
