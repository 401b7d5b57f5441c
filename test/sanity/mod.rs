use rock_test_harness::command::{CommandRunner, DockerRunner};
use rock_test_harness::config::resolve_rock;
use rock_test_harness::k8s::Kubectl;
use rock_test_harness::sanity::kubectl::check_kubectl_rock;
use rock_test_harness::sanity::velero::check_velero_rock;
use rock_test_harness::sanity::vsphere::check_vsphere_plugin_rock;
use rstest::rstest;

const ARCH: &str = "amd64";

#[rstest]
#[case::velero_1_13_2("1.13.2")]
#[case::velero_1_12_1("1.12.1")]
#[case::velero_1_9_5("1.9.5")]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "needs docker"]
async fn velero_rock(#[case] version: &str) -> Result<(), Box<dyn std::error::Error>> {
    let rock = resolve_rock("velero", Some(version), ARCH)?;
    let runner = CommandRunner::new(DockerRunner::connect()?, Kubectl::default());

    check_velero_rock(&runner, &rock.image, version).await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "needs docker"]
async fn kubectl_rock() -> Result<(), Box<dyn std::error::Error>> {
    let rock = resolve_rock("kubectl", Some("1.30.2"), ARCH)?;
    let runner = CommandRunner::new(DockerRunner::connect()?, Kubectl::default());

    check_kubectl_rock(&runner, &rock.image, "1.30.2").await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "needs docker"]
async fn velero_plugin_for_vsphere_rock() -> Result<(), Box<dyn std::error::Error>> {
    let rock = resolve_rock("velero-plugin-for-vsphere", None, ARCH)?;
    let runner = CommandRunner::new(DockerRunner::connect()?, Kubectl::default());

    check_vsphere_plugin_rock(&runner, &rock.image).await?;

    Ok(())
}
