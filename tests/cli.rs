use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const VELERO_IMAGE: &str = "ghcr.io/canonical/velero:1.13.2-ck0";
const KUBECTL_IMAGE: &str = "ghcr.io/canonical/kubectl:1.30.2-ck0";

fn harness() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("rock-test-harness")?;
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn render_velero_install_with_indexed_locations() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = harness()?;
    cmd.env("ROCK_VELERO_1_13_2", VELERO_IMAGE)
        .env("ROCK_KUBECTL_1_30_2", KUBECTL_IMAGE)
        .args(["render", "velero-install"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            "helm install velero velero --namespace velero --create-namespace",
        ))
        .stdout(predicate::str::contains("--set image.repository=ghcr.io/canonical/velero"))
        .stdout(predicate::str::contains("--set kubectl.image.tag=1.30.2-ck0"))
        .stdout(predicate::str::contains(
            "configuration.backupStorageLocation[0].provider=aws",
        ));

    Ok(())
}

#[test]
fn render_velero_install_for_legacy_chart() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "helm: [k8s, helm]")?;

    let mut cmd = harness()?;
    cmd.env("ROCK_VELERO_1_13_2", VELERO_IMAGE)
        .env("ROCK_KUBECTL_1_30_2", KUBECTL_IMAGE)
        .arg("--config")
        .arg(file.path())
        .args(["render", "velero-install", "--chart-version", "3.9.9"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("k8s helm install velero velero"))
        .stdout(predicate::str::contains("--version 3.9.9"))
        .stdout(predicate::str::contains("--set configuration.provider=aws"))
        .stdout(predicate::str::contains("backupStorageLocation[0]").not());

    Ok(())
}

#[test]
fn missing_rock_variable_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = harness()?;
    cmd.env_remove("ROCK_VELERO_1_13_2")
        .env("ROCK_KUBECTL_1_30_2", KUBECTL_IMAGE)
        .args(["render", "velero-install"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "environment variable `ROCK_VELERO_1_13_2` is not set",
        ));

    Ok(())
}

#[test]
fn missing_config_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = harness()?;
    cmd.args(["--config", "/non/existing/harness.yaml", "render", "velero-install"]);
    cmd.assert().failure().code(1);

    Ok(())
}

#[test]
fn help_lists_subcommands() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = harness()?;
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("sanity"))
        .stdout(predicate::str::contains("integration"))
        .stdout(predicate::str::contains("render"));

    Ok(())
}
