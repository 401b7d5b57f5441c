use super::{ChartArgs, Command, IntegrationCommand, RenderCommand, SanityCommand};
use crate::cluster::Cluster;
use crate::command::{command_line, CommandRunner, DockerRunner};
use crate::config::{resolve_rock, HarnessConfig};
use crate::error::HarnessError;
use crate::k8s::Kubectl;
use crate::sanity::kubectl::check_kubectl_rock;
use crate::sanity::velero::check_velero_rock;
use crate::sanity::vsphere::check_vsphere_plugin_rock;
use crate::scenario::velero::{velero_backup_restore, velero_rock_chart};
use tracing::info;

impl Command {
    pub async fn run(&self, config: &HarnessConfig) -> Result<(), HarnessError> {
        match self {
            Self::Sanity(sanity) => sanity.run(config).await,
            Self::Integration(IntegrationCommand::Velero(args)) => {
                integration_velero(config, args).await
            }
            Self::Render(RenderCommand::VeleroInstall(args)) => {
                println!("{}", render_velero_install(config, args)?);
                Ok(())
            }
        }
    }
}

impl SanityCommand {
    async fn run(&self, config: &HarnessConfig) -> Result<(), HarnessError> {
        let (component, version) = match self {
            Self::Velero(args) => ("velero", Some(args.version.as_str())),
            Self::Kubectl(args) => ("kubectl", Some(args.version.as_str())),
            Self::VeleroPluginForVsphere => ("velero-plugin-for-vsphere", None),
        };
        let rock = resolve_rock(component, version, &config.arch)?;
        let image = &rock.image;
        info!(%rock, "running sanity checks");

        let runner = CommandRunner::new(
            DockerRunner::connect()?,
            Kubectl::new(config.kubectl.clone()),
        );
        match self {
            Self::Velero(args) => check_velero_rock(&runner, image, &args.version).await?,
            Self::Kubectl(args) => check_kubectl_rock(&runner, image, &args.version).await?,
            Self::VeleroPluginForVsphere => check_vsphere_plugin_rock(&runner, image).await?,
        }
        info!(%rock, "sanity checks passed");
        Ok(())
    }
}

/// The helm command line installing the Velero rock, shell quoted.
pub fn render_velero_install(
    config: &HarnessConfig,
    args: &ChartArgs,
) -> Result<String, HarnessError> {
    let chart = velero_rock_chart(config, args.chart_version.as_deref())?;
    let argv = chart.install()?.argv(&config.helm)?;
    Ok(command_line(&argv))
}

async fn integration_velero(config: &HarnessConfig, args: &ChartArgs) -> Result<(), HarnessError> {
    let chart = velero_rock_chart(config, args.chart_version.as_deref())?;
    let scenario = velero_backup_restore(config, &chart)?;
    let cluster = Cluster::try_new(config).await?;

    scenario.run(&cluster).await?;
    Ok(())
}
