pub mod run;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::metadata::LevelFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
pub struct Cli {
    /// Harness configuration file, defaults are used when absent.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Checks a rock image without a cluster.
    #[command(subcommand)]
    Sanity(SanityCommand),
    /// Deploys rocks into the current cluster and exercises them.
    #[command(subcommand)]
    Integration(IntegrationCommand),
    /// Prints commands without running them.
    #[command(subcommand)]
    Render(RenderCommand),
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum SanityCommand {
    Velero(VersionArgs),
    Kubectl(VersionArgs),
    VeleroPluginForVsphere,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum IntegrationCommand {
    Velero(ChartArgs),
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum RenderCommand {
    /// The helm command installing the Velero rock.
    VeleroInstall(ChartArgs),
}

#[derive(Args, Debug, PartialEq)]
pub struct VersionArgs {
    /// Version of the rock, selecting the `ROCK_<NAME>_<VERSION>` variable.
    #[arg(long)]
    pub version: String,
}

#[derive(Args, Debug, PartialEq)]
pub struct ChartArgs {
    /// Chart version to install, latest when absent.
    #[arg(long)]
    pub chart_version: Option<String>,
}

impl Cli {
    /// Parses command line arguments
    pub fn init_harness_cli() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }
}
