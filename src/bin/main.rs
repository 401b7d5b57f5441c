use std::process;

use tracing::{debug, error};

use rock_test_harness::cli::Cli;
use rock_test_harness::config::HarnessConfig;
use rock_test_harness::error::HarnessError;
use rock_test_harness::logging::Logging;

#[tokio::main]
async fn main() {
    let cli = Cli::init_harness_cli();

    if let Err(err) = run(&cli).await {
        error!(kind = %err.kind(), "{err}");
        eprintln!("{err}");
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), HarnessError> {
    // init logging singleton
    Logging::try_init(cli.log_level())?;
    debug!(?cli, "parsed command line");

    let config = HarnessConfig::load(cli.config().map(|path| path.as_path()))?;
    cli.command.run(&config).await
}
