use crate::common::harness_config;
use rock_test_harness::cluster::Cluster;
use rock_test_harness::scenario::velero::{velero_backup_restore, velero_rock_chart};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[ignore = "needs k8s cluster"]
async fn velero_backup_and_restore() -> Result<(), Box<dyn std::error::Error>> {
    let config = harness_config();
    let chart = velero_rock_chart(&config, None)?;
    let scenario = velero_backup_restore(&config, &chart)?;

    let cluster = Cluster::try_new(&config).await?;
    scenario.run(&cluster).await?;

    Ok(())
}
