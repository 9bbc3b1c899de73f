/// Deploys a vault and its chef strategy. The network is configured with
/// `YIELDHUB_*` environment variables (a `.env` file is read if present) and
/// the vault and strategy parameters come from the JSON file named by
/// `YIELDHUB_DEPLOYMENT_PLAN`, or the built-in Telos plan.
use std::env;

use deploy_utils::run;
use dotenvy::dotenv;
use eyre::Result;
use yieldhub_config::{CompilerConfig, NetworkConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv().ok();

    let network = NetworkConfig::from_env()?;
    let root = env::current_dir()?;
    let deployment = run(&root, network, CompilerConfig::default()).await?;

    println!("Vault: {:?}", deployment.vault);
    println!("Strategy: {:?}", deployment.strategy);
    println!("Want: {:?}", deployment.want);
    println!("PoolId: {}", deployment.pool_id);

    Ok(())
}
