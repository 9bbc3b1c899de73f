#[macro_use]
extern crate lazy_static;

pub mod chain;
pub mod compile;
pub mod constants;
pub mod deploy;

use std::path::Path;

use eyre::Result;
use tracing::info;
use yieldhub_config::{chain_call_fee, CompilerConfig, DeploymentPlan, NetworkConfig};

use crate::{chain::Chain, deploy::Deployment};

/// Loads the deployment plan named by the network config, or the built-in
/// Telos plan if none is given.
pub fn load_plan(network: &NetworkConfig) -> Result<DeploymentPlan> {
    Ok(match &network.deployment_plan {
        Some(path) => DeploymentPlan::from_file(path)?,
        None => DeploymentPlan::telos_omnidex_dmmy_karma()?,
    })
}

/// Runs a full deployment: validates the configuration, compiles the
/// sources under `root`, deploys the vault and strategy, and records the
/// result in the artifacts directory.
pub async fn run(root: &Path, network: NetworkConfig, compiler: CompilerConfig) -> Result<Deployment> {
    // Everything that can be checked without the chain is checked first.
    let chain = network.chain()?;
    let wallet = network.wallet()?;
    let plan = load_plan(&network)?;
    info!(%chain, call_fee = chain_call_fee(chain), "loaded configuration");

    let contracts = {
        let root = root.to_path_buf();
        tokio::task::spawn_blocking(move || compile::compile(&root, &compiler)).await??
    };
    compile::require_contracts(
        &contracts,
        [
            plan.contract_names.vault.as_str(),
            plan.contract_names.strategy.as_str(),
        ],
    )?;

    let chain = Chain::connect(Some(network.rpc_url.clone())).await?;
    let client = chain.client(wallet).await?;
    let artifacts_dir = network.artifacts_dir.clone();
    let deployment = deploy::VaultDeployer::new(client, network)
        .deploy(&plan, &contracts)
        .await?;

    let path = deployment.write(&artifacts_dir)?;
    info!(path = %path.display(), "wrote deployment");

    Ok(deployment)
}
