/// This module deploys a vault and its strategy. The two contracts reference
/// each other in their constructors, so the strategy's address is predicted
/// from the deployer's nonce before the vault is deployed.
use std::{
    fs::{create_dir_all, File},
    path::{Path, PathBuf},
    sync::Arc,
};

use ethers::{
    abi::Token,
    contract::ContractInstance,
    providers::Middleware,
    signers::Signer,
    types::{Address, U256},
};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use yieldhub_addresses::{predict_addresses_from_chain, Addresses};
use yieldhub_config::{DeploymentPlan, NetworkConfig};

use crate::{
    chain::ChainClient,
    compile::{require_contracts, CompiledContracts},
};

/// The outcome of a deployment. This is what gets written to the artifacts
/// directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub name: String,
    pub chain_id: u64,
    pub deployer: Address,
    pub vault: Address,
    pub strategy: Address,
    pub want: Address,
    pub pool_id: u64,
}

impl Deployment {
    pub fn addresses(&self) -> Addresses {
        Addresses {
            vault: self.vault,
            strategy: self.strategy,
        }
    }

    /// Writes the deployment to `<dir>/<vault name>.json`.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.name));
        let f = File::create(&path)?;
        serde_json::to_writer_pretty(f, self)?;
        Ok(path)
    }
}

pub struct VaultDeployer<S: Signer + 'static> {
    client: Arc<ChainClient<S>>,
    network: NetworkConfig,
}

impl<S: Signer + 'static> VaultDeployer<S> {
    pub fn new(client: Arc<ChainClient<S>>, network: NetworkConfig) -> Self {
        Self { client, network }
    }

    /// Deploys the vault and then the strategy, waiting for each to be mined.
    /// Nothing is sent unless both contracts were compiled and the node is on
    /// the configured chain.
    pub async fn deploy(
        &self,
        plan: &DeploymentPlan,
        contracts: &CompiledContracts,
    ) -> Result<Deployment> {
        let names = &plan.contract_names;
        require_contracts(contracts, [names.vault.as_str(), names.strategy.as_str()])?;
        let vault_factory = contracts.factory(&names.vault, self.client.clone())?;
        let strategy_factory = contracts.factory(&names.strategy, self.client.clone())?;

        let chain_id = self.client.get_chainid().await?;
        if chain_id != U256::from(self.network.chain_id) {
            return Err(eyre!(
                "connected to chain {} but configured for chain {}",
                chain_id,
                self.network.chain_id
            ));
        }

        let deployer = self.client.address();
        info!(name = %plan.vault.name, ?deployer, "deploying");

        let predicted = predict_addresses_from_chain(self.client.as_ref(), deployer).await?;
        info!(vault = ?predicted.vault, strategy = ?predicted.strategy, "predicted addresses");

        let args = plan.vault.constructor_args(predicted.strategy);
        debug!(args = %describe_args(&args), "vault constructor arguments");
        let mut tx = vault_factory.deploy_tokens(args)?.legacy();
        tx.tx.set_gas(self.network.gas_limit);
        tx.tx.set_gas_price(self.network.gas_price);
        let (vault, receipt) = tx.send_with_receipt().await?;
        info!(vault = ?vault.address(), tx = ?receipt.transaction_hash, "deployed vault");

        let args = plan.strategy.constructor_args(vault.address());
        debug!(args = %describe_args(&args), "strategy constructor arguments");
        let mut tx = strategy_factory.deploy_tokens(args)?.legacy();
        tx.tx.set_gas(self.network.gas_limit);
        tx.tx.set_gas_price(self.network.gas_price);
        let (strategy, receipt) = tx.send_with_receipt().await?;
        info!(strategy = ?strategy.address(), tx = ?receipt.transaction_hash, "deployed strategy");

        let deployed = Addresses {
            vault: vault.address(),
            strategy: strategy.address(),
        };
        if deployed != predicted {
            return Err(eyre!(
                "deployed addresses {:?} don't match the predicted addresses {:?}",
                deployed,
                predicted
            ));
        }

        verify_links(&vault, &strategy).await?;

        Ok(Deployment {
            name: plan.vault.name.clone(),
            chain_id: self.network.chain_id,
            deployer,
            vault: deployed.vault,
            strategy: deployed.strategy,
            want: plan.strategy.want,
            pool_id: plan.strategy.pool_id,
        })
    }
}

/// Checks that the vault points at the strategy and vice versa. The two reads
/// are independent, so they are issued together. Contracts that don't expose
/// the getters are skipped.
async fn verify_links<M: Middleware + 'static>(
    vault: &ContractInstance<Arc<M>, M>,
    strategy: &ContractInstance<Arc<M>, M>,
) -> Result<()> {
    if vault.abi().function("strategy").is_err() || strategy.abi().function("vault").is_err() {
        warn!("skipping link verification since the getters aren't in the ABI");
        return Ok(());
    }
    let vault_strategy = vault.method::<_, Address>("strategy", ())?;
    let strategy_vault = strategy.method::<_, Address>("vault", ())?;
    let (vault_strategy, strategy_vault) =
        tokio::try_join!(vault_strategy.call(), strategy_vault.call())?;
    if vault_strategy != strategy.address() || strategy_vault != vault.address() {
        return Err(eyre!(
            "vault and strategy aren't linked: vault.strategy() = {:?}, strategy.vault() = {:?}",
            vault_strategy,
            strategy_vault
        ));
    }
    Ok(())
}

/// Formats constructor arguments for logging.
pub fn describe_args(args: &[Token]) -> String {
    args.iter()
        .map(|token| token.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
