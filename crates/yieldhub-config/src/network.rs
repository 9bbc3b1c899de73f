use std::{fmt, path::PathBuf};

use ethers::{
    signers::{LocalWallet, Signer},
    types::U256,
};
use serde::{Deserialize, Deserializer};

use crate::{ConfigError, YieldHubChain};

const ENV_PREFIX: &str = "YIELDHUB_";

fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let dec_string: String = Deserialize::deserialize(deserializer)?;
    let u256 = U256::from_dec_str(&dec_string).map_err(serde::de::Error::custom)?;
    Ok(u256)
}

/// The network a deployment targets and the account that pays for it. Every
/// field is read from a `YIELDHUB_`-prefixed environment variable and falls
/// back to the Telos mainnet settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    #[serde(deserialize_with = "deserialize_u256")]
    pub gas_limit: U256,
    #[serde(deserialize_with = "deserialize_u256")]
    pub gas_price: U256,
    pub artifacts_dir: PathBuf,
    pub deployment_plan: Option<PathBuf>,
    private_key: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: YieldHubChain::Telos.chain_id(),
            rpc_url: "https://mainnet.telos.net/evm".to_string(),
            gas_limit: U256::from(2_100_000),
            gas_price: U256::from(499_809_179_185_u64),
            artifacts_dir: PathBuf::from("artifacts"),
            deployment_plan: None,
            private_key: None,
        }
    }
}

// The private key is never printed.
impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("gas_limit", &self.gas_limit)
            .field("gas_price", &self.gas_price)
            .field("artifacts_dir", &self.artifacts_dir)
            .field("deployment_plan", &self.deployment_plan)
            .finish_non_exhaustive()
    }
}

impl NetworkConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Self>()?)
    }

    /// Reads the configuration from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, Self>(vars)?)
    }

    /// The chain being deployed to. Only chains with a fee entry are
    /// supported.
    pub fn chain(&self) -> Result<YieldHubChain, ConfigError> {
        YieldHubChain::from_chain_id(self.chain_id)
    }

    /// The deployer's wallet, bound to the configured chain id.
    pub fn wallet(&self) -> Result<LocalWallet, ConfigError> {
        // An unfilled `YIELDHUB_PRIVATE_KEY=` line counts as missing.
        let key = self
            .private_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingPrivateKey)?;
        let wallet = key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| ConfigError::InvalidPrivateKey(e.to_string()))?;
        Ok(wallet.with_chain_id(self.chain_id))
    }
}
