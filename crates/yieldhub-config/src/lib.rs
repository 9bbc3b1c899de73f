mod compiler;
mod error;
mod fees;
mod network;
mod plan;

pub use compiler::{CompilerConfig, CompilerSettings};
pub use error::ConfigError;
pub use fees::{chain_call_fee, YieldHubChain, DEFAULT_FEE, REDUCED_FEE};
pub use network::NetworkConfig;
pub use plan::{
    ContractNames, DeploymentPlan, RawContractNames, RawDeploymentPlan, RawStrategyParams,
    RawVaultParams, StrategyParams, VaultParams,
};
