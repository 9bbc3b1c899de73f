/// Deployment plans for a vault and its strategy. Plans are read in a raw
/// form where every value is optional and validated in one pass so that all
/// missing values are reported before anything touches the chain.
use std::path::Path;

use ethers::{
    abi::Token,
    types::{Address, U256},
};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VaultParams {
    pub name: String,
    pub symbol: String,
    /// The approval delay for strategy upgrades, in seconds.
    pub delay: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyParams {
    pub want: Address,
    pub pool_id: u64,
    pub chef: Address,
    pub unirouter: Address,
    pub strategist: Address,
    pub keeper: Address,
    pub fee_recipient: Address,
    pub output_to_native_route: Vec<Address>,
    pub output_to_lp0_route: Vec<Address>,
    pub output_to_lp1_route: Vec<Address>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContractNames {
    pub vault: String,
    pub strategy: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    pub vault: VaultParams,
    pub strategy: StrategyParams,
    pub contract_names: ContractNames,
}

impl VaultParams {
    /// `constructor(strategy, name, symbol, approvalDelay)`
    pub fn constructor_args(&self, strategy: Address) -> Vec<Token> {
        vec![
            Token::Address(strategy),
            Token::String(self.name.clone()),
            Token::String(self.symbol.clone()),
            Token::Uint(U256::from(self.delay)),
        ]
    }
}

impl StrategyParams {
    /// `constructor(want, poolId, chef, vault, unirouter, keeper, strategist,
    /// feeRecipient, outputToNativeRoute, outputToLp0Route, outputToLp1Route)`
    pub fn constructor_args(&self, vault: Address) -> Vec<Token> {
        let route = |route: &[Address]| {
            Token::Array(route.iter().copied().map(Token::Address).collect())
        };
        vec![
            Token::Address(self.want),
            Token::Uint(U256::from(self.pool_id)),
            Token::Address(self.chef),
            Token::Address(vault),
            Token::Address(self.unirouter),
            Token::Address(self.keeper),
            Token::Address(self.strategist),
            Token::Address(self.fee_recipient),
            route(&self.output_to_native_route),
            route(&self.output_to_lp0_route),
            route(&self.output_to_lp1_route),
        ]
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawVaultParams {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub delay: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStrategyParams {
    pub want: Option<Address>,
    pub pool_id: Option<u64>,
    pub chef: Option<Address>,
    pub unirouter: Option<Address>,
    pub strategist: Option<Address>,
    pub keeper: Option<Address>,
    #[serde(alias = "beefyFeeRecipient")]
    pub fee_recipient: Option<Address>,
    pub output_to_native_route: Option<Vec<Address>>,
    pub output_to_lp0_route: Option<Vec<Address>>,
    pub output_to_lp1_route: Option<Vec<Address>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawContractNames {
    pub vault: Option<String>,
    pub strategy: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawDeploymentPlan {
    #[serde(alias = "vaultParams")]
    pub vault: RawVaultParams,
    #[serde(alias = "strategyParams")]
    pub strategy: RawStrategyParams,
    pub contract_names: RawContractNames,
}

/// Takes a value out of an option, recording its name if it is missing.
fn require<T>(value: Option<T>, name: &str, missing: &mut Vec<String>) -> Option<T> {
    if value.is_none() {
        missing.push(name.to_string());
    }
    value
}

impl TryFrom<RawDeploymentPlan> for DeploymentPlan {
    type Error = ConfigError;

    fn try_from(raw: RawDeploymentPlan) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let m = &mut missing;

        let name = require(raw.vault.name, "vault.name", m);
        let symbol = require(raw.vault.symbol, "vault.symbol", m);
        let delay = require(raw.vault.delay, "vault.delay", m);

        let s = raw.strategy;
        let want = require(s.want, "strategy.want", m);
        let pool_id = require(s.pool_id, "strategy.poolId", m);
        let chef = require(s.chef, "strategy.chef", m);
        let unirouter = require(s.unirouter, "strategy.unirouter", m);
        let strategist = require(s.strategist, "strategy.strategist", m);
        let keeper = require(s.keeper, "strategy.keeper", m);
        let fee_recipient = require(s.fee_recipient, "strategy.feeRecipient", m);
        let output_to_native_route = require(
            s.output_to_native_route,
            "strategy.outputToNativeRoute",
            m,
        );
        let output_to_lp0_route = require(s.output_to_lp0_route, "strategy.outputToLp0Route", m);
        let output_to_lp1_route = require(s.output_to_lp1_route, "strategy.outputToLp1Route", m);

        let vault_name = require(raw.contract_names.vault, "contractNames.vault", m);
        let strategy_name = require(raw.contract_names.strategy, "contractNames.strategy", m);

        match (
            name,
            symbol,
            delay,
            want,
            pool_id,
            chef,
            unirouter,
            strategist,
            keeper,
            fee_recipient,
            output_to_native_route,
            output_to_lp0_route,
            output_to_lp1_route,
            vault_name,
            strategy_name,
        ) {
            (
                Some(name),
                Some(symbol),
                Some(delay),
                Some(want),
                Some(pool_id),
                Some(chef),
                Some(unirouter),
                Some(strategist),
                Some(keeper),
                Some(fee_recipient),
                Some(output_to_native_route),
                Some(output_to_lp0_route),
                Some(output_to_lp1_route),
                Some(vault_name),
                Some(strategy_name),
            ) => Ok(DeploymentPlan {
                vault: VaultParams {
                    name,
                    symbol,
                    delay,
                },
                strategy: StrategyParams {
                    want,
                    pool_id,
                    chef,
                    unirouter,
                    strategist,
                    keeper,
                    fee_recipient,
                    output_to_native_route,
                    output_to_lp0_route,
                    output_to_lp1_route,
                },
                contract_names: ContractNames {
                    vault: vault_name,
                    strategy: strategy_name,
                },
            }),
            _ => Err(ConfigError::MissingValues(missing)),
        }
    }
}

impl DeploymentPlan {
    /// Reads and validates a plan from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &contents)
    }

    fn from_json(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let raw = serde_json::from_str::<RawDeploymentPlan>(contents).map_err(|source| {
            ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        raw.try_into()
    }

    /// The omnidex DMMY/KARMA LP vault on Telos.
    pub fn telos_omnidex_dmmy_karma() -> Result<Self, ConfigError> {
        let ops = parse_address("0xeD6d4e2D263334829954D880BF6A366834410713")?;
        let charm = parse_address("0xd2504a02fABd7E546e41aD39597c377cA8B0E1Df")?;
        let wtlos = parse_address("0xD102cE6A4dB07D247fcc28F366A623Df0938CA9E")?;
        Ok(Self {
            vault: VaultParams {
                name: "omnidex-dmmy-karma".to_string(),
                symbol: "yhDmmyKarma".to_string(),
                delay: 21600,
            },
            strategy: StrategyParams {
                want: parse_address("0x76Bf9208b92C75c94A5723f4a7343C26BB5739B8")?,
                pool_id: 29,
                chef: parse_address("0x79f5A8BD0d6a00A41EA62cdA426CEf0115117a61")?,
                unirouter: parse_address("0xF9678db1CE83f6f51E5df348E2Cc842Ca51EfEc1")?,
                strategist: ops,
                keeper: ops,
                fee_recipient: ops,
                output_to_native_route: vec![charm, wtlos],
                output_to_lp0_route: vec![
                    charm,
                    wtlos,
                    parse_address("0x2f15F85a6c346C0a2514Af70075259e503E7137B")?,
                ],
                output_to_lp1_route: vec![
                    charm,
                    parse_address("0x730d2Fa7dC7642E041bcE231E85b39e9bF4a6a64")?,
                ],
            },
            contract_names: ContractNames {
                vault: "YieldHubVaultV6".to_string(),
                strategy: "StrategyTelosOmnidexLP".to_string(),
            },
        })
    }
}

fn parse_address(value: &str) -> Result<Address, ConfigError> {
    value
        .parse::<Address>()
        .map_err(|e| ConfigError::InvalidAddress {
            value: value.to_string(),
            reason: e.to_string(),
        })
}
