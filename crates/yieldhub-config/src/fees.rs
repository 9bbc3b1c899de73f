use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The call fee charged on chains without a negotiated rate.
pub const DEFAULT_FEE: u64 = 111;
/// The call fee charged on chains with a negotiated rate.
pub const REDUCED_FEE: u64 = 11;

/// The chains that YieldHub vaults are deployed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YieldHubChain {
    Telos,
}

impl YieldHubChain {
    pub const ALL: &'static [YieldHubChain] = &[YieldHubChain::Telos];

    pub fn key(self) -> &'static str {
        match self {
            YieldHubChain::Telos => "telos",
        }
    }

    pub fn chain_id(self) -> u64 {
        match self {
            YieldHubChain::Telos => 40,
        }
    }

    pub fn from_chain_id(chain_id: u64) -> Result<Self, ConfigError> {
        Self::ALL
            .iter()
            .copied()
            .find(|chain| chain.chain_id() == chain_id)
            .ok_or(ConfigError::UnsupportedChainId(chain_id))
    }
}

impl fmt::Display for YieldHubChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for YieldHubChain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|chain| chain.key() == s)
            .ok_or_else(|| ConfigError::UnsupportedChain(s.to_string()))
    }
}

/// The call fee for a supported chain.
pub fn chain_call_fee(chain: YieldHubChain) -> u64 {
    match chain {
        YieldHubChain::Telos => REDUCED_FEE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_call_fee() {
        assert_eq!(chain_call_fee(YieldHubChain::Telos), 11);
        for chain in YieldHubChain::ALL {
            let fee = chain_call_fee(*chain);
            assert!(fee == DEFAULT_FEE || fee == REDUCED_FEE);
        }
    }

    #[test]
    fn test_chain_keys() {
        for chain in YieldHubChain::ALL {
            assert_eq!(chain.key().parse::<YieldHubChain>().unwrap(), *chain);
            assert_eq!(YieldHubChain::from_chain_id(chain.chain_id()).unwrap(), *chain);
        }
        assert!(matches!(
            "bsc".parse::<YieldHubChain>(),
            Err(ConfigError::UnsupportedChain(_))
        ));
        assert!(matches!(
            YieldHubChain::from_chain_id(56),
            Err(ConfigError::UnsupportedChainId(56))
        ));
    }
}
