mod refund;
mod token;

use ethers::types::U256;
pub use refund::{YieldHubRefund, BURN_ADDRESS};
use thiserror::Error;
pub use token::Token;

/// The scale of `pricePerFullShare`.
pub fn one() -> U256 {
    U256::exp10(18)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefundError {
    #[error("transfer amount exceeds balance: {balance} < {amount}")]
    InsufficientBalance { balance: U256, amount: U256 },

    #[error("transfer amount exceeds allowance: {allowance} < {amount}")]
    InsufficientAllowance { allowance: U256, amount: U256 },

    #[error("refund of {shares} shares overflows")]
    Overflow { shares: U256 },

    #[error("minting {amount} overflows the total supply of {total_supply}")]
    SupplyOverflow { total_supply: U256, amount: U256 },

    #[error("refund is not configured for token {0:?}")]
    WrongToken(ethers::types::Address),
}
