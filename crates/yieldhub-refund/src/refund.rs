use ethers::types::{Address, H160, U256};
use tracing::debug;

use crate::{one, RefundError, Token};

/// Refunded shares are parked here instead of being burned.
pub const BURN_ADDRESS: Address = H160([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0xde, 0xad,
]);

/// Buys back vault shares (the "mootoken") for the underlying token at a
/// fixed price per full share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YieldHubRefund {
    address: Address,
    token: Address,
    mootoken: Address,
    price_per_full_share: U256,
}

impl YieldHubRefund {
    pub fn new(address: Address, token: Address, mootoken: Address, price_per_full_share: U256) -> Self {
        Self {
            address,
            token,
            mootoken,
            price_per_full_share,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn mootoken(&self) -> Address {
        self.mootoken
    }

    pub fn price_per_full_share(&self) -> U256 {
        self.price_per_full_share
    }

    /// The underlying owed for a number of shares, rounded down.
    pub fn quote(&self, shares: U256) -> Result<U256, RefundError> {
        shares
            .checked_mul(self.price_per_full_share)
            .map(|value| value / one())
            .ok_or(RefundError::Overflow { shares })
    }

    /// Pays the caller for all of their shares and moves the shares to the
    /// burn address. A caller without shares is a no-op. Either transfer
    /// failing leaves both ledgers untouched. Returns the amount paid.
    pub fn refund(
        &self,
        caller: Address,
        token: &mut Token,
        mootoken: &mut Token,
    ) -> Result<U256, RefundError> {
        if token.address() != self.token {
            return Err(RefundError::WrongToken(token.address()));
        }
        if mootoken.address() != self.mootoken {
            return Err(RefundError::WrongToken(mootoken.address()));
        }

        let shares = mootoken.balance_of(caller);
        if shares.is_zero() {
            return Ok(U256::zero());
        }
        let owed = self.quote(shares)?;

        // Check both transfers up front so that a failure can't leave a
        // partial refund behind.
        let balance = token.balance_of(self.address);
        if balance < owed {
            return Err(RefundError::InsufficientBalance {
                balance,
                amount: owed,
            });
        }
        let allowance = mootoken.allowance(caller, self.address);
        if allowance < shares {
            return Err(RefundError::InsufficientAllowance {
                allowance,
                amount: shares,
            });
        }

        token.transfer(self.address, caller, owed)?;
        mootoken.transfer_from(self.address, caller, BURN_ADDRESS, shares)?;
        debug!(?caller, %shares, %owed, "refunded shares");

        Ok(owed)
    }
}
