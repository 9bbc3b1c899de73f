use std::collections::BTreeMap;

use ethers::types::{Address, U256};

use crate::RefundError;

/// A minimal ERC20 ledger. The whole supply is minted to the deployer, which
/// mirrors the test token the refund contract is exercised against.
#[derive(Clone, Debug)]
pub struct Token {
    address: Address,
    name: String,
    symbol: String,
    total_supply: U256,
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<(Address, Address), U256>,
}

impl Token {
    pub fn new(
        address: Address,
        supply: U256,
        name: impl Into<String>,
        symbol: impl Into<String>,
        deployer: Address,
    ) -> Self {
        let mut balances = BTreeMap::new();
        balances.insert(deployer, supply);
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            total_supply: supply,
            balances,
            allowances: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Creates `amount` new tokens for `to`.
    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), RefundError> {
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(RefundError::SupplyOverflow {
                total_supply: self.total_supply,
                amount,
            })?;
        // Balances never exceed the total supply.
        *self.balances.entry(to).or_default() += amount;
        self.total_supply = total_supply;
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), RefundError> {
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(RefundError::InsufficientBalance { balance, amount });
        }
        self.balances.insert(from, balance - amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), RefundError> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            return Err(RefundError::InsufficientAllowance { allowance, amount });
        }
        self.transfer(from, to, amount)?;
        self.allowances.insert((from, spender), allowance - amount);
        Ok(())
    }
}
