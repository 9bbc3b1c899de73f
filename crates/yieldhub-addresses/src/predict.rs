use ethers::{
    providers::Middleware,
    types::{Address, BlockNumber, U256},
    utils::{keccak256, rlp::RlpStream},
};
use eyre::{eyre, Result};

use crate::Addresses;

/// Computes the address of the contract that `sender` creates with the
/// transaction numbered `nonce`. This is the low 20 bytes of
/// `keccak256(rlp([sender, nonce]))`.
pub fn contract_address(sender: Address, nonce: U256) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(&sender);
    stream.append(&nonce);
    let hash = keccak256(stream.out());
    Address::from_slice(&hash[12..])
}

/// Predicts the addresses of the next two contracts deployed by `creator`.
/// The vault is deployed first, so it takes the current nonce and the
/// strategy takes the one after it. Fails if there is no nonce after `nonce`.
pub fn predict_addresses(creator: Address, nonce: U256) -> Result<Addresses> {
    let next = nonce
        .checked_add(U256::one())
        .ok_or_else(|| eyre!("nonce {} of {:?} has no successor", nonce, creator))?;
    Ok(Addresses {
        vault: contract_address(creator, nonce),
        strategy: contract_address(creator, next),
    })
}

/// Parses a hex-encoded deployer address.
pub fn parse_creator(creator: &str) -> Result<Address> {
    creator
        .parse::<Address>()
        .map_err(|e| eyre!("malformed creator address {:?}: {}", creator, e))
}

/// Predicts the vault and strategy addresses using the creator's pending
/// transaction count. RPC failures are returned to the caller as-is.
pub async fn predict_addresses_from_chain<M: Middleware>(
    client: &M,
    creator: Address,
) -> Result<Addresses> {
    let nonce = client
        .get_transaction_count(creator, Some(BlockNumber::Pending.into()))
        .await
        .map_err(|e| eyre!("failed to fetch the nonce of {:?}: {}", creator, e))?;
    predict_addresses(creator, nonce)
}
