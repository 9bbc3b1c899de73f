mod predict;

use ethers::types::Address;
pub use predict::{contract_address, parse_creator, predict_addresses, predict_addresses_from_chain};
use serde::{Deserialize, Serialize};

/// The addresses of a vault and the strategy that backs it.
#[derive(Default, Debug, Eq, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Addresses {
    pub vault: Address,
    pub strategy: Address,
}
