use std::env;

use ethers::{signers::LocalWallet, utils::keccak256};

lazy_static! {
    // A set of test accounts.
    pub static ref ALICE: LocalWallet = LocalWallet::from_bytes(&keccak256("alice")).unwrap();
    pub static ref BOB: LocalWallet = LocalWallet::from_bytes(&keccak256("bob")).unwrap();

    // The Ethereum URL the on-chain tests should connect to. If None, then the
    // tests will spawn an anvil node.
    pub static ref MAYBE_ETHEREUM_URL: Option<String> = env::var("YIELDHUB_TEST_ETHEREUM_URL").ok();

    // The project root that holds the contract sources for on-chain tests.
    pub static ref CONTRACTS_ROOT: String = env::var("YIELDHUB_CONTRACTS_ROOT").unwrap_or_else(|_| "../..".to_string());
}
