use std::{path::Path, sync::Arc};

use deploy_utils::{
    chain::{Chain, ChainClient},
    compile::{compile, CompiledContracts},
    constants::{ALICE, BOB, CONTRACTS_ROOT, MAYBE_ETHEREUM_URL},
    deploy::VaultDeployer,
};
use ethers::{
    contract::ContractInstance,
    providers::Middleware,
    signers::{LocalWallet, Signer},
    types::{Address, U256},
};
use eyre::Result;
use yieldhub_addresses::predict_addresses;
use yieldhub_config::{CompilerConfig, DeploymentPlan, NetworkConfig};
use yieldhub_refund::BURN_ADDRESS;

type Client = ChainClient<LocalWallet>;
type Instance = ContractInstance<Arc<Client>, Client>;

async fn setup_chain() -> Result<(Chain, Arc<Client>, CompiledContracts)> {
    let _ = tracing_subscriber::fmt::try_init();

    let chain = Chain::connect(MAYBE_ETHEREUM_URL.clone()).await?;
    chain.deal(ALICE.address(), U256::exp10(21)).await?;
    chain.deal(BOB.address(), U256::exp10(21)).await?;
    let client = chain.client(ALICE.clone()).await?;

    let root = Path::new(CONTRACTS_ROOT.as_str()).to_path_buf();
    let contracts =
        tokio::task::spawn_blocking(move || compile(&root, &CompilerConfig::default())).await??;

    Ok((chain, client, contracts))
}

async fn deploy_token(
    contracts: &CompiledContracts,
    client: Arc<Client>,
    name: &str,
    symbol: &str,
) -> Result<Instance> {
    Ok(contracts
        .factory("TestToken", client)?
        .deploy((U256::from(10000), name.to_string(), symbol.to_string()))?
        .send()
        .await?)
}

async fn balance_of(token: &Instance, owner: Address) -> Result<U256> {
    Ok(token
        .method::<_, U256>("balanceOf", owner)?
        .call()
        .await?)
}

/// Points a deployed contract at a different client.
fn connect(instance: &Instance, client: Arc<Client>) -> Instance {
    Instance::new(instance.address(), instance.abi().clone(), client)
}

struct RefundSetup {
    token: Instance,
    mootoken: Instance,
    refund: Instance,
    contracts: CompiledContracts,
}

fn price_per_full_share() -> U256 {
    U256::from(1_500_000_000_000_000_000_u128)
}

async fn setup_refund() -> Result<(Chain, RefundSetup)> {
    let (chain, alice, contracts) = setup_chain().await?;

    let token = deploy_token(&contracts, alice.clone(), "Test Token", "TEST").await?;
    let mootoken = deploy_token(&contracts, alice.clone(), "Test Moo Token", "mooTEST").await?;
    let refund = contracts
        .factory("YieldHubRefund", alice.clone())?
        .deploy((token.address(), mootoken.address(), price_per_full_share()))?
        .send()
        .await?;

    Ok((
        chain,
        RefundSetup {
            token,
            mootoken,
            refund,
            contracts,
        },
    ))
}

/// Fresh clients for alice and bob. Clients have to be recreated after a
/// revert since their nonces are cached.
async fn clients(chain: &Chain) -> Result<(Arc<Client>, Arc<Client>)> {
    Ok((
        chain.client(ALICE.clone()).await?,
        chain.client(BOB.clone()).await?,
    ))
}

async fn refund_without_shares_pays_nothing(chain: &Chain, setup: &RefundSetup) -> Result<()> {
    let (alice, bob) = clients(chain).await?;
    let refund_address = setup.refund.address();
    connect(&setup.token, alice)
        .method::<_, bool>("transfer", (refund_address, U256::from(150)))?
        .send()
        .await?
        .await?;

    let before = balance_of(&setup.token, refund_address).await?;
    connect(&setup.refund, bob)
        .method::<_, ()>("refund", ())?
        .send()
        .await?
        .await?;
    let after = balance_of(&setup.token, refund_address).await?;

    assert_eq!(before, after);
    Ok(())
}

async fn refund_pays_and_burns_shares(chain: &Chain, setup: &RefundSetup) -> Result<()> {
    let (alice, bob) = clients(chain).await?;
    let refund_address = setup.refund.address();
    let user = BOB.address();
    let user_shares = U256::from(100);

    connect(&setup.token, alice.clone())
        .method::<_, bool>("transfer", (refund_address, U256::from(500)))?
        .send()
        .await?
        .await?;
    connect(&setup.mootoken, alice)
        .method::<_, bool>("transfer", (user, user_shares))?
        .send()
        .await?
        .await?;

    let token_before = balance_of(&setup.token, user).await?;
    let moo_before = balance_of(&setup.mootoken, user).await?;
    let refunder_before = balance_of(&setup.token, refund_address).await?;
    let burn_before = balance_of(&setup.mootoken, BURN_ADDRESS).await?;

    connect(&setup.mootoken, bob.clone())
        .method::<_, bool>("approve", (refund_address, user_shares))?
        .send()
        .await?
        .await?;
    connect(&setup.refund, bob)
        .method::<_, ()>("refund", ())?
        .send()
        .await?
        .await?;

    let expected = price_per_full_share() * user_shares / U256::exp10(18);
    assert_eq!(expected, U256::from(150));
    assert_eq!(balance_of(&setup.token, user).await?, token_before + expected);
    assert_eq!(balance_of(&setup.mootoken, user).await?, moo_before - user_shares);
    assert_eq!(
        balance_of(&setup.token, refund_address).await?,
        refunder_before - expected
    );
    assert_eq!(
        balance_of(&setup.mootoken, BURN_ADDRESS).await?,
        burn_before + user_shares
    );

    Ok(())
}

#[ignore]
#[tokio::test]
async fn test_refund_initializes_correctly() -> Result<()> {
    let (_chain, setup) = setup_refund().await?;
    let refund = &setup.refund;

    let token = refund.method::<_, Address>("token", ())?.call().await?;
    let mootoken = refund.method::<_, Address>("mootoken", ())?.call().await?;
    let price = refund
        .method::<_, U256>("pricePerFullShare", ())?
        .call()
        .await?;
    assert_eq!(token, setup.token.address());
    assert_eq!(mootoken, setup.mootoken.address());
    assert_eq!(price, price_per_full_share());
    assert!(setup.contracts.contains("YieldHubRefund"));

    Ok(())
}

#[ignore]
#[tokio::test]
async fn test_refund_scenarios() -> Result<()> {
    let (chain, setup) = setup_refund().await?;
    let refund_address = setup.refund.address();
    let id = chain.snapshot().await?;

    refund_without_shares_pays_nothing(&chain, &setup).await?;
    assert_eq!(balance_of(&setup.token, refund_address).await?, U256::from(150));

    // Each scenario starts from the freshly deployed contracts.
    chain.revert(id).await?;
    assert_eq!(balance_of(&setup.token, refund_address).await?, U256::zero());
    let id = chain.snapshot().await?;

    refund_pays_and_burns_shares(&chain, &setup).await?;
    assert_eq!(balance_of(&setup.token, refund_address).await?, U256::from(350));

    chain.revert(id).await?;
    assert_eq!(balance_of(&setup.token, refund_address).await?, U256::zero());
    assert_eq!(
        balance_of(&setup.mootoken, BURN_ADDRESS).await?,
        U256::zero()
    );

    Ok(())
}

// The strategy's constructor talks to the chef and router, so this needs
// `YIELDHUB_TEST_ETHEREUM_URL` to point at an anvil fork of Telos.
#[ignore]
#[tokio::test]
async fn test_deploy_vault_and_strategy_from_sources() -> Result<()> {
    let (chain, client, contracts) = setup_chain().await?;
    let chain_id = chain.provider().get_chainid().await?;
    let network = NetworkConfig::from_vars(vec![
        ("YIELDHUB_CHAIN_ID".to_string(), chain_id.to_string()),
        ("YIELDHUB_GAS_LIMIT".to_string(), "10000000".to_string()),
        ("YIELDHUB_GAS_PRICE".to_string(), "10000000000".to_string()),
    ])?;
    let nonce = chain
        .provider()
        .get_transaction_count(ALICE.address(), None)
        .await?;

    let plan = DeploymentPlan::telos_omnidex_dmmy_karma()?;
    let deployment = VaultDeployer::new(client, network)
        .deploy(&plan, &contracts)
        .await?;

    assert_eq!(deployment.addresses(), predict_addresses(ALICE.address(), nonce)?);
    Ok(())
}
