use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use ethers::{
    core::utils::Anvil,
    middleware::{
        nonce_manager::NonceManagerError, MiddlewareError, NonceManagerMiddleware,
        SignerMiddleware,
    },
    providers::{Http, Middleware, PendingTransaction, Provider},
    signers::Signer,
    types::{transaction::eip2718::TypedTransaction, Address, BlockId, U256},
    utils::AnvilInstance,
};
use eyre::{eyre, Result};
use tracing::debug;

type ChainClientInner<S> = NonceManagerMiddleware<SignerMiddleware<Provider<Http>, S>>;

#[derive(Debug)]
pub struct ChainClient<S: Signer + 'static> {
    inner: ChainClientInner<S>,
    address: Address,
}

/// A client with a provider stack that includes a signer and a nonce
/// manager. Failed requests are not retried.
impl<S: Signer + 'static> ChainClient<S> {
    pub async fn new(provider: Provider<Http>, signer: S) -> Result<Self> {
        let inner = SignerMiddleware::new_with_provider_chain(provider, signer).await?;
        let address = inner.address();
        let inner = NonceManagerMiddleware::new(inner, address);
        Ok(Self { inner, address })
    }

    /// Gets the client's address.
    pub fn address(&self) -> Address {
        self.address
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl<S: Signer + 'static> Middleware for ChainClient<S> {
    // NOTE: This is a pass-through middleware implementation, so we just use
    // the error from the top of the middleware stack.
    type Error = NonceManagerError<Self::Inner>;

    type Provider = Http;
    type Inner = ChainClientInner<S>;

    fn inner(&self) -> &Self::Inner {
        &self.inner
    }

    async fn send_transaction<T: Into<TypedTransaction> + Send + Sync>(
        &self,
        tx: T,
        block: Option<BlockId>,
    ) -> Result<PendingTransaction<'_, Self::Provider>, Self::Error> {
        Ok(self
            .inner
            .send_transaction(tx, block)
            .await
            .map_err(MiddlewareError::from_err)?)
    }
}

/// An abstraction over the chain being deployed to. Without an RPC URL, a
/// local anvil node is spun up, which is what the tests run against.
pub struct Chain {
    provider: Provider<Http>,
    client_version: String,
    _maybe_anvil: Option<AnvilInstance>,
}

impl Chain {
    /// Constructs a new `Chain` from an Ethereum RPC URL. If the RPC URL is
    /// excluded, a local anvil node is spun up.
    pub async fn connect(maybe_rpc_url: Option<String>) -> Result<Self> {
        let (provider, maybe_anvil) = if let Some(rpc_url) = maybe_rpc_url {
            (Provider::<Http>::try_from(rpc_url)?, None)
        } else {
            let anvil = Anvil::new().spawn();
            (Provider::<Http>::try_from(anvil.endpoint())?, Some(anvil))
        };
        let provider = provider.interval(Duration::from_millis(100));
        let client_version = provider.client_version().await?;
        debug!(%client_version, "connected to chain");
        Ok(Self {
            provider,
            client_version,
            _maybe_anvil: maybe_anvil,
        })
    }

    /// A provider that can access the chain.
    pub fn provider(&self) -> Provider<Http> {
        self.provider.clone()
    }

    /// A client that can access the chain.
    pub async fn client<S: Signer + 'static>(&self, signer: S) -> Result<Arc<ChainClient<S>>> {
        Ok(Arc::new(ChainClient::new(self.provider(), signer).await?))
    }

    /// Mints ether to an address. This only works for anvil chains.
    pub async fn deal<U: Into<U256>>(&self, address: Address, amount: U) -> Result<()> {
        if !self.is_anvil() {
            return Err(eyre!("can't deal ether on a non-anvil chain"));
        }
        let balance = self.provider.get_balance(address, None).await?;
        self.provider
            .request::<(Address, U256), ()>("anvil_setBalance", (address, balance + amount.into()))
            .await?;
        Ok(())
    }

    /// Snapshots the chain. This only works for anvil chains.
    pub async fn snapshot(&self) -> Result<U256> {
        if !self.is_anvil() {
            return Err(eyre!("can't snapshot a non-anvil chain"));
        }
        let id = self.provider.request("evm_snapshot", ()).await?;
        debug!(%id, "took snapshot");
        Ok(id)
    }

    /// Reverts the chain to a previous snapshot. This only works for anvil
    /// chains. Clients created before the revert have stale nonces, so new
    /// ones should be created afterwards.
    pub async fn revert<U: Into<U256>>(&self, id: U) -> Result<()> {
        if !self.is_anvil() {
            return Err(eyre!("can't revert a non-anvil chain"));
        }
        let id = id.into();
        let reverted = self
            .provider
            .request::<[U256; 1], bool>("evm_revert", [id])
            .await?;
        if !reverted {
            return Err(eyre!("failed to revert to snapshot {}", id));
        }
        Ok(())
    }

    /// Checks to see if the underlying chain is an anvil chain.
    fn is_anvil(&self) -> bool {
        self.client_version.contains("anvil")
    }
}
