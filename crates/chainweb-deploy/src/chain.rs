use std::{str::FromStr, sync::Arc, time::Duration};

use chainweb_chains::ChainDescriptor;
use ethers::{
    middleware::{NonceManagerMiddleware, SignerMiddleware},
    providers::{
        Http, HttpClientError, HttpRateLimitRetryPolicy, Provider, RetryClient,
        RetryClientBuilder, RetryPolicy,
    },
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer},
};
use eyre::Result;

/// The public chainweb endpoints throttle aggressively when a run
/// walks all five chains back to back, so on top of the standard rate
/// limit handling we also retry plain "too many requests" bodies.
#[derive(Debug, Default)]
struct ChainwebRetryPolicy(HttpRateLimitRetryPolicy);

impl RetryPolicy<HttpClientError> for ChainwebRetryPolicy {
    fn should_retry(&self, error: &HttpClientError) -> bool {
        self.0.should_retry(error) || error.to_string().contains("too many requests")
    }

    fn backoff_hint(&self, error: &HttpClientError) -> Option<Duration> {
        match self.0.backoff_hint(error) {
            Some(duration) => Some(duration),
            None if error.to_string().contains("too many requests") => {
                Some(Duration::from_millis(500))
            }
            None => None,
        }
    }
}

/// A client with retries, a signer bound to the target chain id, and
/// local nonce management.
pub type ChainClient =
    NonceManagerMiddleware<SignerMiddleware<Provider<RetryClient<Http>>, LocalWallet>>;

/// An explicit handle to one Chainweb chain. Every operation that
/// touches a chain takes a handle; there is no ambient "current chain"
/// that has to be switched before each call.
#[derive(Clone, Debug)]
pub struct ChainHandle {
    descriptor: ChainDescriptor,
    provider: Provider<Http>,
}

impl ChainHandle {
    /// Connects to the chain described by `descriptor`.
    pub fn connect(descriptor: &ChainDescriptor) -> Result<Self> {
        let provider = Provider::<Http>::try_from(descriptor.rpc_url.as_str())?
            .interval(Duration::from_millis(250));
        Ok(Self {
            descriptor: descriptor.clone(),
            provider,
        })
    }

    pub fn descriptor(&self) -> &ChainDescriptor {
        &self.descriptor
    }

    pub fn chain_id(&self) -> u64 {
        self.descriptor.chain_id
    }

    /// A bare provider for calls that don't need a signer.
    pub fn provider(&self) -> Provider<Http> {
        self.provider.clone()
    }

    /// A signing client for this chain. The wallet is rebound to the
    /// chain id from the descriptor so a handle can never sign for the
    /// wrong chain.
    pub fn client(&self, wallet: &LocalWallet) -> Result<Arc<ChainClient>> {
        let http = Http::from_str(&self.descriptor.rpc_url)?;
        let retrying = RetryClientBuilder::default()
            .rate_limit_retries(10)
            .timeout_retries(3)
            .initial_backoff(Duration::from_millis(500))
            .build(http, Box::<ChainwebRetryPolicy>::default());
        let provider = Provider::new(retrying).interval(Duration::from_millis(250));

        let wallet = wallet.clone().with_chain_id(self.descriptor.chain_id);
        let address = wallet.address();
        let inner = SignerMiddleware::new(provider, wallet);
        Ok(Arc::new(NonceManagerMiddleware::new(inner, address)))
    }
}

/// The mnemonic the local development node prefunds.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Derives one of the prefunded local development accounts.
pub fn dev_wallet(index: u32) -> Result<LocalWallet> {
    let wallet = MnemonicBuilder::<English>::default()
        .phrase(DEV_MNEMONIC)
        .index(index)?
        .build()?;
    Ok(wallet)
}

#[cfg(test)]
mod tests {
    use ethers::providers::Middleware;

    use super::*;

    #[test]
    fn test_dev_wallets_are_deterministic() {
        let first = dev_wallet(0).unwrap();
        let again = dev_wallet(0).unwrap();
        assert_eq!(first.address(), again.address());

        let second = dev_wallet(1).unwrap();
        assert_ne!(first.address(), second.address());
    }

    #[test]
    fn test_client_uses_descriptor_chain_id() {
        let descriptor =
            chainweb_chains::ChainDescriptor::new(0, chainweb_chains::ChainwebEnvironment::Localhost);
        let handle = ChainHandle::connect(&descriptor).unwrap();
        let client = handle.client(&dev_wallet(0).unwrap()).unwrap();
        assert_eq!(client.inner().signer().chain_id(), descriptor.chain_id);
    }
}
