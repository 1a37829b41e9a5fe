//! Deterministic deployments through the shared CREATE2 factory.
//!
//! The factory is the well-known proxy at
//! `0x4e59b44847b379578588920cA78FbF26c0B4956C`, installed on every
//! chain from the same presigned, pre-EIP-155 transaction so that it
//! lands at the same address everywhere. Calling the factory with
//! `salt ++ init_code` as calldata deploys the contract to an address
//! that depends only on the salt and the init code.

use std::sync::Arc;

use ethers::{
    providers::Middleware,
    types::{Address, Bytes, TransactionRequest, H256},
    utils::{get_create2_address_from_hash, keccak256},
};
use eyre::{bail, Result, WrapErr};
use tracing::info;

use crate::{
    chain::{ChainClient, ChainHandle},
    constants::{
        CREATE2_FACTORY, CREATE2_FACTORY_DEPLOYER, CREATE2_FACTORY_DEPLOYMENT_TX,
        CREATE2_FACTORY_FUNDING,
    },
};

/// Derives the deployment salt from a human-readable label.
pub fn deployment_salt(label: &str) -> H256 {
    H256::from(keccak256(label.as_bytes()))
}

/// The address a contract will occupy when deployed through the
/// factory with the given salt and init code. Identical on every
/// chain.
pub fn create2_address(salt: H256, init_code: &Bytes) -> Address {
    get_create2_address_from_hash(*CREATE2_FACTORY, salt, keccak256(init_code))
}

/// Makes sure the CREATE2 factory exists on the handle's chain,
/// replaying its presigned deployment transaction if it doesn't.
pub async fn ensure_create2_factory(
    handle: &ChainHandle,
    client: &Arc<ChainClient>,
) -> Result<Address> {
    let factory = *CREATE2_FACTORY;
    let code = client.get_code(factory, None).await?;
    if !code.is_empty() {
        return Ok(factory);
    }

    info!(
        chain_id = handle.chain_id(),
        "installing CREATE2 factory at {factory:?}"
    );

    // The presigned transaction spends from the one-time deployer, so
    // that account has to hold enough to cover it first.
    let deployer = *CREATE2_FACTORY_DEPLOYER;
    let balance = client.get_balance(deployer, None).await?;
    if balance < *CREATE2_FACTORY_FUNDING {
        let funding = TransactionRequest::pay(deployer, *CREATE2_FACTORY_FUNDING - balance);
        client
            .send_transaction(funding, None)
            .await?
            .await?
            .ok_or_else(|| eyre::eyre!("factory funding transaction was dropped"))?;
    }

    handle
        .provider()
        .send_raw_transaction(CREATE2_FACTORY_DEPLOYMENT_TX.clone())
        .await
        .wrap_err("couldn't broadcast the CREATE2 factory deployment transaction")?
        .await?;

    let code = client.get_code(factory, None).await?;
    if code.is_empty() {
        bail!("CREATE2 factory deployment left no code at {factory:?}");
    }
    Ok(factory)
}

/// Deploys `init_code` through the factory. Returns the deployment
/// address and, unless the contract was already there, the transaction
/// hash.
pub async fn deploy_create2(
    handle: &ChainHandle,
    client: &Arc<ChainClient>,
    salt: H256,
    init_code: &Bytes,
) -> Result<(Address, Option<H256>)> {
    let expected = create2_address(salt, init_code);

    let existing = client.get_code(expected, None).await?;
    if !existing.is_empty() {
        info!(
            chain_id = handle.chain_id(),
            "contract already deployed at {expected:?}, skipping"
        );
        return Ok((expected, None));
    }

    let factory = ensure_create2_factory(handle, client).await?;

    // The factory's calldata is simply the 32-byte salt followed by
    // the init code.
    let mut calldata = salt.as_bytes().to_vec();
    calldata.extend_from_slice(init_code);
    let tx = TransactionRequest::new()
        .to(factory)
        .data(Bytes::from(calldata));

    let receipt = client
        .send_transaction(tx, None)
        .await?
        .await?
        .ok_or_else(|| eyre::eyre!("CREATE2 deployment transaction was dropped"))?;
    if receipt.status != Some(1u64.into()) {
        bail!("CREATE2 deployment reverted in {:?}", receipt.transaction_hash);
    }

    let code = client.get_code(expected, None).await?;
    if code.is_empty() {
        bail!("CREATE2 deployment left no code at {expected:?}");
    }

    Ok((expected, Some(receipt.transaction_hash)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_salt_is_deterministic() {
        assert_eq!(
            deployment_salt("chainweb-scaffold-v1"),
            deployment_salt("chainweb-scaffold-v1")
        );
        assert_ne!(deployment_salt("a"), deployment_salt("b"));
    }

    #[test]
    fn test_create2_address_matches_manual_formula() {
        let salt = deployment_salt("test-salt");
        let init_code = Bytes::from_static(b"\x60\x01\x60\x01\x01");

        // address = last 20 bytes of
        // keccak256(0xff ++ factory ++ salt ++ keccak256(init_code))
        let mut preimage = vec![0xffu8];
        preimage.extend_from_slice(CREATE2_FACTORY.as_bytes());
        preimage.extend_from_slice(salt.as_bytes());
        preimage.extend_from_slice(&keccak256(&init_code));
        let expected = Address::from_slice(&keccak256(&preimage)[12..]);

        assert_eq!(create2_address(salt, &init_code), expected);
    }

    #[test]
    fn test_address_depends_on_salt_and_init_code() {
        let init_code = Bytes::from_static(b"\x60\x00");
        let other_code = Bytes::from_static(b"\x60\x01");
        let a = create2_address(deployment_salt("x"), &init_code);
        let b = create2_address(deployment_salt("y"), &init_code);
        let c = create2_address(deployment_salt("x"), &other_code);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
