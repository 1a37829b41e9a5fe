//! Fanning a single contract deployment out across every chain of a
//! Chainweb environment.

use chainweb_chains::ChainDescriptor;
use ethers::{
    providers::Middleware,
    signers::LocalWallet,
    types::{Address, Bytes, TransactionRequest, H256},
};
use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    artifacts::ContractArtifact,
    chain::ChainHandle,
    create2::{self, deploy_create2},
};

/// How a contract gets on chain.
#[derive(Clone, Copy, Debug)]
pub enum DeployMode {
    /// A plain contract-creation transaction. Addresses differ per
    /// chain and per nonce.
    Direct,
    /// Through the CREATE2 factory, giving the same address on every
    /// chain.
    Create2 { salt: H256 },
}

/// What happened on one chain. A deployment either produced an
/// address or it didn't; there is no in-between.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum DeploymentOutcome {
    #[serde(rename_all = "camelCase")]
    Deployed {
        address: Address,
        /// Absent when the contract was already on chain and no
        /// transaction was needed.
        #[serde(skip_serializing_if = "Option::is_none")]
        tx_hash: Option<H256>,
    },
    #[serde(rename_all = "camelCase")]
    Failed { reason: String },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDeployment {
    pub chain_id: u64,
    pub chainweb_index: u32,
    #[serde(flatten)]
    pub outcome: DeploymentOutcome,
}

impl ChainDeployment {
    pub fn deployed_address(&self) -> Option<Address> {
        match self.outcome {
            DeploymentOutcome::Deployed { address, .. } => Some(address),
            DeploymentOutcome::Failed { .. } => None,
        }
    }
}

/// The deployments that produced an address.
pub fn successful(deployments: &[ChainDeployment]) -> Vec<&ChainDeployment> {
    deployments
        .iter()
        .filter(|deployment| deployment.deployed_address().is_some())
        .collect()
}

/// Deploys the artifact on every chain in turn. A failure on one
/// chain is recorded and the loop moves on; the caller decides what a
/// partial result means.
pub async fn deploy_on_chains(
    chains: &[ChainDescriptor],
    wallet: &LocalWallet,
    artifact: &ContractArtifact,
    constructor_args: &[String],
    mode: DeployMode,
) -> Result<Vec<ChainDeployment>> {
    let init_code = artifact.init_code(constructor_args)?;
    if let DeployMode::Create2 { salt } = mode {
        info!(
            "{} will deploy to {:?} on every chain",
            artifact.contract_name,
            create2::create2_address(salt, &init_code)
        );
    }

    let mut deployments = Vec::with_capacity(chains.len());
    for descriptor in chains {
        let outcome = match deploy_on_chain(descriptor, wallet, &init_code, mode).await {
            Ok((address, tx_hash)) => {
                info!(
                    chain_id = descriptor.chain_id,
                    "deployed {} at {address:?}", artifact.contract_name
                );
                DeploymentOutcome::Deployed { address, tx_hash }
            }
            Err(error) => {
                warn!(
                    chain_id = descriptor.chain_id,
                    "deployment of {} failed: {error:#}", artifact.contract_name
                );
                DeploymentOutcome::Failed {
                    reason: format!("{error:#}"),
                }
            }
        };
        deployments.push(ChainDeployment {
            chain_id: descriptor.chain_id,
            chainweb_index: descriptor.chainweb_index,
            outcome,
        });
    }
    Ok(deployments)
}

async fn deploy_on_chain(
    descriptor: &ChainDescriptor,
    wallet: &LocalWallet,
    init_code: &Bytes,
    mode: DeployMode,
) -> Result<(Address, Option<H256>)> {
    let handle = ChainHandle::connect(descriptor)?;
    let client = handle.client(wallet)?;
    match mode {
        DeployMode::Create2 { salt } => {
            deploy_create2(&handle, &client, salt, init_code).await
        }
        DeployMode::Direct => {
            let tx = TransactionRequest::new().data(init_code.clone());
            let receipt = client
                .send_transaction(tx, None)
                .await?
                .await?
                .ok_or_else(|| eyre::eyre!("deployment transaction was dropped"))?;
            if receipt.status != Some(1u64.into()) {
                eyre::bail!("deployment reverted in {:?}", receipt.transaction_hash);
            }
            let address = receipt
                .contract_address
                .ok_or_else(|| eyre::eyre!("deployment receipt carried no contract address"))?;
            Ok((address, Some(receipt.transaction_hash)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_deployments() -> Vec<ChainDeployment> {
        vec![
            ChainDeployment {
                chain_id: 5920,
                chainweb_index: 20,
                outcome: DeploymentOutcome::Deployed {
                    address: Address::repeat_byte(0x11),
                    tx_hash: Some(H256::repeat_byte(0x22)),
                },
            },
            ChainDeployment {
                chain_id: 5921,
                chainweb_index: 21,
                outcome: DeploymentOutcome::Failed {
                    reason: "insufficient funds".to_string(),
                },
            },
            ChainDeployment {
                chain_id: 5922,
                chainweb_index: 22,
                outcome: DeploymentOutcome::Deployed {
                    address: Address::repeat_byte(0x11),
                    tx_hash: None,
                },
            },
        ]
    }

    #[test]
    fn test_successful_filters_failures() {
        let deployments = sample_deployments();
        let successes = successful(&deployments);
        assert_eq!(successes.len(), 2);
        assert!(successes
            .iter()
            .all(|deployment| deployment.deployed_address().is_some()));
    }

    #[tokio::test]
    async fn test_one_chain_failing_does_not_stop_the_run() {
        // Nothing listens on port 9, so every chain fails; the loop
        // must still produce one record per chain, in order.
        let unroutable = |chain_id: u64, chainweb_index: u32| ChainDescriptor {
            chain_id,
            chainweb_index,
            name: format!("Unroutable Chain {chainweb_index}"),
            rpc_url: format!("http://127.0.0.1:9/chain/{chainweb_index}/evm/rpc"),
            explorer_url: None,
        };
        let chains = vec![unroutable(5920, 20), unroutable(5921, 21)];
        let artifact: crate::artifacts::ContractArtifact = serde_json::from_str(
            r#"{ "contractName": "TestToken", "abi": [], "bytecode": "0x6001600101" }"#,
        )
        .unwrap();
        let wallet = crate::chain::dev_wallet(0).unwrap();

        let deployments =
            deploy_on_chains(&chains, &wallet, &artifact, &[], DeployMode::Direct)
                .await
                .unwrap();

        assert_eq!(deployments.len(), chains.len());
        for (deployment, descriptor) in deployments.iter().zip(&chains) {
            assert_eq!(deployment.chain_id, descriptor.chain_id);
            assert!(matches!(
                deployment.outcome,
                DeploymentOutcome::Failed { .. }
            ));
        }
    }

    #[test]
    fn test_outcome_serialization_is_tagged() {
        let deployments = sample_deployments();
        let json = serde_json::to_value(&deployments[0]).unwrap();
        assert_eq!(json["status"], "deployed");
        assert!(json["address"].is_string());

        let json = serde_json::to_value(&deployments[1]).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "insufficient funds");
        assert!(json.get("address").is_none());

        // An already-deployed contract has no transaction hash and the
        // field is omitted entirely.
        let json = serde_json::to_value(&deployments[2]).unwrap();
        assert!(json.get("txHash").is_none());
    }
}
