//! The deployed-contracts file, a JSON map from chain id to the
//! address a contract landed at.

use std::{collections::BTreeMap, fs, path::Path};

use ethers::types::{Address, H256};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::deploy::{ChainDeployment, DeploymentOutcome};

pub const DEFAULT_DEPLOYMENTS_FILE: &str = "deployments/deployedContracts.json";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedContract {
    pub contract_name: String,
    pub address: Address,
    pub chainweb_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<H256>,
}

/// Keyed by chain id. A BTreeMap keeps the file diffable between
/// runs.
pub type DeployedContracts = BTreeMap<u64, DeployedContract>;

/// Records the successful deployments, leaving failed chains out of
/// the file.
pub fn write_deployed_contracts(
    path: impl AsRef<Path>,
    contract_name: &str,
    deployments: &[ChainDeployment],
) -> Result<()> {
    let path = path.as_ref();
    let mut contracts = DeployedContracts::new();
    for deployment in deployments {
        if let DeploymentOutcome::Deployed { address, tx_hash } = &deployment.outcome {
            contracts.insert(
                deployment.chain_id,
                DeployedContract {
                    contract_name: contract_name.to_string(),
                    address: *address,
                    chainweb_index: deployment.chainweb_index,
                    tx_hash: *tx_hash,
                },
            );
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("couldn't create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&contracts)?;
    fs::write(path, json).wrap_err_with(|| format!("couldn't write {}", path.display()))?;
    Ok(())
}

pub fn read_deployed_contracts(path: impl AsRef<Path>) -> Result<DeployedContracts> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .wrap_err_with(|| format!("couldn't read {}", path.display()))?;
    let contracts = serde_json::from_str(&json)
        .wrap_err_with(|| format!("couldn't parse {}", path.display()))?;
    Ok(contracts)
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
                    address: Address::repeat_byte(0xaa),
                    tx_hash: Some(H256::repeat_byte(0x01)),
                },
            },
            ChainDeployment {
                chain_id: 5921,
                chainweb_index: 21,
                outcome: DeploymentOutcome::Failed {
                    reason: "rpc unreachable".to_string(),
                },
            },
            ChainDeployment {
                chain_id: 5922,
                chainweb_index: 22,
                outcome: DeploymentOutcome::Deployed {
                    address: Address::repeat_byte(0xaa),
                    tx_hash: None,
                },
            },
        ]
    }

    #[test]
    fn test_round_trip_keeps_successes_only() {
        let dir = std::env::temp_dir().join(format!("chainweb-deployments-{}", std::process::id()));
        let path = dir.join("deployedContracts.json");

        write_deployed_contracts(&path, "TestToken", &sample_deployments()).unwrap();
        let contracts = read_deployed_contracts(&path).unwrap();

        assert_eq!(contracts.len(), 2);
        assert!(contracts.contains_key(&5920));
        assert!(!contracts.contains_key(&5921));
        assert_eq!(contracts[&5922].contract_name, "TestToken");
        assert_eq!(contracts[&5922].chainweb_index, 22);
        assert_eq!(contracts[&5922].tx_hash, None);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_file_is_keyed_by_chain_id() {
        let dir = std::env::temp_dir().join(format!("chainweb-deployments-keys-{}", std::process::id()));
        let path = dir.join("deployedContracts.json");

        write_deployed_contracts(&path, "TestToken", &sample_deployments()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert!(json.get("5920").is_some());
        assert!(json["5920"].get("txHash").is_some());
        assert!(json["5922"].get("txHash").is_none());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
