//! Source verification against the per-chain Blockscout explorers.
//!
//! Each testnet chain runs its own etherscan-compatible explorer, so
//! verification is submitted once per chain that has a deployment and
//! an explorer.

use std::{collections::HashMap, time::Duration};

use chainweb_chains::ChainDescriptor;
use eyre::{bail, Result, WrapErr};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::deploy::ChainDeployment;

/// Everything needed to verify one contract's source, shared across
/// chains.
#[derive(Clone, Debug)]
pub struct VerifySettings {
    /// Fully qualified name, e.g. `contracts/TestToken.sol:TestToken`.
    pub contract_name: String,
    /// Solc long version, e.g. `v0.8.28+commit.7893614a`.
    pub compiler_version: String,
    /// The solc standard JSON input the contract was compiled from.
    pub standard_json_input: String,
    /// ABI-encoded constructor arguments, hex without the 0x prefix.
    pub constructor_args_hex: String,
    pub api_key: String,
}

// Field names follow the etherscan API, including its misspelled
// `constructorArguements` parameter.
#[derive(Debug, Serialize)]
struct VerifyForm<'a> {
    module: &'static str,
    action: &'static str,
    codeformat: &'static str,
    apikey: &'a str,
    contractaddress: String,
    #[serde(rename = "sourceCode")]
    source_code: &'a str,
    contractname: &'a str,
    compilerversion: &'a str,
    #[serde(rename = "constructorArguements")]
    constructor_arguments: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    status: String,
    message: String,
    result: serde_json::Value,
}

/// Submits verification for every chain that has both a successful
/// deployment and an explorer. Returns how many submissions were
/// accepted; chains that fail are logged and skipped.
pub async fn verify_deployments(
    chains: &[ChainDescriptor],
    deployments: &[ChainDeployment],
    settings: &VerifySettings,
    delay: Duration,
) -> Result<usize> {
    let by_chain: HashMap<u64, &ChainDeployment> = deployments
        .iter()
        .map(|deployment| (deployment.chain_id, deployment))
        .collect();

    let http = reqwest::Client::new();
    let mut verified = 0;
    for descriptor in chains {
        let Some(deployment) = by_chain.get(&descriptor.chain_id) else {
            continue;
        };
        let Some(address) = deployment.deployed_address() else {
            info!(
                chain_id = descriptor.chain_id,
                "skipping verification, deployment failed on this chain"
            );
            continue;
        };
        let Some(api_url) = descriptor.explorer_api_url() else {
            info!(
                chain_id = descriptor.chain_id,
                "skipping verification, no explorer for this chain"
            );
            continue;
        };

        // Give the explorer's indexer a moment to pick the deployment
        // up before asking it to verify.
        sleep(delay).await;

        info!(
            chain_id = descriptor.chain_id,
            "verifying {} at {address:?}", settings.contract_name
        );
        match submit_verification(&http, &api_url, &format!("{address:?}"), settings).await {
            Ok(guid) => {
                info!(chain_id = descriptor.chain_id, "verification submitted: {guid}");
                verified += 1;
            }
            Err(error) => {
                warn!(
                    chain_id = descriptor.chain_id,
                    "verification failed: {error:#}"
                );
            }
        }
    }
    Ok(verified)
}

async fn submit_verification(
    http: &reqwest::Client,
    api_url: &str,
    address: &str,
    settings: &VerifySettings,
) -> Result<String> {
    let form = VerifyForm {
        module: "contract",
        action: "verifysourcecode",
        codeformat: "solidity-standard-json-input",
        apikey: &settings.api_key,
        contractaddress: address.to_string(),
        source_code: &settings.standard_json_input,
        contractname: &settings.contract_name,
        compilerversion: &settings.compiler_version,
        constructor_arguments: &settings.constructor_args_hex,
    };

    let response: VerifyResponse = http
        .post(api_url)
        .form(&form)
        .send()
        .await
        .wrap_err("couldn't reach the explorer API")?
        .json()
        .await
        .wrap_err("the explorer API returned an unexpected response")?;

    if response.status != "1" {
        bail!("explorer rejected verification: {} ({})", response.message, response.result);
    }
    Ok(response.result.as_str().unwrap_or_default().to_string())
}
