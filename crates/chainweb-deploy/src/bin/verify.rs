//! Standalone source verification for contracts that are already
//! deployed, driven by the deployed-contracts file or an explicit
//! address.

use std::path::PathBuf;

use chainweb_deploy::{
    config::EnvConfig,
    deploy::{ChainDeployment, DeploymentOutcome},
    deployments::{read_deployed_contracts, DEFAULT_DEPLOYMENTS_FILE},
    init_tracing,
    verify::{verify_deployments, VerifySettings},
};
use chainweb_chains::ChainwebEnvironment;
use clap::Parser;
use ethers::types::Address;
use eyre::{bail, Result, WrapErr};
use tracing::info;

#[derive(Parser)]
#[command(about = "Verify contract sources on every chain's block explorer")]
struct Verify {
    /// Fully qualified contract name, e.g.
    /// `contracts/TestToken.sol:TestToken`.
    #[arg(long)]
    contract_name: String,

    /// A solc standard JSON input file.
    #[arg(long)]
    sources: PathBuf,

    /// The solc long version the contract was compiled with.
    #[arg(long, default_value = "v0.8.28+commit.7893614a")]
    compiler_version: String,

    /// ABI-encoded constructor arguments as hex, without the 0x
    /// prefix.
    #[arg(long, default_value = "")]
    constructor_args_hex: String,

    /// The deployed-contracts file to take addresses from.
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_FILE)]
    deployments_file: PathBuf,

    /// Verify this address on every chain instead of reading the
    /// deployed-contracts file.
    #[arg(long, conflicts_with = "deployments_file")]
    address: Option<Address>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Verify::parse();
    let config = EnvConfig::load()?;

    let chains = ChainwebEnvironment::Testnet.chains();
    let deployments: Vec<ChainDeployment> = match args.address {
        // A CREATE2 deployment lives at the same address everywhere,
        // so one address covers the whole chain set.
        Some(address) => chains
            .iter()
            .map(|descriptor| ChainDeployment {
                chain_id: descriptor.chain_id,
                chainweb_index: descriptor.chainweb_index,
                outcome: DeploymentOutcome::Deployed {
                    address,
                    tx_hash: None,
                },
            })
            .collect(),
        None => {
            let contracts = read_deployed_contracts(&args.deployments_file)?;
            if contracts.is_empty() {
                bail!("{} records no deployments", args.deployments_file.display());
            }
            contracts
                .into_iter()
                .map(|(chain_id, contract)| ChainDeployment {
                    chain_id,
                    chainweb_index: contract.chainweb_index,
                    outcome: DeploymentOutcome::Deployed {
                        address: contract.address,
                        tx_hash: contract.tx_hash,
                    },
                })
                .collect()
        }
    };

    let standard_json_input = std::fs::read_to_string(&args.sources)
        .wrap_err_with(|| format!("couldn't read {}", args.sources.display()))?;
    let settings = VerifySettings {
        contract_name: args.contract_name.clone(),
        compiler_version: args.compiler_version.clone(),
        standard_json_input,
        constructor_args_hex: args.constructor_args_hex.clone(),
        api_key: config.etherscan_api_key(),
    };

    let verified = verify_deployments(
        &chains,
        &deployments,
        &settings,
        config.verification_delay(),
    )
    .await?;
    info!("verification submitted on {verified}/{} chains", deployments.len());
    if verified == 0 {
        bail!("verification failed on every chain");
    }
    Ok(())
}
