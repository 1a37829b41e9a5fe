//! The remote deployment helper. Spawned by `deploy` with the
//! resolved deployer key in its environment; deploys through the
//! CREATE2 factory so the contract lands at the same address on every
//! testnet chain, then submits source verification to each chain's
//! explorer.

use std::path::PathBuf;

use chainweb_deploy::{
    artifacts::ContractArtifact,
    config::{EnvConfig, RUNTIME_DEPLOYER_KEY_VAR},
    create2::deployment_salt,
    deploy::{deploy_on_chains, successful, DeployMode},
    deployments::{write_deployed_contracts, DEFAULT_DEPLOYMENTS_FILE},
    init_tracing,
    verify::{verify_deployments, VerifySettings},
};
use chainweb_chains::ChainwebEnvironment;
use clap::Parser;
use ethers::signers::{LocalWallet, Signer};
use eyre::{bail, Result, WrapErr};
use tracing::info;

#[derive(Parser)]
#[command(about = "Deploy a contract across the Chainweb EVM testnet chains")]
struct RemoteDeployment {
    /// Path to the compiled contract artifact JSON.
    #[arg(long)]
    contract: PathBuf,

    /// A constructor argument; repeat once per argument, in order.
    #[arg(long = "constructor-arg")]
    constructor_args: Vec<String>,

    /// The label the CREATE2 salt is derived from.
    #[arg(long, default_value = "chainweb-scaffold-v1")]
    salt: String,

    /// Where to record the deployed addresses.
    #[arg(long, default_value = DEFAULT_DEPLOYMENTS_FILE)]
    deployments_file: PathBuf,

    /// A solc standard JSON input file; when given, source
    /// verification is submitted after deployment.
    #[arg(long)]
    verify_sources: Option<PathBuf>,

    /// The fully qualified contract name for verification, e.g.
    /// `contracts/TestToken.sol:TestToken`. Derived from the artifact
    /// when omitted.
    #[arg(long)]
    verify_name: Option<String>,

    /// The solc long version used for verification.
    #[arg(long, default_value = "v0.8.28+commit.7893614a")]
    compiler_version: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = RemoteDeployment::parse();
    let config = EnvConfig::load()?;

    let key = match std::env::var(RUNTIME_DEPLOYER_KEY_VAR) {
        Ok(key) => key,
        Err(_) => config
            .deployer_private_key
            .clone()
            .ok_or_else(|| eyre::eyre!("no deployer key in the environment"))?,
    };
    let wallet: LocalWallet = key
        .trim_start_matches("0x")
        .parse()
        .wrap_err("the deployer key is not a valid private key")?;
    info!("deploying from {:?}", wallet.address());

    let artifact = ContractArtifact::load(&args.contract)?;
    let chains = ChainwebEnvironment::Testnet.chains();
    let salt = deployment_salt(&args.salt);

    let deployments = deploy_on_chains(
        &chains,
        &wallet,
        &artifact,
        &args.constructor_args,
        DeployMode::Create2 { salt },
    )
    .await?;
    write_deployed_contracts(&args.deployments_file, &artifact.contract_name, &deployments)?;

    let succeeded = successful(&deployments).len();
    info!(
        "deployed {} on {succeeded}/{} chains, addresses written to {}",
        artifact.contract_name,
        chains.len(),
        args.deployments_file.display()
    );
    if succeeded == 0 {
        bail!("deployment failed on every chain");
    }

    if let Some(sources) = &args.verify_sources {
        let standard_json_input = std::fs::read_to_string(sources)
            .wrap_err_with(|| format!("couldn't read {}", sources.display()))?;
        let settings = VerifySettings {
            contract_name: args.verify_name.clone().unwrap_or_else(|| {
                format!(
                    "contracts/{0}.sol:{0}",
                    artifact.contract_name
                )
            }),
            compiler_version: args.compiler_version.clone(),
            standard_json_input,
            constructor_args_hex: artifact.encoded_constructor_args(&args.constructor_args)?,
            api_key: config.etherscan_api_key(),
        };
        let verified = verify_deployments(
            &chains,
            &deployments,
            &settings,
            config.verification_delay(),
        )
        .await?;
        info!("verification submitted on {verified}/{succeeded} chains");
    }

    Ok(())
}
