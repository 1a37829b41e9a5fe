//! The deployment entrypoint. Local networks are deployed in-process
//! from a prefunded development account; everything else is handed to
//! the `remote_deployment` helper with the resolved deployer key in
//! its environment.

use std::path::PathBuf;

use chainweb_deploy::{
    artifacts::ContractArtifact,
    chain::dev_wallet,
    config::EnvConfig,
    credentials::resolve_deployer_key,
    deploy::{deploy_on_chains, successful, DeployMode},
    deployments::{write_deployed_contracts, DEFAULT_DEPLOYMENTS_FILE},
    dispatch::{is_local_network, is_testnet_network, spawn_remote_deployment},
    init_tracing,
};
use chainweb_chains::ChainwebEnvironment;
use clap::Parser;
use eyre::{bail, Result};
use tracing::info;

#[derive(Parser)]
#[command(about = "Deploy a contract across every chain of a Chainweb EVM network")]
struct Deploy {
    /// The target network name, e.g. `localhost` or `testnet`.
    #[arg(long, default_value = "testnet")]
    network: String,

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

    /// A solc standard JSON input file; when given, remote deployments
    /// also submit source verification. Ignored on local networks.
    #[arg(long)]
    verify_sources: Option<PathBuf>,

    /// The solc long version used for verification.
    #[arg(long, default_value = "v0.8.28+commit.7893614a")]
    compiler_version: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Deploy::parse();
    let config = EnvConfig::load()?;

    if is_local_network(&args.network) {
        return deploy_local(&args, &config).await;
    }

    // Resolve the credential first so a bad password or a missing key
    // fails before anything else happens.
    let deployer_key = resolve_deployer_key(&config)?;
    if !is_testnet_network(&args.network) {
        bail!(
            "refusing to deploy to `{}`: remote deployments only target testnet networks",
            args.network
        );
    }

    let mut forwarded = vec![
        "--contract".to_string(),
        args.contract.display().to_string(),
        "--salt".to_string(),
        args.salt.clone(),
        "--deployments-file".to_string(),
        args.deployments_file.display().to_string(),
    ];
    for constructor_arg in &args.constructor_args {
        forwarded.push("--constructor-arg".to_string());
        forwarded.push(constructor_arg.clone());
    }
    if let Some(sources) = &args.verify_sources {
        forwarded.push("--verify-sources".to_string());
        forwarded.push(sources.display().to_string());
        forwarded.push("--compiler-version".to_string());
        forwarded.push(args.compiler_version.clone());
    }

    let code = spawn_remote_deployment(&deployer_key, &forwarded).await?;
    std::process::exit(code);
}

async fn deploy_local(args: &Deploy, config: &EnvConfig) -> Result<()> {
    if config.testnet_forking_enabled.unwrap_or(false) {
        info!("local chains are forking the public testnet");
    }

    let artifact = ContractArtifact::load(&args.contract)?;
    let chains = ChainwebEnvironment::Localhost.chains();
    let wallet = dev_wallet(0)?;

    let deployments = deploy_on_chains(
        &chains,
        &wallet,
        &artifact,
        &args.constructor_args,
        DeployMode::Direct,
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
    Ok(())
}
