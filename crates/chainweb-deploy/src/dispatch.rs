//! Routing a deployment to the local node or to the remote helper
//! process.
//!
//! Remote deployments run in a child process so that the decrypted
//! deployer key only ever lives in that child's environment. The
//! parent resolves the key, hands it over through a private variable,
//! and forgets it when the child exits.

use std::process::Stdio;

use eyre::{Result, WrapErr};
use tokio::process::Command;
use tracing::info;

use crate::config::RUNTIME_DEPLOYER_KEY_VAR;

/// Whether the network name refers to the local development node.
pub fn is_local_network(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("hardhat") || name.contains("localhost")
}

/// Remote deployments only ever target testnets. Anything that isn't
/// explicitly a testnet is refused rather than guessed at.
pub fn is_testnet_network(name: &str) -> bool {
    name.to_ascii_lowercase().contains("testnet")
}

/// Runs the `remote_deployment` binary next to the current executable
/// with the deployer key in its environment, and returns its exit
/// code.
pub async fn spawn_remote_deployment(deployer_key: &str, args: &[String]) -> Result<i32> {
    let helper = std::env::current_exe()
        .wrap_err("couldn't locate the current executable")?
        .with_file_name("remote_deployment");

    info!("handing off to {}", helper.display());
    let status = Command::new(&helper)
        .args(args)
        .env(RUNTIME_DEPLOYER_KEY_VAR, deployer_key)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .wrap_err_with(|| format!("couldn't run {}", helper.display()))?;

    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_network_detection() {
        assert!(is_local_network("hardhat"));
        assert!(is_local_network("localhost"));
        assert!(is_local_network("chainweb_localhost"));
        assert!(!is_local_network("testnet"));
        assert!(!is_local_network("mainnet"));
    }

    #[test]
    fn test_testnet_network_detection() {
        assert!(is_testnet_network("testnet"));
        assert!(is_testnet_network("chainweb_testnet"));
        assert!(is_testnet_network("evm-testnet"));
        assert!(!is_testnet_network("mainnet"));
        assert!(!is_testnet_network("localhost"));
    }
}
