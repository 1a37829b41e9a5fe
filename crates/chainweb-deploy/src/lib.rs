//! Deployment and verification tooling for the Kadena Chainweb EVM
//! networks: a CREATE2-based multi-chain deployer, a per-chain block
//! explorer verifier, and the local/remote dispatch machinery that
//! keeps deployer credentials out of long-lived process state.
#[macro_use]
extern crate lazy_static;

pub mod artifacts;
pub mod chain;
pub mod config;
pub mod constants;
pub mod create2;
pub mod credentials;
pub mod deploy;
pub mod deployments;
pub mod dispatch;
pub mod verify;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber for the binaries. Defaults
/// to `info` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}
