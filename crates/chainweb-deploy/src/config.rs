use std::time::Duration;

use eyre::Result;
use serde::Deserialize;

/// The environment variable the dispatcher uses to hand the resolved
/// deployer key to the spawned remote deployment process. Runtime
/// only; it is never read from `.env`.
pub const RUNTIME_DEPLOYER_KEY_VAR: &str = "__RUNTIME_DEPLOYER_PRIVATE_KEY";

const DEFAULT_VERIFICATION_DELAY_MS: u64 = 10_000;

/// Environment-derived settings, read once at binary startup.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EnvConfig {
    /// A plaintext deployer private key.
    pub deployer_private_key: Option<String>,
    /// An encrypted JSON wallet; decrypting it prompts for a password.
    pub deployer_private_key_encrypted: Option<String>,
    /// Milliseconds to wait before each chain's verification request
    /// so the explorer has time to index the deployment.
    pub verification_delay: Option<u64>,
    /// Whether the local development chains fork the public testnet.
    pub testnet_forking_enabled: Option<bool>,
    /// Blockscout accepts any non-empty key.
    pub etherscan_api_key: Option<String>,
}

impl EnvConfig {
    /// Loads `.env` (when present) and deserializes the process
    /// environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env::<EnvConfig>()?)
    }

    pub fn verification_delay(&self) -> Duration {
        Duration::from_millis(
            self.verification_delay
                .unwrap_or(DEFAULT_VERIFICATION_DELAY_MS),
        )
    }

    pub fn etherscan_api_key(&self) -> String {
        self.etherscan_api_key
            .clone()
            .unwrap_or_else(|| "abc".to_string())
    }
}
