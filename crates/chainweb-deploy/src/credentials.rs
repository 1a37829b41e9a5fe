//! Deployer key resolution. The decrypted key exists only long enough
//! to be handed to the spawned deployment process; it is never logged
//! or written to disk.

use std::{env, fs};

use ethers::{
    signers::LocalWallet,
    utils::hex,
};
use eyre::{bail, Result, WrapErr};
use tracing::info;

use crate::config::EnvConfig;

/// Where the deployer key will come from, checked before any prompt or
/// network call so a misconfigured run fails immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource {
    /// `DEPLOYER_PRIVATE_KEY_ENCRYPTED`, preferred when both are set.
    Encrypted,
    /// `DEPLOYER_PRIVATE_KEY`.
    Plaintext,
}

pub fn key_source(config: &EnvConfig) -> Result<KeySource> {
    if config.deployer_private_key_encrypted.is_some() {
        Ok(KeySource::Encrypted)
    } else if config.deployer_private_key.is_some() {
        Ok(KeySource::Plaintext)
    } else {
        bail!("no deployer key found: set DEPLOYER_PRIVATE_KEY or DEPLOYER_PRIVATE_KEY_ENCRYPTED")
    }
}

/// Resolves the deployer private key as a hex string. An encrypted
/// wallet takes precedence and prompts for its password; a wrong
/// password is fatal.
pub fn resolve_deployer_key(config: &EnvConfig) -> Result<String> {
    match key_source(config)? {
        KeySource::Encrypted => {
            info!("using encrypted deployer key");
            let blob = config
                .deployer_private_key_encrypted
                .as_deref()
                .unwrap_or_default();
            let password = rpassword::prompt_password("Enter password to decrypt the deployer key: ")?;
            decrypt_keystore_blob(blob, &password)
        }
        KeySource::Plaintext => {
            info!("using plaintext deployer key from the environment");
            Ok(config.deployer_private_key.clone().unwrap_or_default())
        }
    }
}

/// Decrypts an encrypted JSON wallet blob. The keystore machinery only
/// reads from disk, so the still-encrypted blob is staged in a
/// temporary file that is removed on every path; the decrypted key
/// never touches the filesystem.
pub fn decrypt_keystore_blob(blob: &str, password: &str) -> Result<String> {
    let path = env::temp_dir().join(format!("chainweb-deployer-{}.json", std::process::id()));
    fs::write(&path, blob)?;
    let decrypted = LocalWallet::decrypt_keystore(&path, password);
    let _ = fs::remove_file(&path);
    let wallet = decrypted.wrap_err("failed to decrypt the deployer key; wrong password?")?;
    Ok(hex::encode(wallet.signer().to_bytes()))
}
