//! Chain descriptors for the Kadena Chainweb EVM networks.
//!
//! A Chainweb deployment spans several independently-numbered chains.
//! Every chain's id, RPC URL, and block explorer URL follow directly
//! from its chainweb index and the target environment, so the whole
//! registry is a pure function over `(index, environment)`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// EVM chain ids on the public testnet start here; chainweb index 20
/// maps to chain id 5920.
pub const TESTNET_CHAIN_ID_OFFSET: u64 = 5920;

/// The first chainweb index of the testnet's EVM chains.
pub const TESTNET_INDEX_OFFSET: u32 = 20;

/// The testnet currently exposes five EVM chains (indices 20..=24).
pub const TESTNET_CHAIN_COUNT: u32 = 5;

/// EVM chain ids on a local development node start here; chainweb
/// index 0 maps to chain id 626000.
pub const LOCALHOST_CHAIN_ID_OFFSET: u64 = 626_000;

/// A local development node runs two EVM chains (indices 0..=1).
pub const LOCALHOST_CHAIN_COUNT: u32 = 2;

/// The environment a chain descriptor is derived for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainwebEnvironment {
    Localhost,
    Testnet,
}

impl ChainwebEnvironment {
    /// The statically enumerable chain set for this environment.
    pub fn chains(self) -> Vec<ChainDescriptor> {
        match self {
            Self::Localhost => (0..LOCALHOST_CHAIN_COUNT)
                .map(|index| ChainDescriptor::new(index, self))
                .collect(),
            Self::Testnet => (TESTNET_INDEX_OFFSET..TESTNET_INDEX_OFFSET + TESTNET_CHAIN_COUNT)
                .map(|index| ChainDescriptor::new(index, self))
                .collect(),
        }
    }
}

impl fmt::Display for ChainwebEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Localhost => write!(f, "localhost"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for ChainwebEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "localhost" | "hardhat" => Ok(Self::Localhost),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown chainweb environment: {other}")),
        }
    }
}

/// A single Chainweb EVM chain. Immutable once constructed; one per
/// configured chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub chain_id: u64,
    pub chainweb_index: u32,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: Option<String>,
}

impl ChainDescriptor {
    /// Derives the descriptor for the chain at `index` in
    /// `environment`. Pure and deterministic. Valid indices are
    /// 20..=24 on the testnet and 0..=1 on localhost; anything else
    /// has no chain behind it.
    pub fn new(index: u32, environment: ChainwebEnvironment) -> Self {
        match environment {
            ChainwebEnvironment::Testnet => {
                debug_assert!(
                    (TESTNET_INDEX_OFFSET..TESTNET_INDEX_OFFSET + TESTNET_CHAIN_COUNT)
                        .contains(&index),
                    "testnet chainweb indices are {TESTNET_INDEX_OFFSET}..={}",
                    TESTNET_INDEX_OFFSET + TESTNET_CHAIN_COUNT - 1,
                );
                Self {
                    chain_id: TESTNET_CHAIN_ID_OFFSET
                        + u64::from(index - TESTNET_INDEX_OFFSET),
                    chainweb_index: index,
                    name: format!("Kadena Testnet Chain {index}"),
                    rpc_url: format!(
                        "https://evm-testnet.chainweb.com/chainweb/0.0/evm-testnet/chain/{index}/evm/rpc"
                    ),
                    explorer_url: Some(format!(
                        "https://chain-{index}.evm-testnet-blockscout.chainweb.com"
                    )),
                }
            }
            ChainwebEnvironment::Localhost => {
                debug_assert!(
                    index < LOCALHOST_CHAIN_COUNT,
                    "localhost chainweb indices are 0..={}",
                    LOCALHOST_CHAIN_COUNT - 1,
                );
                Self {
                    chain_id: LOCALHOST_CHAIN_ID_OFFSET + u64::from(index),
                    chainweb_index: index,
                    name: format!("Kadena Localhost Chain {index}"),
                    rpc_url: format!("http://127.0.0.1:8545/chain/{index}/evm/rpc"),
                    explorer_url: None,
                }
            }
        }
    }

    /// The etherscan-compatible API endpoint of this chain's block
    /// explorer, when one is configured.
    pub fn explorer_api_url(&self) -> Option<String> {
        self.explorer_url.as_ref().map(|url| format!("{url}/api"))
    }
}
