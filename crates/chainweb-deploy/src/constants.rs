use ethers::types::{Address, Bytes, U256};

lazy_static! {
    // The deterministic deployment proxy (the same scheme foundry and
    // hardhat-deploy rely on). The factory lands at the same address
    // on every chain because it is created by a presigned transaction
    // from a one-time-use key, independent of any deployer's nonce.
    pub static ref CREATE2_FACTORY: Address = "0x4e59b44847b379578588920cA78FbF26c0B4956C"
        .parse()
        .unwrap();

    // The one-time-use account that signed the factory deployment
    // transaction. It has to hold enough to cover the transaction's
    // fixed gas before the raw transaction is broadcast.
    pub static ref CREATE2_FACTORY_DEPLOYER: Address = "0x3fAB184622Dc19b6109349B94811493BF2a45362"
        .parse()
        .unwrap();

    // The presigned factory deployment transaction (legacy,
    // pre-EIP-155 so that the same bytes are valid on every chain).
    pub static ref CREATE2_FACTORY_DEPLOYMENT_TX: Bytes =
        "0xf8a58085174876e800830186a08080b853604580600e600d39f33660008181823780368234f58015156014578182fd5b80825250506014600cf31ba02222222222222222222222222222222222222222222222222222222222222222a02222222222222222222222222222222222222222222222222222222222222222"
            .parse()
            .unwrap();

    // 100k gas at 100 gwei: the exact cost of the presigned
    // transaction.
    pub static ref CREATE2_FACTORY_FUNDING: U256 = U256::from(10_000_000_000_000_000u64);
}
