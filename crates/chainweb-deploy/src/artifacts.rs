//! Compiled contract artifacts and constructor-argument encoding.

use std::{fs::File, path::Path};

use ethers::{
    abi::{self, Abi, Constructor, ParamType, Token},
    types::{Bytes, I256, U256},
    utils::hex,
};
use eyre::{bail, Result, WrapErr};
use serde::Deserialize;

/// A compiled contract in the Hardhat/Foundry artifact format. Only
/// the fields the deployer needs are kept.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: Abi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .wrap_err_with(|| format!("couldn't open contract artifact {}", path.display()))?;
        let artifact = serde_json::from_reader(file)
            .wrap_err_with(|| format!("couldn't parse contract artifact {}", path.display()))?;
        Ok(artifact)
    }

    /// The complete init code: creation bytecode followed by the
    /// ABI-encoded constructor arguments.
    pub fn init_code(&self, args: &[String]) -> Result<Bytes> {
        match self.abi.constructor() {
            None if args.is_empty() => Ok(self.bytecode.clone()),
            None => bail!(
                "{} has no constructor but {} argument(s) were provided",
                self.contract_name,
                args.len()
            ),
            Some(constructor) => {
                let tokens = parse_constructor_args(constructor, args)?;
                let code = constructor.encode_input(self.bytecode.to_vec(), &tokens)?;
                Ok(code.into())
            }
        }
    }

    /// Hex encoding of just the ABI-encoded constructor arguments, the
    /// form the explorer verification API expects.
    pub fn encoded_constructor_args(&self, args: &[String]) -> Result<String> {
        match self.abi.constructor() {
            None => Ok(String::new()),
            Some(_) if args.is_empty() => Ok(String::new()),
            Some(constructor) => {
                let tokens = parse_constructor_args(constructor, args)?;
                Ok(hex::encode(abi::encode(&tokens)))
            }
        }
    }
}

/// Parses CLI argument strings against the constructor's declared
/// input types.
fn parse_constructor_args(constructor: &Constructor, args: &[String]) -> Result<Vec<Token>> {
    if constructor.inputs.len() != args.len() {
        bail!(
            "constructor takes {} argument(s) but {} were provided",
            constructor.inputs.len(),
            args.len()
        );
    }
    constructor
        .inputs
        .iter()
        .zip(args)
        .map(|(input, arg)| {
            parse_token(&input.kind, arg)
                .wrap_err_with(|| format!("couldn't parse constructor argument `{}`", input.name))
        })
        .collect()
}

fn parse_token(kind: &ParamType, arg: &str) -> Result<Token> {
    match kind {
        ParamType::Address => Ok(Token::Address(arg.parse()?)),
        ParamType::Uint(_) => {
            let value = match arg.strip_prefix("0x") {
                Some(hex_digits) => U256::from_str_radix(hex_digits, 16)?,
                None => U256::from_dec_str(arg)?,
            };
            Ok(Token::Uint(value))
        }
        ParamType::Int(_) => Ok(Token::Int(I256::from_dec_str(arg)?.into_raw())),
        ParamType::Bool => Ok(Token::Bool(arg.parse()?)),
        ParamType::String => Ok(Token::String(arg.to_string())),
        ParamType::Bytes => Ok(Token::Bytes(arg.parse::<Bytes>()?.to_vec())),
        ParamType::FixedBytes(size) => {
            let bytes = arg.parse::<Bytes>()?.to_vec();
            if bytes.len() != *size {
                bail!("expected {size} bytes, got {}", bytes.len());
            }
            Ok(Token::FixedBytes(bytes))
        }
        other => bail!("unsupported constructor argument type: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_artifact() -> ContractArtifact {
        serde_json::from_str(
            r#"{
                "contractName": "TestToken",
                "abi": [
                    {
                        "type": "constructor",
                        "stateMutability": "nonpayable",
                        "inputs": [
                            { "name": "name", "type": "string" },
                            { "name": "symbol", "type": "string" },
                            { "name": "supply", "type": "uint256" }
                        ]
                    }
                ],
                "bytecode": "0x60806040"
            }"#,
        )
        .unwrap()
    }

    fn bare_artifact() -> ContractArtifact {
        serde_json::from_str(
            r#"{ "contractName": "RentalManager", "abi": [], "bytecode": "0x6001600101" }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_init_code_appends_encoded_args() {
        let artifact = token_artifact();
        let args = vec![
            "TestToken".to_string(),
            "TTK".to_string(),
            "1000000".to_string(),
        ];
        let init_code = artifact.init_code(&args).unwrap();
        assert!(init_code.starts_with(&artifact.bytecode));
        assert!(init_code.len() > artifact.bytecode.len());

        let encoded = artifact.encoded_constructor_args(&args).unwrap();
        assert_eq!(
            hex::encode(&init_code[artifact.bytecode.len()..]),
            encoded
        );
    }

    #[test]
    fn test_init_code_without_constructor() {
        let artifact = bare_artifact();
        assert_eq!(artifact.init_code(&[]).unwrap(), artifact.bytecode);
        assert_eq!(artifact.encoded_constructor_args(&[]).unwrap(), "");
        assert!(artifact.init_code(&["oops".to_string()]).is_err());
    }

    #[test]
    fn test_arity_mismatch_is_rejected() {
        let artifact = token_artifact();
        let err = artifact.init_code(&["TestToken".to_string()]).unwrap_err();
        assert!(err.to_string().contains("3 argument(s)"));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let artifact = token_artifact();
        let args = vec![
            "TestToken".to_string(),
            "TTK".to_string(),
            "not-a-number".to_string(),
        ];
        assert!(artifact.init_code(&args).is_err());
    }

    #[test]
    fn test_string_encoding() {
        let artifact: ContractArtifact = serde_json::from_str(
            r#"{
                "contractName": "Named",
                "abi": [
                    {
                        "type": "constructor",
                        "stateMutability": "nonpayable",
                        "inputs": [{ "name": "name", "type": "string" }]
                    }
                ],
                "bytecode": "0x00"
            }"#,
        )
        .unwrap();
        let encoded = artifact
            .encoded_constructor_args(&["Hello".to_string()])
            .unwrap();
        assert_eq!(
            encoded,
            concat!(
                "0000000000000000000000000000000000000000000000000000000000000020",
                "0000000000000000000000000000000000000000000000000000000000000005",
                "48656c6c6f000000000000000000000000000000000000000000000000000000",
            )
        );
    }

    #[test]
    fn test_parse_token_types() {
        assert_eq!(
            parse_token(&ParamType::Uint(256), "0x10").unwrap(),
            Token::Uint(U256::from(16))
        );
        assert_eq!(
            parse_token(&ParamType::Bool, "true").unwrap(),
            Token::Bool(true)
        );
        assert!(matches!(
            parse_token(
                &ParamType::Address,
                "0xaD4B53644dC37B4c18A0e66882ebB7e47a4f5eD0"
            )
            .unwrap(),
            Token::Address(_)
        ));
        assert!(parse_token(&ParamType::FixedBytes(32), "0x01").is_err());
        assert!(parse_token(&ParamType::Array(Box::new(ParamType::Bool)), "[]").is_err());
    }
}
