//! Web3RSVP bindings, compilation and deployment

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    process::Command,
};

use alloy::{
    hex,
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
    sol,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{receipt::ensure_success, HelperError};

sol! {
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    contract Web3RSVP {
        event NewEventCreated(
            bytes32 eventID,
            address creatorAddress,
            uint256 eventTimestamp,
            uint256 maxCapacity,
            uint256 deposit,
            string eventDataCID
        );
        event NewRSVP(bytes32 eventID, address attendeeAddress);
        event ConfirmedAttendee(bytes32 eventID, address attendeeAddress);
        event DepositsPaidOut(bytes32 eventID);

        function createNewEvent(
            uint256 eventTimestamp,
            uint256 deposit,
            uint256 maxCapacity,
            string calldata eventDataCID
        ) external;
        function createNewRSVP(bytes32 eventId) external payable;
        function confirmAllAttendees(bytes32 eventId) external;
        function confirmAttendee(bytes32 eventId, address attendee) public;
        function withdrawUnclaimedDeposits(bytes32 eventId) external;
    }
}

pub const CONTRACT_NAME: &str = "Web3RSVP";

/// Location of the contract source inside this workspace.
pub fn default_contract_source() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../contracts/web3-rsvp/Web3RSVP.sol")
}

#[derive(Deserialize)]
struct CombinedJson {
    contracts: BTreeMap<String, CombinedContract>,
}

#[derive(Deserialize)]
struct CombinedContract {
    bin: String,
}

/// Compile `source` with `solc` and return the creation bytecode of `Web3RSVP`.
pub fn build_contract(solc: &str, source: &Path) -> Result<Bytes, HelperError> {
    info!(solc, source = %source.display(), "compiling contract");
    let output = Command::new(solc)
        .args(["--combined-json", "abi,bin", "--optimize"])
        .arg(source)
        .output()
        .map_err(|source| HelperError::SolcLaunch {
            solc: solc.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(HelperError::SolcFailed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    bytecode_from_combined_json(&output.stdout, source)
}

fn bytecode_from_combined_json(stdout: &[u8], source: &Path) -> Result<Bytes, HelperError> {
    let combined: CombinedJson = serde_json::from_slice(stdout)?;
    let suffix = format!(":{CONTRACT_NAME}");
    let contract = combined
        .contracts
        .into_iter()
        .find_map(|(name, contract)| name.ends_with(&suffix).then_some(contract))
        .ok_or_else(|| HelperError::ArtifactMissing {
            contract: CONTRACT_NAME.to_string(),
            path: source.to_path_buf(),
        })?;
    decode_bytecode(&contract.bin)
}

/// Load creation bytecode from a file.
///
/// Accepts a plain hex file, a Hardhat artifact (`"bytecode": "0x.."`) or a Foundry
/// artifact (`"bytecode": {"object": "0x.."}`).
pub fn load_bytecode(path: &Path) -> Result<Bytes, HelperError> {
    let contents = std::fs::read_to_string(path).map_err(|source| HelperError::BytecodeRead {
        path: path.to_path_buf(),
        source,
    })?;
    let contents = contents.trim();

    if !contents.starts_with('{') {
        return decode_bytecode(contents);
    }

    let artifact: serde_json::Value = serde_json::from_str(contents)?;
    let bytecode = match &artifact["bytecode"] {
        serde_json::Value::String(code) => Some(code.as_str()),
        serde_json::Value::Object(object) => object.get("object").and_then(|o| o.as_str()),
        _ => None,
    };
    match bytecode {
        Some(code) => decode_bytecode(code),
        None => Err(HelperError::ArtifactMissing {
            contract: CONTRACT_NAME.to_string(),
            path: path.to_path_buf(),
        }),
    }
}

fn decode_bytecode(code: &str) -> Result<Bytes, HelperError> {
    let bytes = hex::decode(code.trim())?;
    if bytes.is_empty() {
        return Err(HelperError::EmptyBytecode);
    }
    Ok(bytes.into())
}

/// Send a creation transaction from `deployer` and wait for the contract address.
pub async fn deploy_contract(
    provider: &DynProvider,
    deployer: Address,
    bytecode: Bytes,
) -> Result<Address, HelperError> {
    debug!(%deployer, size = bytecode.len(), "sending deployment transaction");
    let tx = TransactionRequest::default()
        .with_from(deployer)
        .with_deploy_code(bytecode);
    let receipt = provider.send_transaction(tx).await?.get_receipt().await?;
    ensure_success(&receipt)?;

    receipt
        .contract_address
        .ok_or(HelperError::MissingContractAddress(receipt.transaction_hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_contract_from_combined_json() {
        let stdout = br#"{
            "contracts": {
                "contracts/Other.sol:Other": {"abi": [], "bin": "00"},
                "contracts/web3-rsvp/Web3RSVP.sol:Web3RSVP": {"abi": [], "bin": "6080604052"}
            },
            "version": "0.8.26"
        }"#;
        let code = bytecode_from_combined_json(stdout, Path::new("Web3RSVP.sol")).unwrap();
        assert_eq!(code.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);
    }

    #[test]
    fn missing_contract_in_combined_json() {
        let stdout = br#"{"contracts": {"a.sol:Other": {"bin": "00"}}}"#;
        let err = bytecode_from_combined_json(stdout, Path::new("a.sol")).unwrap_err();
        assert!(matches!(err, HelperError::ArtifactMissing { .. }));
    }

    #[test]
    fn empty_bytecode_is_rejected() {
        assert!(matches!(decode_bytecode("0x"), Err(HelperError::EmptyBytecode)));
        assert!(matches!(decode_bytecode("zz"), Err(HelperError::InvalidBytecode(_))));
    }

    #[test]
    fn loads_hex_and_artifacts() {
        let dir = std::env::temp_dir().join(format!("rsvp-bytecode-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let plain = dir.join("Web3RSVP.bin");
        std::fs::write(&plain, "0x6080\n").unwrap();
        assert_eq!(load_bytecode(&plain).unwrap().as_ref(), &[0x60, 0x80]);

        let hardhat = dir.join("hardhat.json");
        std::fs::write(&hardhat, r#"{"contractName": "Web3RSVP", "bytecode": "0x6080"}"#).unwrap();
        assert_eq!(load_bytecode(&hardhat).unwrap().as_ref(), &[0x60, 0x80]);

        let foundry = dir.join("foundry.json");
        std::fs::write(&foundry, r#"{"bytecode": {"object": "0x6080", "linkReferences": {}}}"#)
            .unwrap();
        assert_eq!(load_bytecode(&foundry).unwrap().as_ref(), &[0x60, 0x80]);

        let broken = dir.join("broken.json");
        std::fs::write(&broken, r#"{"abi": []}"#).unwrap();
        assert!(matches!(load_bytecode(&broken), Err(HelperError::ArtifactMissing { .. })));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_bytecode_file() {
        let err = load_bytecode(Path::new("/nonexistent/Web3RSVP.bin")).unwrap_err();
        assert!(matches!(err, HelperError::BytecodeRead { .. }));
    }

    #[test]
    fn default_source_exists() {
        assert!(default_contract_source().is_file());
    }
}
