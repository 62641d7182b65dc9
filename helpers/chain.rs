//! Dev-node RPC helpers

use std::process::Command;

use alloy::{
    eips::BlockNumberOrTag,
    providers::{DynProvider, Provider},
};
use serde_json::Value;
use tracing::info;

use crate::HelperError;

/// Timestamp of the latest block.
pub async fn latest_block_timestamp(provider: &DynProvider) -> Result<u64, HelperError> {
    let block = provider
        .get_block_by_number(BlockNumberOrTag::Latest)
        .await?
        .ok_or(HelperError::MissingBlock)?;
    Ok(block.header.timestamp)
}

/// Advance chain time by `seconds` and mine a block so the new time is visible to calls.
///
/// Uses `evm_increaseTime`/`evm_mine`, which Anvil and Hardhat both serve.
pub async fn increase_time(provider: &DynProvider, seconds: u64) -> Result<(), HelperError> {
    let offset: Value = provider.raw_request("evm_increaseTime".into(), (seconds,)).await?;
    let _: Value = provider.raw_request("evm_mine".into(), Vec::<Value>::new()).await?;
    info!(seconds, %offset, "advanced chain time");
    Ok(())
}

/// Whether `program --version` runs successfully.
pub fn tool_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
