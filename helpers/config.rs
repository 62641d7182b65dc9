//! Command line and environment configuration for the smoke test.
//!
//! Every flag can also be set through its `RSVP_*` environment variable, which makes a
//! `.env` file next to the workspace enough to point the run at another node.

use std::path::PathBuf;

use alloy::{
    primitives::{
        utils::{parse_ether, Unit},
        Address, U256,
    },
    transports::http::reqwest::Url,
};
use clap::{Args, Parser};
use rand::Rng;

use crate::contract::default_contract_source;

/// IPFS CID of the mock event's off-chain metadata.
pub const DEFAULT_DATA_CID: &str = "bafybeibhwfzx6oo5rymsxmkdxpmkfwyvbjrrwcl7cekmbzlupmp5ypkyfi";
pub const DEFAULT_MAX_CAPACITY: u64 = 3;
/// Ten years, in seconds.
pub const DEFAULT_TIME_SKIP: u64 = 315_576_000;
pub const ONE_DAY: u64 = 86_400;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "run", about = "Deploy Web3RSVP and exercise its entry points")]
pub struct ScriptConfig {
    #[command(flatten)]
    pub network: NetworkConfig,

    #[command(flatten)]
    pub deploy: DeployConfig,

    #[command(flatten)]
    pub event: EventConfig,
}

#[derive(Debug, Clone, Default, Args)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint of a dev node. A local anvil node is spawned when unset.
    #[arg(long, env = "RSVP_RPC_URL")]
    pub rpc_url: Option<Url>,

    /// Comma separated private keys; the first three are the deployer and two attendees.
    #[arg(long, env = "RSVP_PRIVATE_KEYS", value_delimiter = ',', hide_env_values = true)]
    pub private_keys: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct DeployConfig {
    /// Attach to an already deployed contract instead of deploying a new one.
    #[arg(long, env = "RSVP_CONTRACT_ADDRESS")]
    pub contract: Option<Address>,

    #[arg(long, env = "RSVP_CONTRACT_SOURCE", default_value_os_t = default_contract_source())]
    pub contract_source: PathBuf,

    /// Pre-built creation bytecode (hex, or a Hardhat/Foundry artifact). Skips `solc`.
    #[arg(long, env = "RSVP_BYTECODE")]
    pub bytecode: Option<PathBuf>,

    #[arg(long, env = "RSVP_SOLC", default_value = "solc")]
    pub solc: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            contract: None,
            contract_source: default_contract_source(),
            bytecode: None,
            solc: "solc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct EventConfig {
    /// RSVP deposit, in ether.
    #[arg(long, env = "RSVP_DEPOSIT", default_value = "1", value_parser = parse_ether)]
    pub deposit: U256,

    #[arg(long, env = "RSVP_MAX_CAPACITY", default_value_t = DEFAULT_MAX_CAPACITY)]
    pub max_capacity: u64,

    /// Unix timestamp of the event. Defaults to one day after the latest block.
    #[arg(long, env = "RSVP_EVENT_TIMESTAMP")]
    pub event_timestamp: Option<u64>,

    #[arg(long, env = "RSVP_DATA_CID", default_value = DEFAULT_DATA_CID)]
    pub data_cid: String,

    /// Seconds to advance chain time before withdrawing unclaimed deposits.
    #[arg(long, env = "RSVP_TIME_SKIP", default_value_t = DEFAULT_TIME_SKIP)]
    pub time_skip: u64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            deposit: Unit::ETHER.wei(),
            max_capacity: DEFAULT_MAX_CAPACITY,
            event_timestamp: None,
            data_cid: DEFAULT_DATA_CID.to_string(),
            time_skip: DEFAULT_TIME_SKIP,
        }
    }
}

impl EventConfig {
    /// Timestamp to create the event with.
    ///
    /// An explicit timestamp is used as is. Otherwise the event is placed one day after
    /// `latest_block`. When the contract was deployed by an earlier run, the event id
    /// (derived from creator, timestamp, deposit and capacity) would repeat, so a random
    /// offset of up to one more day is added.
    pub fn resolve_timestamp(&self, latest_block: u64, attached: bool, rng: &mut impl Rng) -> u64 {
        if let Some(timestamp) = self.event_timestamp {
            return timestamp;
        }
        let timestamp = latest_block + ONE_DAY;
        if attached {
            timestamp + rng.random_range(1..=ONE_DAY)
        } else {
            timestamp
        }
    }
}
