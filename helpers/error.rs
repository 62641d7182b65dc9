use std::{path::PathBuf, process::ExitStatus};

use alloy::{
    contract, hex::FromHexError, node_bindings::NodeError, primitives::TxHash,
    providers::PendingTransactionError, signers::local::LocalSignerError,
    transports::TransportError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HelperError {
    #[error("failed to launch `{solc}`")]
    SolcLaunch {
        solc: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`solc` exited with {status}: {stderr}")]
    SolcFailed { status: ExitStatus, stderr: String },

    #[error("no `{contract}` contract in compiler output for {}", path.display())]
    ArtifactMissing { contract: String, path: PathBuf },

    #[error("failed to read bytecode from {}", path.display())]
    BytecodeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bytecode is empty")]
    EmptyBytecode,

    #[error("bytecode is not valid hex")]
    InvalidBytecode(#[from] FromHexError),

    #[error("malformed compiler artifact")]
    Json(#[from] serde_json::Error),

    #[error("invalid private key")]
    InvalidPrivateKey(#[from] LocalSignerError),

    #[error("failed to spawn local node")]
    NodeSpawn(#[from] NodeError),

    #[error("rpc request failed")]
    Transport(#[from] TransportError),

    #[error("waiting for transaction failed")]
    PendingTransaction(#[from] PendingTransactionError),

    #[error("contract call failed")]
    Contract(#[from] contract::Error),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("deployment transaction {0} has no contract address")]
    MissingContractAddress(TxHash),

    #[error("transaction {tx} emitted no `{event}` event")]
    MissingEvent { event: &'static str, tx: TxHash },

    #[error("node returned no latest block")]
    MissingBlock,

    #[error("need {needed} funded wallets, found {found}")]
    NotEnoughWallets { needed: usize, found: usize },
}
