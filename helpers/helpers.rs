//! Common helper functions for scripts and tests

use alloy::{
    network::EthereumWallet,
    node_bindings::{Anvil, AnvilInstance},
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use tracing::info;

pub mod chain;
pub mod config;
pub mod contract;
pub mod error;
pub mod receipt;

pub use chain::{increase_time, latest_block_timestamp, tool_available};
pub use config::{DeployConfig, EventConfig, NetworkConfig, ScriptConfig};
pub use contract::{
    build_contract, default_contract_source, deploy_contract, load_bytecode, Web3RSVP,
};
pub use error::HelperError;
pub use receipt::{decode_events, ensure_success, first_event};

/// Private keys of the first accounts of the standard development mnemonic.
///
/// Both Anvil and Hardhat fund these accounts on start-up.
pub const DEV_PRIVATE_KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e97881e51b0a7b7a3b7b5f47a1",
];

/// Provider and wallets the smoke test runs against
pub struct ClientSetup {
    pub provider: DynProvider,
    /// Addresses of every signer registered with the provider's wallet, in config order.
    pub wallets: Vec<Address>,
    /// Local node spawned for this run. The node is killed when this is dropped.
    pub node: Option<AnvilInstance>,
}

/// Connect to the configured node, or spawn a local Anvil node when no RPC URL is set.
pub async fn setup_client(config: &NetworkConfig) -> Result<ClientSetup, HelperError> {
    let (endpoint, node) = match &config.rpc_url {
        Some(url) => (url.clone(), None),
        None => {
            let anvil = Anvil::new().try_spawn()?;
            info!(endpoint = %anvil.endpoint(), "spawned local anvil node");
            (anvil.endpoint_url(), Some(anvil))
        }
    };

    let signers: Vec<PrivateKeySigner> = match (&config.private_keys, &node) {
        (keys, _) if !keys.is_empty() => parse_signers(keys)?,
        (_, Some(anvil)) => anvil
            .keys()
            .iter()
            .take(DEV_PRIVATE_KEYS.len())
            .map(|key| key.clone().into())
            .collect(),
        (_, None) => parse_signers(DEV_PRIVATE_KEYS)?,
    };

    let (provider, wallets) = connect_with_signers(endpoint, signers)?;
    let chain_id = provider.get_chain_id().await?;
    info!(chain_id, wallets = wallets.len(), "connected to chain");

    Ok(ClientSetup { provider, wallets, node })
}

fn parse_signers<I, S>(keys: I) -> Result<Vec<PrivateKeySigner>, HelperError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .map(|key| key.as_ref().trim().parse::<PrivateKeySigner>().map_err(HelperError::from))
        .collect()
}

fn connect_with_signers(
    endpoint: Url,
    signers: Vec<PrivateKeySigner>,
) -> Result<(DynProvider, Vec<Address>), HelperError> {
    let mut signers = signers.into_iter();
    let first = signers.next().ok_or(HelperError::NotEnoughWallets { needed: 1, found: 0 })?;

    let mut wallets = vec![first.address()];
    let mut wallet = EthereumWallet::from(first);
    for signer in signers {
        wallets.push(signer.address());
        wallet.register_signer(signer);
    }

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(endpoint).erased();
    Ok((provider, wallets))
}

/// Named test accounts the smoke test sends from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestWallets {
    pub deployer: Address,
    pub address1: Address,
    pub address2: Address,
}

impl TestWallets {
    pub const REQUIRED: usize = 3;

    pub fn from_accounts(accounts: &[Address]) -> Result<Self, HelperError> {
        match accounts {
            [deployer, address1, address2, ..] => Ok(Self {
                deployer: *deployer,
                address1: *address1,
                address2: *address2,
            }),
            _ => Err(HelperError::NotEnoughWallets {
                needed: Self::REQUIRED,
                found: accounts.len(),
            }),
        }
    }

    /// Accounts in the order they RSVP.
    pub fn attendees(&self) -> [Address; 3] {
        [self.deployer, self.address1, self.address2]
    }
}
