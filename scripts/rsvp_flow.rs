//! Smoke test for the Web3RSVP contract
//!
//! Deploys the contract, creates an event, RSVPs from three wallets, confirms every
//! attendee, skips ahead in time and withdraws the unclaimed deposits. Each step waits
//! for its receipt and logs the events it emitted.

use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes, TxHash, B256, U256},
    providers::{DynProvider, PendingTransactionBuilder},
    rpc::types::TransactionReceipt,
};
use anyhow::Context;
use helpers::{
    build_contract, decode_events, deploy_contract, ensure_success, first_event, increase_time,
    latest_block_timestamp, load_bytecode, ClientSetup, DeployConfig, ScriptConfig, TestWallets,
    Web3RSVP,
};
use tracing::info;

/// What a completed run observed on chain
#[derive(Debug, Clone)]
pub struct SmokeReport {
    pub contract: Address,
    pub event_id: B256,
    /// Attendees as reported by `NewRSVP`, in submission order.
    pub rsvps: Vec<Address>,
    /// Attendees as reported by `ConfirmedAttendee`.
    pub confirmed: Vec<Address>,
    pub payout_tx: TxHash,
}

pub async fn run_smoke_test(
    setup: &ClientSetup,
    config: &ScriptConfig,
) -> anyhow::Result<SmokeReport> {
    let provider = &setup.provider;
    let event = &config.event;

    // test wallet addresses
    let wallets = TestWallets::from_accounts(&setup.wallets)?;

    let contract = contract_address(provider, wallets.deployer, &config.deploy).await?;
    let rsvp = Web3RSVP::new(contract, provider.clone());

    // create a new event
    let latest = latest_block_timestamp(provider).await?;
    let attached = config.deploy.contract.is_some();
    let timestamp = event.resolve_timestamp(latest, attached, &mut rand::rng());
    let pending = rsvp
        .createNewEvent(
            U256::from(timestamp),
            event.deposit,
            U256::from(event.max_capacity),
            event.data_cid.clone(),
        )
        .from(wallets.deployer)
        .send()
        .await
        .context("createNewEvent")?;
    let receipt = confirmed(pending, "createNewEvent").await?;

    let created: Web3RSVP::NewEventCreated = first_event(&receipt)?;
    info!(
        event = "NewEventCreated",
        event_id = %created.eventID,
        creator = %created.creatorAddress,
        timestamp = %created.eventTimestamp,
        max_capacity = %created.maxCapacity,
        deposit = %created.deposit,
        data_cid = %created.eventDataCID,
        "NEW EVENT CREATED"
    );
    let event_id = created.eventID;
    info!(%event_id, "EVENT ID");

    // RSVP from every test wallet
    let mut rsvps = Vec::with_capacity(TestWallets::REQUIRED);
    for attendee in wallets.attendees() {
        let pending = rsvp
            .createNewRSVP(event_id)
            .value(event.deposit)
            .from(attendee)
            .send()
            .await
            .with_context(|| format!("createNewRSVP from {attendee}"))?;
        let receipt = confirmed(pending, "createNewRSVP").await?;

        let new_rsvp: Web3RSVP::NewRSVP = first_event(&receipt)?;
        info!(
            event = "NewRSVP",
            event_id = %new_rsvp.eventID,
            attendee = %new_rsvp.attendeeAddress,
            "NEW RSVP"
        );
        rsvps.push(new_rsvp.attendeeAddress);
    }

    // confirm attendees
    let pending = rsvp
        .confirmAllAttendees(event_id)
        .from(wallets.deployer)
        .send()
        .await
        .context("confirmAllAttendees")?;
    let receipt = confirmed(pending, "confirmAllAttendees").await?;

    let confirmations = decode_events::<Web3RSVP::ConfirmedAttendee>(&receipt)
        .into_iter()
        .map(|confirmation| confirmation.attendeeAddress)
        .inspect(|attendee| info!(%attendee, "CONFIRMED"))
        .collect();

    // the contract only pays out unclaimed deposits once the event is long over
    increase_time(provider, event.time_skip).await?;

    let pending = rsvp
        .withdrawUnclaimedDeposits(event_id)
        .from(wallets.deployer)
        .send()
        .await
        .context("withdrawUnclaimedDeposits")?;
    let receipt = confirmed(pending, "withdrawUnclaimedDeposits").await?;

    let paid_out: Web3RSVP::DepositsPaidOut = first_event(&receipt)?;
    info!(event = "DepositsPaidOut", event_id = %paid_out.eventID, "WITHDRAWN");

    Ok(SmokeReport {
        contract,
        event_id,
        rsvps,
        confirmed: confirmations,
        payout_tx: receipt.transaction_hash,
    })
}

/// Attach to the configured contract, or build and deploy a fresh one from `deployer`.
async fn contract_address(
    provider: &DynProvider,
    deployer: Address,
    config: &DeployConfig,
) -> anyhow::Result<Address> {
    match config.contract {
        Some(address) => {
            info!(%address, "attaching to deployed contract");
            Ok(address)
        }
        None => {
            let bytecode = contract_bytecode(config)?;
            let contract = deploy_contract(provider, deployer, bytecode)
                .await
                .context("deploying Web3RSVP")?;
            info!(%contract, "Contract deployed to: {contract}");
            Ok(contract)
        }
    }
}

fn contract_bytecode(config: &DeployConfig) -> anyhow::Result<Bytes> {
    let bytecode = match &config.bytecode {
        Some(path) => load_bytecode(path)?,
        None => build_contract(&config.solc, &config.contract_source)?,
    };
    Ok(bytecode)
}

async fn confirmed(
    pending: PendingTransactionBuilder<Ethereum>,
    step: &'static str,
) -> anyhow::Result<TransactionReceipt> {
    let tx = *pending.tx_hash();
    let receipt = pending
        .get_receipt()
        .await
        .with_context(|| format!("{step}: waiting for {tx}"))?;
    ensure_success(&receipt).context(step)?;
    Ok(receipt)
}
