//! Receipt checks and event decoding

use alloy::{rpc::types::TransactionReceipt, sol_types::SolEvent};

use crate::HelperError;

/// Fail on receipts whose status reports a revert.
pub fn ensure_success(receipt: &TransactionReceipt) -> Result<(), HelperError> {
    if receipt.inner.status() {
        Ok(())
    } else {
        Err(HelperError::Reverted(receipt.transaction_hash))
    }
}

/// Every `E` in the receipt's logs, in emission order. Logs of other events are skipped.
pub fn decode_events<E: SolEvent>(receipt: &TransactionReceipt) -> Vec<E> {
    receipt
        .inner
        .logs()
        .iter()
        .filter_map(|log| log.log_decode::<E>().ok())
        .map(|log| log.inner.data)
        .collect()
}

/// The first `E` in the receipt's logs.
pub fn first_event<E: SolEvent>(receipt: &TransactionReceipt) -> Result<E, HelperError> {
    decode_events::<E>(receipt)
        .into_iter()
        .next()
        .ok_or(HelperError::MissingEvent {
            event: E::SIGNATURE,
            tx: receipt.transaction_hash,
        })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bloom, LogData, TxHash, B256};
    use serde_json::{json, Value};

    use super::*;
    use crate::Web3RSVP;

    const EVENT_ID: B256 = B256::repeat_byte(0x42);

    fn receipt(status: bool, logs: &[LogData]) -> TransactionReceipt {
        let contract = Address::repeat_byte(0xaa);
        let tx = TxHash::repeat_byte(0x11);
        let block_hash = B256::repeat_byte(0x22);
        let logs: Vec<Value> = logs
            .iter()
            .enumerate()
            .map(|(index, data)| {
                json!({
                    "address": contract,
                    "topics": data.topics(),
                    "data": data.data,
                    "blockHash": block_hash,
                    "blockNumber": "0x1",
                    "transactionHash": tx,
                    "transactionIndex": "0x0",
                    "logIndex": format!("{index:#x}"),
                    "removed": false,
                })
            })
            .collect();
        let status = if status { "0x1" } else { "0x0" };

        serde_json::from_value(json!({
            "type": "0x2",
            "status": status,
            "cumulativeGasUsed": "0x5208",
            "logs": logs,
            "logsBloom": Bloom::ZERO,
            "transactionHash": tx,
            "transactionIndex": "0x0",
            "blockHash": block_hash,
            "blockNumber": "0x1",
            "gasUsed": "0x5208",
            "effectiveGasPrice": "0x1",
            "from": Address::repeat_byte(0x01),
            "to": contract,
            "contractAddress": null,
        }))
        .unwrap()
    }

    fn rsvp(attendee: u8) -> LogData {
        Web3RSVP::NewRSVP {
            eventID: EVENT_ID,
            attendeeAddress: Address::repeat_byte(attendee),
        }
        .encode_log_data()
    }

    fn confirmation(attendee: u8) -> LogData {
        Web3RSVP::ConfirmedAttendee {
            eventID: EVENT_ID,
            attendeeAddress: Address::repeat_byte(attendee),
        }
        .encode_log_data()
    }

    #[test]
    fn decodes_matching_events_in_emission_order() {
        let receipt = receipt(true, &[rsvp(1), confirmation(9), rsvp(2), rsvp(3)]);

        let attendees: Vec<Address> = decode_events::<Web3RSVP::NewRSVP>(&receipt)
            .into_iter()
            .map(|event| event.attendeeAddress)
            .collect();
        assert_eq!(
            attendees,
            vec![Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3)]
        );

        // same parameter types, different signature
        let confirmed = decode_events::<Web3RSVP::ConfirmedAttendee>(&receipt);
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].attendeeAddress, Address::repeat_byte(9));
        assert_eq!(confirmed[0].eventID, EVENT_ID);
    }

    #[test]
    fn first_event_takes_the_earliest_log() {
        let receipt = receipt(true, &[confirmation(7), rsvp(4), rsvp(5)]);
        let first: Web3RSVP::NewRSVP = first_event(&receipt).unwrap();
        assert_eq!(first.attendeeAddress, Address::repeat_byte(4));
    }

    #[test]
    fn missing_event_names_signature_and_transaction() {
        let receipt = receipt(true, &[rsvp(1)]);
        let err = first_event::<Web3RSVP::DepositsPaidOut>(&receipt).unwrap_err();
        match err {
            HelperError::MissingEvent { event, tx } => {
                assert_eq!(event, Web3RSVP::DepositsPaidOut::SIGNATURE);
                assert_eq!(tx, TxHash::repeat_byte(0x11));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn receipt_without_logs_decodes_nothing() {
        let receipt = receipt(true, &[]);
        assert!(decode_events::<Web3RSVP::NewRSVP>(&receipt).is_empty());
    }

    #[test]
    fn failed_status_is_a_revert() {
        assert!(ensure_success(&receipt(true, &[])).is_ok());

        let err = ensure_success(&receipt(false, &[])).unwrap_err();
        assert!(matches!(err, HelperError::Reverted(tx) if tx == TxHash::repeat_byte(0x11)));
    }
}
