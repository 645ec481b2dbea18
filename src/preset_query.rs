//! Ready-made queries for the common cases.

use alloy_primitives::{Address, B256};

use crate::models::query::{
    BlockField, FieldSelection, LogField, LogSelection, Query, TransactionField,
    TransactionSelection,
};

/// All blocks and all transactions in `[from_block, to_block)` with every
/// field selected. If `to_block` is `None` the query runs to the archive tip.
pub fn blocks_and_transactions(from_block: u64, to_block: Option<u64>) -> Query {
    Query {
        from_block,
        to_block,
        transactions: vec![TransactionSelection::default()],
        field_selection: FieldSelection {
            block: BlockField::all(),
            transaction: TransactionField::all(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// All blocks in the range together with the hashes of their transactions.
/// Each transaction also carries block_hash and block_number so it can be
/// mapped back to its block.
pub fn blocks_and_transaction_hashes(from_block: u64, to_block: Option<u64>) -> Query {
    let tx_fields = [
        TransactionField::BlockHash,
        TransactionField::BlockNumber,
        TransactionField::Hash,
    ]
    .into_iter()
    .collect();

    Query {
        from_block,
        to_block,
        transactions: vec![TransactionSelection::default()],
        field_selection: FieldSelection {
            block: BlockField::all(),
            transaction: tx_fields,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// All logs emitted by `address` in the range, with every log field selected.
pub fn logs(from_block: u64, to_block: Option<u64>, address: Address) -> Query {
    Query {
        from_block,
        to_block,
        logs: vec![LogSelection {
            address: vec![address],
            ..Default::default()
        }],
        field_selection: FieldSelection {
            log: LogField::all(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// All logs emitted by `address` whose first topic equals `topic0`.
/// `topic0` is the keccak256 hash of the event signature.
pub fn logs_of_event(from_block: u64, to_block: Option<u64>, topic0: B256, address: Address) -> Query {
    Query {
        from_block,
        to_block,
        logs: vec![LogSelection {
            address: vec![address],
            topics: vec![vec![topic0]],
        }],
        field_selection: FieldSelection {
            log: LogField::all(),
            ..Default::default()
        },
        ..Default::default()
    }
}
