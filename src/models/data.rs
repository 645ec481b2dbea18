use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

// Raw records as returned by the archive service. Every field is optional
// because the field selection on the query decides what the server fills in.
// Hashes, addresses and byte blobs are prefixed hex strings; wide counters
// (value, gas, difficulty and friends) stay arbitrary precision so nothing is
// narrowed to a machine width.

/// Evm log object
///
/// See ethereum rpc spec for the meaning of fields
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Log {
    pub removed: Option<bool>,
    pub log_index: Option<u64>,
    pub transaction_index: Option<u64>,
    pub transaction_hash: Option<String>,
    pub block_hash: Option<String>,
    pub block_number: Option<u64>,
    pub address: Option<String>,
    pub data: Option<String>,
    pub topics: Vec<Option<String>>,
}

/// Evm transaction object
///
/// See ethereum rpc spec for the meaning of fields
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transaction {
    pub block_hash: Option<String>,
    pub block_number: Option<u64>,
    pub from: Option<String>,
    pub gas: Option<U256>,
    pub gas_price: Option<U256>,
    pub hash: Option<String>,
    pub input: Option<String>,
    pub nonce: Option<U256>,
    pub to: Option<String>,
    pub transaction_index: Option<u64>,
    pub value: Option<U256>,
    pub v: Option<String>,
    pub r: Option<String>,
    pub s: Option<String>,
    pub y_parity: Option<String>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub chain_id: Option<u64>,
    pub access_list: Option<Vec<AccessList>>,
    pub authorization_list: Option<Vec<Authorization>>,
    pub max_fee_per_blob_gas: Option<U256>,
    pub blob_versioned_hashes: Option<Vec<String>>,
    pub cumulative_gas_used: Option<U256>,
    pub effective_gas_price: Option<U256>,
    pub gas_used: Option<U256>,
    pub contract_address: Option<String>,
    pub logs_bloom: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<u8>,
    pub root: Option<String>,
    pub status: Option<u8>,
    pub sighash: Option<String>,
    pub blob_gas_price: Option<U256>,
    pub blob_gas_used: Option<U256>,
}

/// Evm access list entry
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessList {
    pub address: Option<String>,
    pub storage_keys: Option<Vec<String>>,
}

/// Evm authorization list entry (EIP-7702)
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Authorization {
    pub chain_id: Option<U256>,
    pub address: Option<String>,
    pub nonce: Option<u64>,
    pub y_parity: Option<u8>,
    pub r: Option<String>,
    pub s: Option<String>,
}

/// Evm block header object
///
/// See ethereum rpc spec for the meaning of fields
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    pub number: Option<u64>,
    pub hash: Option<String>,
    pub parent_hash: Option<String>,
    pub nonce: Option<U256>,
    pub sha3_uncles: Option<String>,
    pub logs_bloom: Option<String>,
    pub transactions_root: Option<String>,
    pub state_root: Option<String>,
    pub receipts_root: Option<String>,
    pub miner: Option<String>,
    pub difficulty: Option<U256>,
    pub total_difficulty: Option<U256>,
    pub extra_data: Option<String>,
    pub size: Option<U256>,
    pub gas_limit: Option<U256>,
    pub gas_used: Option<U256>,
    pub timestamp: Option<u64>,
    pub uncles: Option<Vec<String>>,
    pub base_fee_per_gas: Option<U256>,
    pub blob_gas_used: Option<U256>,
    pub excess_blob_gas: Option<U256>,
    pub parent_beacon_block_root: Option<String>,
    pub withdrawals_root: Option<String>,
    pub withdrawals: Option<Vec<Withdrawal>>,
    pub mix_hash: Option<String>,
}

/// Evm withdrawal object
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Withdrawal {
    pub index: Option<String>,
    pub validator_index: Option<String>,
    pub address: Option<String>,
    pub amount: Option<String>,
}

/// Evm call trace object
///
/// See ethereum rpc spec for the meaning of fields
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    pub from: Option<String>,
    pub to: Option<String>,
    pub call_type: Option<String>,
    pub gas: Option<U256>,
    pub input: Option<String>,
    pub init: Option<String>,
    pub value: Option<U256>,
    pub author: Option<String>,
    pub reward_type: Option<String>,
    pub block_hash: Option<String>,
    pub block_number: Option<u64>,
    pub address: Option<String>,
    pub code: Option<String>,
    pub gas_used: Option<U256>,
    pub output: Option<String>,
    pub subtraces: Option<u64>,
    pub trace_address: Option<Vec<u64>>,
    pub transaction_hash: Option<String>,
    pub transaction_position: Option<u64>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub error: Option<String>,
    pub action_address: Option<String>,
    pub balance: Option<U256>,
    pub refund_address: Option<String>,
    pub sighash: Option<String>,
}

/// One event (log) joined with the transaction and block it belongs to.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub transaction: Option<Transaction>,
    pub block: Option<Block>,
    pub log: Log,
}
