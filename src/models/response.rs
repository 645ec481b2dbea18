use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

use crate::models::data::{Block, Event, Log, Trace, Transaction};

/// One page of query results.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResponse {
    /// Current height of the source archive instance
    pub archive_height: Option<u64>,
    /// Next block to query for, the responses are paginated so
    /// the caller should continue the query from this block if they
    /// didn't get responses up to the to_block they specified in the query.
    pub next_block: u64,
    /// Total time it took the archive instance to execute the query.
    pub total_execution_time: u64,
    /// Response data
    pub data: QueryResponseData,
    /// Rollback guard
    pub rollback_guard: Option<RollbackGuard>,
    /// Serialized size of the response body in bytes. Filled in by the
    /// transport, not part of the wire shape; drives adaptive batch sizing.
    #[serde(skip)]
    pub response_size: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResponseData {
    pub blocks: Vec<Block>,
    pub transactions: Vec<Transaction>,
    pub logs: Vec<Log>,
    pub traces: Vec<Trace>,
}

/// Consistency witness for detecting chain rollbacks across pages. The core
/// surfaces it verbatim; acting on it is the caller's persistence concern.
/// If a later page reports a different `first_parent_hash` for the same
/// `first_block_number`, a rollback occurred in between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackGuard {
    /// Block number of the last scanned block
    pub block_number: u64,
    /// Timestamp of the last scanned block
    pub timestamp: i64,
    /// Block hash of the last scanned block
    pub hash: B256,
    /// Block number of the first block still held in the server's
    /// in-memory reorg window
    pub first_block_number: u64,
    /// Parent hash of that first block
    pub first_parent_hash: B256,
}

/// Height probe response shape.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveHeight {
    pub height: Option<u64>,
}

/// Result of an events query: pages of logs joined with their transaction
/// and block.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Events {
    pub archive_height: Option<u64>,
    pub next_block: u64,
    pub total_execution_time: u64,
    pub events: Vec<Event>,
}
