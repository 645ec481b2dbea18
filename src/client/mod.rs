pub mod height;
pub mod stream;

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::{ClientConfig, StreamConfig};
use crate::models::data::Event;
use crate::models::query::{BlockField, LogField, Query, TransactionField};
use crate::models::response::{Events, QueryResponse};
use crate::transport::{HttpTransport, Transport};
use crate::utils::retry::retry;

pub use height::{HeightEvent, HeightWatch};
pub use stream::QueryStream;

// Fields the log join needs present regardless of what the caller selected.
const BLOCK_JOIN_FIELDS: &[BlockField] = &[BlockField::Number];
const TX_JOIN_FIELDS: &[TransactionField] = &[
    TransactionField::BlockNumber,
    TransactionField::TransactionIndex,
];
const LOG_JOIN_FIELDS: &[LogField] = &[
    LogField::LogIndex,
    LogField::TransactionIndex,
    LogField::BlockNumber,
];

/// Client for a blockchain archive endpoint.
///
/// Cheap to clone; clones share the same transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    cfg: ClientConfig,
}

impl Client {
    /// Create a client speaking http to the endpoint in `cfg`.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&cfg)?);
        Ok(Self { transport, cfg })
    }

    /// Create a client over a custom transport.
    pub fn with_transport(transport: Arc<dyn Transport>, cfg: ClientConfig) -> Self {
        Self { transport, cfg }
    }

    /// Height of the most recent block the archive has indexed. An archive
    /// with no blocks reports 0.
    pub async fn get_height(&self) -> Result<u64> {
        let height = self.transport.height().await.context("Failed to get height")?;
        Ok(height.unwrap_or(0))
    }

    pub async fn get_height_with_retry(&self) -> Result<u64> {
        let retry_config = self.cfg.retry_config();
        retry(|| self.get_height(), &retry_config, "get_height").await
    }

    /// Execute a single query request. The response covers a server-chosen
    /// prefix of the requested range; `next_block` tells the caller where to
    /// resume.
    pub async fn send(&self, query: &Query) -> Result<QueryResponse> {
        self.transport
            .execute(query)
            .await
            .context("Failed to execute query")
    }

    pub async fn send_with_retry(&self, query: &Query) -> Result<QueryResponse> {
        let retry_config = self.cfg.retry_config();
        retry(|| self.send(query), &retry_config, "send_query").await
    }

    /// Run the query to completion, following `next_block` until the
    /// requested range (or the archive tip, when `to_block` is absent) is
    /// covered. Pages are returned in ascending block order.
    pub async fn collect(&self, query: Query) -> Result<Vec<QueryResponse>> {
        let mut query = query;
        let mut pages = Vec::new();

        loop {
            let response = self.send_with_retry(&query).await?;
            let next_block = response.next_block;
            let archive_height = response.archive_height;
            pages.push(response);

            let target = query.to_block.or(archive_height);
            match target {
                Some(target) if next_block < target => {
                    debug!(next_block, target, "Continuing paginated query");
                    query.from_block = next_block;
                }
                _ => break,
            }
        }

        Ok(pages)
    }

    /// Execute a single query request and join the returned logs with their
    /// transactions and blocks. The join fields are added to the field
    /// selection automatically.
    pub async fn send_events(&self, query: &Query) -> Result<Events> {
        let mut query = query.clone();

        if !query.field_selection.block.is_empty() {
            query.field_selection.block.extend(BLOCK_JOIN_FIELDS);
        }
        if !query.field_selection.transaction.is_empty() {
            query.field_selection.transaction.extend(TX_JOIN_FIELDS);
        }
        if !query.field_selection.log.is_empty() {
            query.field_selection.log.extend(LOG_JOIN_FIELDS);
        }

        let response = self.send_with_retry(&query).await?;
        Ok(join_events(response))
    }

    /// Stream the query as an ordered sequence of pages with concurrent
    /// fetching behind the scenes.
    pub async fn stream(&self, query: Query, config: StreamConfig) -> Result<QueryStream> {
        stream::start(self.clone(), query, config).await
    }

    /// Watch the archive height, reconnecting with backoff on failure.
    pub fn stream_height(&self) -> HeightWatch {
        height::start(self.clone())
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.cfg
    }
}

fn join_events(response: QueryResponse) -> Events {
    let mut transactions = HashMap::new();
    for tx in &response.data.transactions {
        if let (Some(block), Some(index)) = (tx.block_number, tx.transaction_index) {
            transactions.insert((block, index), tx.clone());
        }
    }

    let mut blocks = HashMap::new();
    for block in &response.data.blocks {
        if let Some(number) = block.number {
            blocks.insert(number, block.clone());
        }
    }

    let events = response
        .data
        .logs
        .into_iter()
        .map(|log| {
            let transaction = log
                .block_number
                .zip(log.transaction_index)
                .and_then(|key| transactions.get(&key).cloned());
            let block = log.block_number.and_then(|number| blocks.get(&number).cloned());
            Event {
                transaction,
                block,
                log,
            }
        })
        .collect();

    Events {
        archive_height: response.archive_height,
        next_block: response.next_block,
        total_execution_time: response.total_execution_time,
        events,
    }
}
