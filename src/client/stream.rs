use std::cmp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::Client;
use crate::config::StreamConfig;
use crate::models::errors::StreamError;
use crate::models::query::Query;
use crate::models::response::QueryResponse;

/// Ordered page stream over a block range.
///
/// Sub-ranges are fetched concurrently but pages are always delivered in
/// range order (descending when the stream is reversed).
pub struct QueryStream {
    rx: mpsc::Receiver<Result<QueryResponse>>,
    driver: JoinHandle<()>,
    closed: bool,
}

impl QueryStream {
    /// Next in-order page. `Ok(None)` marks the end of the requested range.
    pub async fn recv(&mut self) -> Result<Option<QueryResponse>> {
        if self.closed {
            return Err(StreamError::Closed.into());
        }
        match self.rx.recv().await {
            Some(Ok(page)) => Ok(Some(page)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    /// Stop the stream: cancel in-flight requests and drop buffered pages.
    /// Subsequent `recv` calls fail. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.driver.abort();
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for QueryStream {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

pub(crate) async fn start(
    client: Client,
    query: Query,
    config: StreamConfig,
) -> Result<QueryStream> {
    let to_block = match query.to_block {
        Some(to_block) => to_block,
        None => client
            .get_height_with_retry()
            .await
            .context("Failed to resolve stream target height")?,
    };

    let (tx, rx) = mpsc::channel(cmp::max(1, config.concurrency));
    let driver = tokio::spawn(run_driver(client, query, config, to_block, tx));

    Ok(QueryStream {
        rx,
        driver,
        closed: false,
    })
}

async fn run_driver(
    client: Client,
    query: Query,
    config: StreamConfig,
    to_block: u64,
    tx: mpsc::Sender<Result<QueryResponse>>,
) {
    let batch_size = Arc::new(AtomicU64::new(config.batch_size));
    let from_block = query.from_block;
    let reverse = config.reverse;

    // Sub-range generator. The cursor walks up from `from_block`, or down
    // from `to_block` when reversed. Each step consults the shared batch
    // size hint, so ranges issued later adapt to observed response sizes.
    let sizes = batch_size.clone();
    let initial = if reverse { to_block } else { from_block };
    let generator = futures::stream::unfold(initial, move |cursor| {
        let client = client.clone();
        let query = query.clone();
        let sizes = sizes.clone();
        async move {
            let step = cmp::max(1, sizes.load(Ordering::SeqCst));
            if reverse {
                if cursor <= from_block {
                    return None;
                }
                let start = cmp::max(from_block, cursor.saturating_sub(step));
                let sub = sub_range(&query, start, cursor);
                Some((drain_range(client, sub, cursor, true), start))
            } else {
                if cursor >= to_block {
                    return None;
                }
                let end = cmp::min(to_block, cursor.saturating_add(step));
                let sub = sub_range(&query, cursor, end);
                Some((drain_range(client, sub, end, false), end))
            }
        }
    });

    // buffered() keeps up to `concurrency` sub-ranges in flight and yields
    // completions in issue order, which is what keeps delivery ordered.
    let mut completions = std::pin::pin!(generator.buffered(cmp::max(1, config.concurrency)));

    while let Some(result) = completions.next().await {
        match result {
            Ok(pages) => {
                for page in pages {
                    adjust_batch_size(&batch_size, &config, page.response_size);
                    if tx.send(Ok(page)).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
        }
    }
}

fn sub_range(query: &Query, from_block: u64, to_block: u64) -> Query {
    let mut sub = query.clone();
    sub.from_block = from_block;
    sub.to_block = Some(to_block);
    sub
}

/// Fully drain one sub-range, following `next_block` so server-side budget
/// stops inside the sub-range never leak gaps into the stream.
async fn drain_range(
    client: Client,
    mut query: Query,
    target: u64,
    reverse: bool,
) -> Result<Vec<QueryResponse>> {
    let mut pages = Vec::new();

    loop {
        let response = client.send_with_retry(&query).await?;
        let next_block = response.next_block;
        pages.push(response);

        if next_block >= target {
            break;
        }
        query.from_block = next_block;
    }

    if reverse {
        pages.reverse();
    }

    Ok(pages)
}

fn adjust_batch_size(hint: &AtomicU64, config: &StreamConfig, observed_bytes: u64) {
    let current = hint.load(Ordering::SeqCst);
    let next = if observed_bytes > config.response_bytes_ceiling {
        cmp::max(config.min_batch_size, current / 2)
    } else if observed_bytes < config.response_bytes_floor {
        cmp::min(config.max_batch_size, current.saturating_mul(2))
    } else {
        return;
    };

    if next != current {
        debug!(current, next, observed_bytes, "Adjusting stream batch size");
        hint.store(next, Ordering::SeqCst);
    }
}
