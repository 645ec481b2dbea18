use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::client::Client;
use crate::models::errors::StreamError;
use crate::utils::retry::Backoff;

const POLL_INTERVAL: Duration = Duration::from_millis(1_000);
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Connection lifecycle events emitted by [`HeightWatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum HeightEvent {
    /// The endpoint answered after the watch started or recovered.
    Connected,
    /// A successful height probe.
    Height(u64),
    /// A probe failed; the next attempt happens after `delay`.
    Reconnecting { delay: Duration, cause: String },
}

/// Long-running observation of the archive height.
///
/// Emits `Connected` on every (re)connection, a `Height` per successful
/// probe, and `Reconnecting` with the backoff delay on failure. The watch
/// never terminates on its own; it runs until closed.
pub struct HeightWatch {
    rx: mpsc::Receiver<HeightEvent>,
    task: JoinHandle<()>,
    closed: bool,
}

impl HeightWatch {
    pub async fn recv(&mut self) -> Result<HeightEvent, StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        self.rx.recv().await.ok_or(StreamError::Closed)
    }

    /// Stop the watch. Subsequent `recv` calls fail. Closing twice is a
    /// no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.task.abort();
        self.rx.close();
    }
}

impl Drop for HeightWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub(crate) fn start(client: Client) -> HeightWatch {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let task = tokio::spawn(run_watch(client, tx));
    HeightWatch {
        rx,
        task,
        closed: false,
    }
}

async fn run_watch(client: Client, tx: mpsc::Sender<HeightEvent>) {
    let mut backoff = Backoff::new(client.config().retry_config());
    let mut connected = false;

    loop {
        match client.get_height().await {
            Ok(height) => {
                backoff.reset();
                if !connected {
                    connected = true;
                    if tx.send(HeightEvent::Connected).await.is_err() {
                        return;
                    }
                }
                if tx.send(HeightEvent::Height(height)).await.is_err() {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            Err(e) => {
                connected = false;
                let delay = backoff.next_delay();
                warn!(
                    "Height probe failed: {:#}. Reconnecting in {}ms...",
                    e,
                    delay.as_millis()
                );
                let event = HeightEvent::Reconnecting {
                    delay,
                    cause: format!("{:#}", e),
                };
                if tx.send(event).await.is_err() {
                    return;
                }
                tokio::time::sleep(delay).await;
            }
        }
    }
}
