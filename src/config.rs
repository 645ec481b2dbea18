use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::retry::RetryConfig;

/// Connection settings for a single archive endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Url of the source archive instance.
    pub url: Url,
    /// Optional bearer token to put into http requests made to the archive.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Timeout threshold for a single http request in milliseconds.
    #[serde(default = "default_http_req_timeout_millis")]
    pub http_req_timeout_millis: u64,
    /// Number of attempts a failing request is given before the error surfaces.
    #[serde(default = "default_max_num_retries")]
    pub max_num_retries: u32,
    /// Initial retry delay in milliseconds.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    /// Upper bound on the retry delay in milliseconds.
    #[serde(default = "default_retry_ceiling_ms")]
    pub retry_ceiling_ms: u64,
    /// Growth factor applied to the retry delay after each failure.
    #[serde(default = "default_retry_exponential")]
    pub retry_exponential: f64,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            bearer_token: None,
            http_req_timeout_millis: default_http_req_timeout_millis(),
            max_num_retries: default_max_num_retries(),
            retry_base_ms: default_retry_base_ms(),
            retry_ceiling_ms: default_retry_ceiling_ms(),
            retry_exponential: default_retry_exponential(),
        }
    }

    pub(crate) fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_num_retries,
            base_delay_ms: self.retry_base_ms,
            max_delay_ms: self.retry_ceiling_ms,
            exponential: self.retry_exponential,
        }
    }
}

fn default_http_req_timeout_millis() -> u64 {
    30_000
}

fn default_max_num_retries() -> u32 {
    8
}

fn default_retry_base_ms() -> u64 {
    1_000
}

fn default_retry_ceiling_ms() -> u64 {
    30_000
}

fn default_retry_exponential() -> f64 {
    2.0
}

/// Settings for a streaming query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Block range size to use when making individual requests.
    /// Adjusted at runtime between `min_batch_size` and `max_batch_size`
    /// based on observed response sizes.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_min_batch_size")]
    pub min_batch_size: u64,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u64,
    /// Number of requests kept in flight at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Responses smaller than this many bytes grow the batch size.
    #[serde(default = "default_response_bytes_floor")]
    pub response_bytes_floor: u64,
    /// Responses larger than this many bytes shrink the batch size.
    #[serde(default = "default_response_bytes_ceiling")]
    pub response_bytes_ceiling: u64,
    /// Deliver pages from the top of the range down instead of bottom up.
    #[serde(default)]
    pub reverse: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            min_batch_size: default_min_batch_size(),
            max_batch_size: default_max_batch_size(),
            concurrency: default_concurrency(),
            response_bytes_floor: default_response_bytes_floor(),
            response_bytes_ceiling: default_response_bytes_ceiling(),
            reverse: false,
        }
    }
}

fn default_batch_size() -> u64 {
    400
}

fn default_min_batch_size() -> u64 {
    200
}

fn default_max_batch_size() -> u64 {
    204_800
}

fn default_concurrency() -> usize {
    10
}

fn default_response_bytes_floor() -> u64 {
    250_000
}

fn default_response_bytes_ceiling() -> u64 {
    2_000_000
}
