use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use url::Url;

use crate::config::ClientConfig;
use crate::models::query::Query;
use crate::models::response::{ArchiveHeight, QueryResponse};

/// Request/response exchange with an archive endpoint.
///
/// The client only talks to the archive through this trait, so tests can
/// substitute an in-memory implementation.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Execute a single query request and return one page of results.
    async fn execute(&self, query: &Query) -> Result<QueryResponse>;

    /// Ask the archive for the height of its most recent indexed block.
    /// `None` means the archive has not indexed any blocks yet.
    async fn height(&self) -> Result<Option<u64>>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    url: Url,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.http_req_timeout_millis))
            .connect_timeout(Duration::from_millis(cfg.http_req_timeout_millis))
            .tcp_keepalive(Duration::from_secs(15))
            .build()
            .context("Failed to build http client")?;

        Ok(Self {
            http,
            url: cfg.url.clone(),
            bearer_token: cfg.bearer_token.clone(),
        })
    }

    fn endpoint(&self, segment: &str) -> Result<Url> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Archive url cannot be a base: {}", self.url))?
            .push(segment);
        Ok(url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, query: &Query) -> Result<QueryResponse> {
        let req = self.authorize(self.http.post(self.endpoint("query")?));
        let res = req
            .json(query)
            .send()
            .await
            .context("Failed to execute query request")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Query request failed with status {status}: {body}"
            ));
        }

        let body = res
            .bytes()
            .await
            .context("Failed to read query response body")?;
        let mut response: QueryResponse =
            serde_json::from_slice(&body).context("Failed to parse query response")?;
        response.response_size = body.len() as u64;

        Ok(response)
    }

    async fn height(&self) -> Result<Option<u64>> {
        let req = self.authorize(self.http.get(self.endpoint("height")?));
        let res = req.send().await.context("Failed to execute height request")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Height request failed with status {status}: {body}"
            ));
        }

        let height: ArchiveHeight = res
            .json()
            .await
            .context("Failed to parse height response")?;

        Ok(height.height)
    }
}
