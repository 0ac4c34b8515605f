use sha2::{Digest, Sha256};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};

use crate::app::ports::HttpClientPort;
use crate::config::SourceConfig;
use crate::error::{Result, SourceError};
use crate::infra::http_client::ReqwestHttp;
use crate::observability::metrics;

/// Posts request payloads to the vendor API with a bounded, fixed-delay retry.
pub struct RequestExecutor {
    http: Box<dyn HttpClientPort>,
    url: String,
    retry_delay: Duration,
    max_attempts: u32,
}

impl RequestExecutor {
    pub fn new(
        http: Box<dyn HttpClientPort>,
        url: impl Into<String>,
        retry_delay: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            retry_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let http = ReqwestHttp::new(config.request.timeout()).map_err(|source| {
            SourceError::Transport { attempts: 0, source }
        })?;
        Ok(Self::new(
            Box::new(http),
            config.api_url.clone(),
            config.request.retry_delay(),
            config.request.max_attempts,
        ))
    }

    /// Perform the request, aborting on Ctrl-C.
    pub async fn perform_request(&self, payload: &str) -> Result<String> {
        self.perform_request_until(payload, shutdown_signal()).await
    }

    /// Perform the request until it succeeds, the attempt budget runs out, or
    /// `shutdown` resolves. Shutdown is terminal and wins over a pending response.
    #[instrument(skip(self, payload, shutdown), fields(url = %self.url))]
    pub async fn perform_request_until<F>(&self, payload: &str, shutdown: F) -> Result<String>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            if attempt > 1 {
                warn!("Perform request try: {}", attempt);
            }
            metrics::requests::attempt();

            let started = Instant::now();
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Request cancelled during attempt {}", attempt);
                    return Err(SourceError::Cancelled);
                }
                res = self.http.post_xml(&self.url, payload.to_string()) => res,
            };

            match outcome {
                Ok(resp) => {
                    metrics::requests::duration(started.elapsed().as_secs_f64());
                    metrics::requests::payload_bytes(resp.bytes.len());
                    if !(200..300).contains(&resp.status) {
                        warn!(
                            "Response status {} (content type {})",
                            resp.status, resp.content_type
                        );
                    }
                    debug!(
                        "Received {} bytes sha256={}",
                        resp.bytes.len(),
                        payload_fingerprint(&resp.bytes)
                    );
                    return String::from_utf8(resp.bytes).map_err(|e| {
                        SourceError::Decode(format!("response body is not UTF-8: {e}"))
                    });
                }
                Err(e) => {
                    metrics::requests::failure(&e.kind.to_string());
                    if attempt >= self.max_attempts {
                        error!(
                            "Tried for {} times and the request keeps failing, abort: {}",
                            attempt, e
                        );
                        return Err(SourceError::Transport { attempts: attempt, source: e });
                    }
                    warn!("Request attempt {} failed ({}), retrying", attempt, e);
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            warn!("Request cancelled while waiting to retry");
                            return Err(SourceError::Cancelled);
                        }
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves.
pub async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Hex SHA-256 of a response body, for logs.
pub fn payload_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
