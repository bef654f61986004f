use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{http_client, parse_endpoint, IterationOutcome, Scenario, STATUS_OK_CHECK};
use crate::{check::CheckRegistry, config::TargetConfig, error::LoadTestError};

/// JSON body posted on every iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WavePayload {
    pub name: String,
}

/// POST the visitor payload to `/wave`, check for 200, then pause.
pub struct WaveScenario {
    client: reqwest::Client,
    url: reqwest::Url,
    body: Vec<u8>,
    think_time: Duration,
}

impl WaveScenario {
    pub fn new(target: &TargetConfig) -> Result<Self, LoadTestError> {
        let payload = WavePayload {
            name: target.visitor_name.clone(),
        };
        let body = serde_json::to_vec(&payload)
            .map_err(|e| LoadTestError::InvalidTarget(format!("payload encoding: {e}")))?;
        Ok(Self {
            client: http_client(target)?,
            url: parse_endpoint(target.endpoint("/wave"))?,
            body,
            think_time: target.think_time(),
        })
    }

    pub fn url(&self) -> &reqwest::Url {
        &self.url
    }
}

#[async_trait]
impl Scenario for WaveScenario {
    fn name(&self) -> &str {
        "wave"
    }

    async fn iteration(&self, checks: &CheckRegistry) -> IterationOutcome {
        let start = Instant::now();
        let result = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(self.body.clone())
            .send()
            .await;

        let outcome = match result {
            Ok(resp) => {
                let status = resp.status();
                // Drain so the pooled connection can be reused. Only the status is checked.
                if let Err(e) = resp.bytes().await {
                    debug!(error = %e, url = %self.url, "failed to read wave response body");
                }
                let latency = start.elapsed();
                let passed = checks.check(STATUS_OK_CHECK, status.as_u16() == 200);
                debug!(status = status.as_u16(), latency_ms = latency.as_millis() as u64, "wave sent");
                IterationOutcome {
                    status: Some(status.as_u16()),
                    passed,
                    transport_error: None,
                    latency,
                }
            }
            Err(e) => {
                let latency = start.elapsed();
                checks.check(STATUS_OK_CHECK, false);
                warn!(error = %e, url = %self.url, "wave request failed");
                IterationOutcome {
                    status: None,
                    passed: false,
                    transport_error: Some(e.to_string()),
                    latency,
                }
            }
        };

        tokio::time::sleep(self.think_time).await;
        outcome
    }
}
