use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{http_client, parse_endpoint, IterationOutcome, Scenario, STATUS_OK_CHECK};
use crate::{check::CheckRegistry, config::TargetConfig, error::LoadTestError};

pub const COUNT_IS_NUMBER_CHECK: &str = "count is a number";

#[derive(Debug, Deserialize)]
struct CountBody {
    count: u64,
}

/// Read-side companion to the wave scenario: poll `/get_count`.
pub struct CountScenario {
    client: reqwest::Client,
    url: reqwest::Url,
    think_time: Duration,
}

impl CountScenario {
    pub fn new(target: &TargetConfig) -> Result<Self, LoadTestError> {
        Ok(Self {
            client: http_client(target)?,
            url: parse_endpoint(target.endpoint("/get_count"))?,
            think_time: target.think_time(),
        })
    }
}

#[async_trait]
impl Scenario for CountScenario {
    fn name(&self) -> &str {
        "count"
    }

    async fn iteration(&self, checks: &CheckRegistry) -> IterationOutcome {
        let start = Instant::now();
        let outcome = match self.client.get(self.url.clone()).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = match resp.bytes().await {
                    Ok(body) => body,
                    Err(e) => {
                        debug!(error = %e, url = %self.url, "failed to read count response body");
                        Default::default()
                    }
                };
                let latency = start.elapsed();
                let status_ok = checks.check(STATUS_OK_CHECK, status == 200);
                let parsed = serde_json::from_slice::<CountBody>(&body).ok();
                let count_ok = checks.check(COUNT_IS_NUMBER_CHECK, parsed.is_some());
                debug!(status, count = parsed.map(|b| b.count), "count read");
                IterationOutcome {
                    status: Some(status),
                    passed: status_ok && count_ok,
                    transport_error: None,
                    latency,
                }
            }
            Err(e) => {
                let latency = start.elapsed();
                checks.check(STATUS_OK_CHECK, false);
                checks.check(COUNT_IS_NUMBER_CHECK, false);
                warn!(error = %e, url = %self.url, "count request failed");
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
