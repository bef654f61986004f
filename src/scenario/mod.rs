pub mod count;
pub mod wave;

use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use strum::{Display, EnumString};

use crate::{check::CheckRegistry, config::TargetConfig, error::LoadTestError};

pub use count::CountScenario;
pub use wave::{WavePayload, WaveScenario};

/// Check recorded by every scenario against the response status.
pub const STATUS_OK_CHECK: &str = "status was 200";

/// One iteration of simulated user behavior.
///
/// Implementations hold no per-iteration mutable state, so a single instance is
/// shared by every virtual user.
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;

    async fn iteration(&self, checks: &CheckRegistry) -> IterationOutcome;
}

/// What a single iteration observed.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub status: Option<u16>,
    pub passed: bool,
    pub transport_error: Option<String>,
    pub latency: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, clap::ValueEnum)]
#[strum(serialize_all = "snake_case")]
pub enum ScenarioKind {
    /// POST the visitor payload to /wave
    Wave,
    /// GET the current wave count
    Count,
}

impl ScenarioKind {
    pub fn build(self, target: &TargetConfig) -> Result<Arc<dyn Scenario>, LoadTestError> {
        Ok(match self {
            ScenarioKind::Wave => Arc::new(WaveScenario::new(target)?),
            ScenarioKind::Count => Arc::new(CountScenario::new(target)?),
        })
    }
}

/// Shared client setup for scenarios; reqwest pools connections per client.
pub(crate) fn http_client(target: &TargetConfig) -> Result<reqwest::Client, LoadTestError> {
    Ok(reqwest::Client::builder()
        .timeout(target.http_timeout())
        .user_agent(concat!("wave-loadtest/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

pub(crate) fn parse_endpoint(raw: String) -> Result<reqwest::Url, LoadTestError> {
    let url = reqwest::Url::parse(&raw)
        .map_err(|e| LoadTestError::InvalidTarget(format!("{raw}: {e}")))?;
    if matches!(url.scheme(), "http" | "https") {
        Ok(url)
    } else {
        Err(LoadTestError::InvalidTarget(format!("unsupported scheme {}", url.scheme())))
    }
}
