use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};
use validator::Validate;

use crate::error::LoadTestError;

/// Run length used when neither a duration nor an iteration budget is set.
pub const DEFAULT_RUN_SECONDS: u64 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub target: TargetConfig,
    #[validate(nested)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
    #[validate(range(min = 64))]
    pub body_limit_bytes: usize,
    /// Visits kept in memory; older ones are dropped, the counter keeps going.
    #[validate(range(min = 1))]
    pub visit_history: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 30,
            body_limit_bytes: 64 * 1024,
            visit_history: 10_000,
        }
    }
}

impl ServerConfig {
    /// Resolves `host` (IP literal, bracketed IPv6 or hostname) to a bindable address.
    pub async fn resolve(&self) -> Result<SocketAddr> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        tokio::net::lookup_host((host, self.port))
            .await
            .with_context(|| format!("failed to resolve {}:{}", self.host, self.port))?
            .next()
            .with_context(|| format!("no address for {}", self.host))
    }
}

/// Where the scenario sends its traffic and how each iteration is paced.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TargetConfig {
    #[validate(url)]
    pub base_url: String,
    #[validate(length(min = 1))]
    pub visitor_name: String,
    pub think_time_ms: u64,
    #[validate(range(min = 1))]
    pub http_timeout_seconds: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            visitor_name: "Test User".to_string(),
            think_time_ms: 1000,
            http_timeout_seconds: 60,
        }
    }
}

impl TargetConfig {
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn think_time(&self) -> Duration {
        Duration::from_millis(self.think_time_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoadConfig {
    #[validate(range(min = 1, max = 100000))]
    pub vus: usize,
    #[validate(range(min = 1))]
    pub duration_seconds: Option<u64>,
    #[validate(range(min = 1))]
    pub iterations: Option<u64>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            vus: 1,
            duration_seconds: None,
            iterations: None,
        }
    }
}

impl LoadConfig {
    /// Wall-clock limit for a run. `None` means the iteration budget alone ends it.
    pub fn deadline(&self) -> Option<Duration> {
        match (self.duration_seconds, self.iterations) {
            (Some(secs), _) => Some(Duration::from_secs(secs)),
            (None, Some(_)) => None,
            (None, None) => Some(Duration::from_secs(DEFAULT_RUN_SECONDS)),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("WAVE__").split("__"));
        // Validated by the caller once CLI flags have been applied.
        figment.extract().context("failed to read configuration")
    }

    pub fn check(&self) -> Result<(), LoadTestError> {
        self.validate()?;
        Ok(())
    }
}
