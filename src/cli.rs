use clap::{Args, Parser, Subcommand};

use crate::{config::Config, scenario::ScenarioKind};

/// Wave scenario load generator and target service
#[derive(Parser, Debug)]
#[command(name = "wave-loadtest")]
#[command(about = "Drive the /wave scenario with virtual users, or serve the /wave endpoint")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Mode {
    /// Run a scenario from concurrent virtual users and print the check report
    Run(RunArgs),

    /// Serve the /wave visitor service (runs until Ctrl+C)
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Scenario to drive
    #[arg(long, value_enum, default_value_t = ScenarioKind::Wave)]
    pub scenario: ScenarioKind,

    /// Concurrent virtual users
    #[arg(long)]
    pub vus: Option<usize>,

    /// Run length in seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Total iterations shared by all virtual users
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Base URL of the service under test
    #[arg(long, env = "WAVE_TARGET")]
    pub target: Option<String>,

    /// Pause at the end of each iteration, in milliseconds
    #[arg(long)]
    pub think_time_ms: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
}

impl RunArgs {
    /// Flags win over file and environment settings.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(vus) = self.vus {
            cfg.load.vus = vus;
        }
        if let Some(secs) = self.duration {
            cfg.load.duration_seconds = Some(secs);
        }
        if let Some(n) = self.iterations {
            cfg.load.iterations = Some(n);
        }
        if let Some(url) = &self.target {
            cfg.target.base_url = url.clone();
        }
        if let Some(ms) = self.think_time_ms {
            cfg.target.think_time_ms = ms;
        }
    }
}

impl ServeArgs {
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(host) = &self.host {
            cfg.server.host = host.clone();
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
    }
}
