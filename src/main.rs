use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wave_loadtest::{
    api,
    cli::{Cli, Mode, RunArgs},
    config::Config,
    runner::LoadRunner,
    state::AppState,
    telemetry,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    let mut cfg = Config::load()?;

    match cli.mode {
        Mode::Serve(args) => {
            args.apply(&mut cfg);
            cfg.check()?;
            serve(cfg).await?;
            Ok(ExitCode::SUCCESS)
        }
        Mode::Run(args) => {
            args.apply(&mut cfg);
            cfg.check()?;
            let code = run(cfg, &args).await?;
            Ok(ExitCode::from(code))
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let addr = cfg.server.resolve().await?;

    if addr.ip().is_unspecified() {
        warn!(%addr, "binding to an unspecified address - the wave service is reachable from the network");
    }

    let app = api::router(AppState::new(cfg));

    info!(%addr, "starting wave service");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}

async fn run(cfg: Config, args: &RunArgs) -> Result<u8> {
    let scenario = args.scenario.build(&cfg.target)?;

    let shutdown = CancellationToken::new();
    telemetry::cancel_on_shutdown(shutdown.clone());

    let summary = LoadRunner::new(cfg.load.clone()).run(scenario, shutdown).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(summary.exit_code())
}
