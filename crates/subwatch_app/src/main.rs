mod cli;
mod config;
mod logging;
mod render;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use subwatch_core::{AppState, Msg, PollPhase};
use subwatch_engine::{Controller, HttpBackend};
use subwatch_logging::{watch_info, watch_warn};
use tokio_util::sync::CancellationToken;

use cli::{Cli, Command};
use config::{read_config, AppConfig, MIN_POLL_INTERVAL_MS};
use render::TerminalView;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = read_config(&cli.config);
    let mut config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => AppConfig::default(),
    };
    config.apply_cli(&cli);
    logging::initialize(config.log_destination, Path::new(&config.log_file));

    match loaded {
        Ok(Some(_)) => watch_info!("Loaded config from {:?}", cli.config),
        Ok(None) => watch_info!("No config at {:?}; using defaults", cli.config),
        Err(err) => watch_warn!("{}; using defaults", err),
    }

    if config.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        watch_warn!(
            "poll_interval_ms {} is below the minimum; using {} ms",
            config.poll_interval_ms,
            MIN_POLL_INTERVAL_MS
        );
    }

    let backend = HttpBackend::new(config.backend_settings())
        .with_context(|| format!("invalid backend url {}", config.base_url))?;
    let cancel = CancellationToken::new();
    spawn_ctrl_c_watcher(cancel.clone());

    let view: TerminalView = TerminalView::default();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(view),
        AppState::with_poll_interval(config.poll_interval()),
        cancel,
    );

    let phase = controller.dispatch(Msg::ScanClicked).await;
    if phase == PollPhase::Cancelled {
        watch_info!("Scan cancelled");
        return Ok(exit_code(phase));
    }
    if let Some(error) = controller.state().last_error() {
        anyhow::bail!("{error}");
    }
    if cli.command == Command::Scan {
        return Ok(ExitCode::SUCCESS);
    }

    if controller.cancel_token().is_cancelled() {
        watch_info!("Cancelled before the download started");
        return Ok(exit_code(PollPhase::Cancelled));
    }

    let phase = controller.dispatch(Msg::DownloadClicked).await;
    watch_info!("Job ended in phase {:?}", phase);
    Ok(exit_code(phase))
}

fn exit_code(phase: PollPhase) -> ExitCode {
    match phase {
        PollPhase::Stopped => ExitCode::SUCCESS,
        PollPhase::Cancelled => ExitCode::from(130),
        _ => ExitCode::FAILURE,
    }
}

/// Ctrl-C stops the scan, the download start or the poll loop instead of
/// killing the process mid-render.
fn spawn_ctrl_c_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watch_info!("Ctrl-C received; cancelling poll loop");
            cancel.cancel();
        }
    });
}
