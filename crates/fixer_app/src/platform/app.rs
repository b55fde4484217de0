use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use fixer_core::GraphScanner;
use fixer_engine::{
    load_workflow, save_workflow, DownloadTaskManager, HttpFixerApi, ResolutionUi, SessionOutcome,
};
use fixer_logging::{fixer_error, fixer_info};

use super::button::host_button;
use super::config::FixerConfig;
use super::push::{push_url, spawn_push_listener};
use super::terminal::TerminalUi;

/// `<stem>.fixed.json` next to the input.
pub(crate) fn default_output(workflow: &Path) -> PathBuf {
    let stem = workflow
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workflow".to_string());
    workflow.with_file_name(format!("{stem}.fixed.json"))
}

/// Loads a workflow, runs fixing sessions against the server and writes the result.
pub(crate) async fn fix_workflow(
    config: &FixerConfig,
    workflow: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut graph = load_workflow(workflow)
        .with_context(|| format!("cannot load workflow {}", workflow.display()))?;
    let api = HttpFixerApi::new(config.api_settings()).context("invalid server_url")?;
    let socket = push_url(api.base_url());
    let mut manager =
        DownloadTaskManager::new(Arc::new(api), GraphScanner::new(config.scan_settings()));
    let listener = socket.map(|url| spawn_push_listener(url, manager.event_sender()));
    let mut ui = TerminalUi::new();
    let mut button = host_button();

    let mut outcome = manager
        .begin_session(&mut graph, button.as_mut(), &mut ui)
        .await;
    // Downloads outlive the dialog; offer to reopen it while they run.
    while manager.state().in_flight_count() > 0
        && ui
            .confirm("Downloads are still running. Reopen the dialog?")
            .await
    {
        outcome = manager
            .begin_session(&mut graph, button.as_mut(), &mut ui)
            .await;
    }

    if let Some(listener) = listener {
        listener.abort();
    }

    if graph.consume_dirty() {
        let target = output.unwrap_or_else(|| default_output(workflow));
        let written = save_workflow(&target, &graph)
            .with_context(|| format!("cannot write {}", target.display()))?;
        fixer_info!("Wrote fixed workflow to {}", written.display());
        println!("Wrote {}", written.display());
    }

    let running = manager.state().in_flight_count();
    if running > 0 {
        println!("{running} download(s) continue on the server.");
    }

    match outcome {
        SessionOutcome::Failed { message } => {
            fixer_error!("Session failed: {}", message);
            bail!(message)
        }
        _ => Ok(()),
    }
}

/// Prints the filenames the server is downloading.
pub(crate) async fn list_active(config: &FixerConfig) -> Result<()> {
    let api = HttpFixerApi::new(config.api_settings()).context("invalid server_url")?;
    let active = api
        .try_active_tasks()
        .await
        .with_context(|| format!("cannot reach {}", api.base_url()))?;
    if active.is_empty() {
        println!("No downloads running.");
    }
    for filename in active {
        println!("{filename}");
    }
    Ok(())
}
