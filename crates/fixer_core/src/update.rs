use fixer_logging::{fixer_debug, fixer_info};

use crate::dialog::DialogModel;
use crate::download::{download_filename, DownloadFailure, DownloadState, DownloadTask, Progress};
use crate::wire::{StartOutcome, StatusEvent, TerminalEvent};
use crate::{Effect, FixerState, Msg, Notice};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: FixerState, msg: Msg) -> (FixerState, Vec<Effect>) {
    let effects = match msg {
        Msg::ScanStarted => {
            state.cache_mut().clear();
            state.take_dialog();
            Vec::new()
        }
        Msg::ScanClassified(classification) => {
            state.cache_mut().store(&classification);
            let mut rows = Vec::with_capacity(classification.downloads.len());
            for result in &classification.downloads {
                let filename = download_filename(&result.old_value);
                state.upsert_task(
                    DownloadTask::new(filename.clone())
                        .with_source(result.download_url.clone(), result.model_type.clone()),
                );
                rows.push(filename);
            }
            if classification.needs_dialog() {
                state.open_dialog(DialogModel::new(
                    &classification.conflicts,
                    rows,
                    &classification.unknowns,
                ));
            }
            Vec::new()
        }
        Msg::SessionRestored { active } => {
            restore_session(&mut state, active);
            Vec::new()
        }
        Msg::ConflictSelected { key, index } => {
            let changed = state
                .dialog_mut()
                .is_some_and(|dialog| dialog.select(&key, index));
            if changed {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DialogConfirmed => match state.take_dialog() {
            Some(dialog) => {
                let fixes = dialog.fixes();
                if fixes.is_empty() {
                    Vec::new()
                } else {
                    vec![Effect::ApplyFixes(fixes)]
                }
            }
            None => Vec::new(),
        },
        Msg::DialogClosed => {
            state.take_dialog();
            Vec::new()
        }
        Msg::StartClicked { filename } => start_clicked(&mut state, filename),
        Msg::StartResponded { filename, response } => {
            let Some(task) = state.task_mut(&filename) else {
                return (state, Vec::new());
            };
            if task.state != DownloadState::Requesting {
                fixer_debug!("Ignoring start response for {} in {:?}", filename, task.state);
                return (state, Vec::new());
            }
            let effects = match response.outcome() {
                StartOutcome::AlreadyPresent => {
                    task.state = DownloadState::AlreadyPresent;
                    Vec::new()
                }
                StartOutcome::Accepted => {
                    task.state = DownloadState::Active;
                    Vec::new()
                }
                StartOutcome::Rejected(message) => {
                    task.state = DownloadState::Idle;
                    vec![Effect::Notify(Notice::StartRejected {
                        filename: filename.clone(),
                        message,
                    })]
                }
            };
            state.mark_dirty();
            effects
        }
        Msg::CancelClicked { filename } => match state.task(&filename) {
            Some(task) if task.can_cancel() => vec![Effect::ConfirmCancel { filename }],
            _ => Vec::new(),
        },
        Msg::CancelConfirmed {
            filename,
            confirmed,
        } => {
            if !confirmed {
                return (state, Vec::new());
            }
            match state.task_mut(&filename) {
                Some(task) if task.can_cancel() => {
                    task.state = DownloadState::Cancelling;
                    state.mark_dirty();
                    vec![Effect::CancelDownload { filename }]
                }
                _ => Vec::new(),
            }
        }
        Msg::CancelResponded { filename, response } => {
            if response.success {
                // The terminal event finishes the transition.
                return (state, Vec::new());
            }
            if let Some(task) = state.task_mut(&filename) {
                if task.state == DownloadState::Cancelling {
                    task.state = DownloadState::Active;
                    state.mark_dirty();
                }
            }
            let message = response
                .message
                .unwrap_or_else(|| "cancel request was rejected".to_string());
            vec![Effect::Notify(Notice::CancelRejected { filename, message })]
        }
        Msg::CopyLinkClicked { filename } => match state.task(&filename).and_then(|t| t.url.clone()) {
            Some(text) => vec![Effect::CopyToClipboard { text }],
            None => Vec::new(),
        },
        Msg::Status(event) => apply_status(&mut state, event),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn restore_session(state: &mut FixerState, active: Vec<String>) {
    let cache = state.cache().clone();
    let mut rows = Vec::new();

    for result in cache.downloads() {
        let filename = download_filename(&result.old_value);
        state.ensure_task(
            DownloadTask::new(filename.clone())
                .with_source(result.download_url.clone(), result.model_type.clone()),
        );
        rows.push(filename);
    }

    for filename in active {
        match state.task_mut(&filename) {
            Some(task) if task.is_in_flight() => {}
            Some(task) => {
                task.state = DownloadState::Active;
                task.progress = None;
            }
            None => {
                let mut task = DownloadTask::new(filename.clone());
                task.state = DownloadState::Active;
                state.ensure_task(task);
            }
        }
        rows.push(filename);
    }

    state.open_dialog(DialogModel::new(cache.conflicts(), rows, cache.unknowns()));
}

fn start_clicked(state: &mut FixerState, filename: String) -> Vec<Effect> {
    let Some(task) = state.task_mut(&filename) else {
        return Vec::new();
    };
    if !task.can_start() {
        fixer_debug!("Ignoring start for {} in {:?}", filename, task.state);
        return Vec::new();
    }
    let Some(url) = task.url.clone() else {
        return Vec::new();
    };
    task.state = DownloadState::Requesting;
    task.progress = None;
    let model_type = task
        .model_type
        .clone()
        .unwrap_or_else(|| "uncategorized".to_string());
    state.mark_dirty();
    vec![Effect::StartDownload {
        url,
        filename,
        model_type,
    }]
}

fn apply_status(state: &mut FixerState, event: StatusEvent) -> Vec<Effect> {
    let Some(task) = state.task_mut(event.filename()) else {
        fixer_debug!("Ignoring event for unknown download {}", event.filename());
        return Vec::new();
    };
    if task.is_settled() {
        fixer_debug!("Ignoring event for settled download {}", task.filename);
        return Vec::new();
    }

    let effects = match event {
        StatusEvent::Progress(progress) => {
            // Progress proves the server is still working on it.
            task.state = DownloadState::Active;
            task.progress = Some(Progress {
                current: progress.current,
                total: progress.total,
            });
            Vec::new()
        }
        StatusEvent::Terminal(terminal) => finish_task(task, terminal),
    };
    state.mark_dirty();
    effects
}

fn finish_task(task: &mut DownloadTask, terminal: TerminalEvent) -> Vec<Effect> {
    let filename = task.filename.clone();
    if terminal.success {
        fixer_info!("Download of {} completed", filename);
        task.state = DownloadState::Completed;
        return vec![Effect::Notify(Notice::DownloadCompleted { filename })];
    }
    if terminal.is_user_cancelled() {
        fixer_info!("Download of {} cancelled by user", filename);
        task.state = DownloadState::Failed(DownloadFailure::Cancelled);
        return Vec::new();
    }
    let reason = terminal
        .error
        .filter(|error| !error.is_empty())
        .unwrap_or_else(|| "unknown error".to_string());
    fixer_info!("Download of {} failed: {}", filename, reason);
    task.state = DownloadState::Failed(DownloadFailure::Error(reason.clone()));
    vec![Effect::Notify(Notice::DownloadFailed { filename, reason })]
}
