use std::collections::BTreeMap;

use crate::dialog::DialogModel;
use crate::download::{control_key, DownloadFailure, DownloadState, DownloadTask};
use crate::graph::NodeId;

pub const DIALOG_NOTICE: &str = "Closing this dialog does not stop background downloads.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixerViewModel {
    pub dialog: Option<DialogView>,
    pub in_flight_downloads: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTitle {
    Downloading,
    MissingModels,
    ScanResults,
}

impl DialogTitle {
    pub fn text(self) -> &'static str {
        match self {
            DialogTitle::Downloading => "Downloading in background...",
            DialogTitle::MissingModels => "Missing models (downloadable)",
            DialogTitle::ScanResults => "Scan results",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub title: DialogTitle,
    pub notice: &'static str,
    pub unknowns: Vec<UnknownRowView>,
    pub downloads: Vec<DownloadRowView>,
    pub conflicts: Vec<ConflictRowView>,
    /// Only conflicts have anything to confirm.
    pub can_confirm: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRowView {
    pub old_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRowView {
    pub filename: String,
    pub control_key: String,
    pub target_folder: String,
    pub url: Option<String>,
    pub progress_percent: Option<u8>,
    pub button: ButtonView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Start,
    Cancel,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub label: String,
    pub action: ButtonAction,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRowView {
    pub key: String,
    pub node_id: NodeId,
    pub widget_name: String,
    pub old_value: String,
    pub candidates: Vec<String>,
    pub selected: usize,
}

pub(crate) fn dialog_view(dialog: &DialogModel, tasks: &BTreeMap<String, DownloadTask>) -> DialogView {
    let downloads: Vec<DownloadRowView> = dialog
        .downloads
        .iter()
        .filter_map(|filename| tasks.get(filename))
        .map(download_row)
        .collect();

    let title = if tasks.values().any(DownloadTask::is_in_flight) {
        DialogTitle::Downloading
    } else if !downloads.is_empty() {
        DialogTitle::MissingModels
    } else {
        DialogTitle::ScanResults
    };

    DialogView {
        title,
        notice: DIALOG_NOTICE,
        unknowns: dialog
            .unknowns
            .iter()
            .map(|result| UnknownRowView {
                old_value: result.old_value.clone(),
            })
            .collect(),
        downloads,
        conflicts: dialog
            .conflicts
            .iter()
            .map(|choice| ConflictRowView {
                key: choice.result.key(),
                node_id: choice.result.node_id,
                widget_name: choice.result.widget_name.clone(),
                old_value: choice.result.old_value.clone(),
                candidates: choice.result.candidates.clone(),
                selected: choice.selected,
            })
            .collect(),
        can_confirm: !dialog.conflicts.is_empty(),
    }
}

pub fn download_row(task: &DownloadTask) -> DownloadRowView {
    DownloadRowView {
        filename: task.filename.clone(),
        control_key: control_key(&task.filename),
        target_folder: task.target_folder(),
        url: task.url.clone(),
        progress_percent: task.progress.and_then(|p| p.percent()),
        button: button_view(task),
    }
}

pub fn button_view(task: &DownloadTask) -> ButtonView {
    let (label, action) = match &task.state {
        DownloadState::Idle if task.url.is_none() => ("No download link", ButtonAction::None),
        DownloadState::Idle => ("Start background download", ButtonAction::Start),
        DownloadState::Requesting => ("Requesting...", ButtonAction::None),
        DownloadState::Active => ("Cancel download", ButtonAction::Cancel),
        DownloadState::Cancelling => ("Cancelling...", ButtonAction::None),
        DownloadState::Completed => ("Downloaded, refresh to load", ButtonAction::None),
        DownloadState::AlreadyPresent => ("File already exists", ButtonAction::None),
        DownloadState::Failed(DownloadFailure::Cancelled) => {
            ("Cancelled, start again", ButtonAction::Start)
        }
        DownloadState::Failed(DownloadFailure::Error(_)) => ("Failed, retry", ButtonAction::Start),
    };
    let action = if action == ButtonAction::Start && task.url.is_none() {
        ButtonAction::None
    } else {
        action
    };
    ButtonView {
        label: label.to_string(),
        action,
        enabled: action != ButtonAction::None,
    }
}
