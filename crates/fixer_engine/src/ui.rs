//! Capabilities the host provides to a fixing session.

use fixer_core::{DialogView, DownloadRowView, Notice};

use crate::bridge::DownloadControl;

/// Where the pipeline is, as shown on the button that started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPhase {
    Scanning,
    Matching,
    WaitingForSelection,
    Fixed(usize),
    Idle,
}

impl ButtonPhase {
    /// `None` means the host's own idle label.
    pub fn label(self) -> Option<String> {
        match self {
            ButtonPhase::Scanning => Some("Scanning...".to_string()),
            ButtonPhase::Matching => Some("Matching...".to_string()),
            ButtonPhase::WaitingForSelection => Some("Waiting for selection...".to_string()),
            ButtonPhase::Fixed(count) => Some(format!("Fixed {count}")),
            ButtonPhase::Idle => None,
        }
    }

    /// A busy button must not start another session.
    pub fn is_busy(self) -> bool {
        !matches!(self, ButtonPhase::Fixed(_) | ButtonPhase::Idle)
    }
}

/// The control that triggers a session. Hosts pick one adapter at startup.
pub trait HostButton: Send {
    fn set_phase(&mut self, phase: ButtonPhase);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    SelectCandidate { key: String, index: usize },
    Confirm,
    Close,
    StartDownload { filename: String },
    CancelDownload { filename: String },
    CopyLink { filename: String },
}

/// Renders the resolution dialog and collects the user's input.
#[async_trait::async_trait]
pub trait ResolutionUi: Send {
    fn render(&mut self, view: &DialogView);

    /// Next user action, or `None` once input is gone.
    ///
    /// Must be cancel safe: it is raced against pushed download events.
    async fn next_action(&mut self) -> Option<UserAction>;

    /// Blocking yes/no question.
    async fn confirm(&mut self, prompt: &str) -> bool;

    fn notify(&mut self, notice: &Notice);

    /// Returns whether the text reached the clipboard.
    fn copy_to_clipboard(&mut self, _text: &str) -> bool {
        false
    }

    /// Live handle for a download row, if the host renders rows individually.
    fn control_for(&mut self, _row: &DownloadRowView) -> Option<Box<dyn DownloadControl>> {
        None
    }
}
