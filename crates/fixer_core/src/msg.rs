use crate::classify::Classification;
use crate::wire::{CancelResponse, StartResponse, StatusEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A fresh scan is starting; the cached classification is dropped.
    ScanStarted,
    /// Matcher output was classified (AutoFixes are already applied).
    ScanClassified(Classification),
    /// The dialog was reopened while the server reports running downloads.
    SessionRestored { active: Vec<String> },
    /// User picked candidate `index` for conflict row `key`.
    ConflictSelected { key: String, index: usize },
    /// User confirmed the conflict choices.
    DialogConfirmed,
    /// User closed the dialog without confirming.
    DialogClosed,
    StartClicked { filename: String },
    StartResponded {
        filename: String,
        response: StartResponse,
    },
    CancelClicked { filename: String },
    /// Answer to `Effect::ConfirmCancel`.
    CancelConfirmed { filename: String, confirmed: bool },
    CancelResponded {
        filename: String,
        response: CancelResponse,
    },
    CopyLinkClicked { filename: String },
    /// Pushed progress or terminal event.
    Status(StatusEvent),
    /// Fallback for placeholder wiring.
    NoOp,
}
