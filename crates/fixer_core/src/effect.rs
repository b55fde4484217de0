use std::fmt;

use crate::wire::FixInstruction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fixes the user confirmed in the dialog.
    ApplyFixes(Vec<FixInstruction>),
    StartDownload {
        url: String,
        filename: String,
        model_type: String,
    },
    /// Ask the user before cancelling. Answer with `Msg::CancelConfirmed`.
    ConfirmCancel { filename: String },
    CancelDownload { filename: String },
    CopyToClipboard { text: String },
    Notify(Notice),
}

/// Something the user should be told, usually through a blocking notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NothingToFix,
    NoIssuesFound,
    Fixed { count: usize },
    ScanTruncated,
    PipelineFailed { message: String },
    StartRejected { filename: String, message: String },
    CancelRejected { filename: String, message: String },
    DownloadFailed { filename: String, reason: String },
    DownloadCompleted { filename: String },
    CopyManually { url: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NothingToFix => {
                write!(f, "No model loader widgets found in this workflow.")
            }
            Notice::NoIssuesFound => write!(
                f,
                "No path problems found: every model path looks correct or no local file matches."
            ),
            Notice::Fixed { count } => write!(f, "Fixed {count} model path(s)."),
            Notice::ScanTruncated => write!(
                f,
                "The workflow is large; download links in notes were only partly scanned."
            ),
            Notice::PipelineFailed { message } => {
                write!(f, "Fixing paths failed: {message}. See the log for details.")
            }
            Notice::StartRejected { filename, message } => {
                write!(f, "Could not start downloading {filename}: {message}")
            }
            Notice::CancelRejected { filename, message } => {
                write!(f, "Could not cancel the download of {filename}: {message}")
            }
            Notice::DownloadFailed { filename, reason } => {
                write!(f, "Download of {filename} failed: {reason}")
            }
            Notice::DownloadCompleted { filename } => write!(
                f,
                "{filename} finished downloading. Refresh to load the new file."
            ),
            Notice::CopyManually { url } => {
                write!(f, "Copy failed, please copy the link manually: {url}")
            }
        }
    }
}
