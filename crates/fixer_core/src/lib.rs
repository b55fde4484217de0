//! Path fixer core: graph scanning, classification, fix application and the
//! pure download/dialog state machine.
mod apply;
mod cache;
mod classify;
mod dialog;
mod download;
mod effect;
mod graph;
mod hints;
mod msg;
mod scan;
mod state;
mod update;
mod view_model;
mod wire;

pub use apply::{apply_fixes, ensure_widget_option, paths_equivalent};
pub use cache::ScanResultCache;
pub use classify::{bucket_of, classify, Bucket, Classification};
pub use dialog::{ConflictChoice, DialogModel};
pub use download::{
    control_key, download_filename, DownloadFailure, DownloadState, DownloadTask, Progress,
};
pub use effect::{Effect, Notice};
pub use graph::{Graph, Node, NodeId, ResizeHook, Widget, WidgetCallback, WidgetOptions};
pub use hints::{canonical_category, extract_link_hints, looks_like_free_text, UNCATEGORIZED};
pub use msg::Msg;
pub use scan::{is_model_widget, GraphScanner, ScanOutput, ScanSettings, DEFAULT_SCAN_BUDGET};
pub use state::FixerState;
pub use update::update;
pub use view_model::{
    button_view, download_row, ButtonAction, ButtonView, ConflictRowView, DialogTitle,
    DialogView, DownloadRowView, FixerViewModel, UnknownRowView, DIALOG_NOTICE,
};
pub use wire::{
    ActiveTasksResponse, CancelRequest, CancelResponse, FixInstruction, FixRequest, FixResponse,
    LinkHints, MatchResult, ProgressEvent, Query, StartOutcome, StartRequest, StartResponse,
    StatusEvent, TerminalEvent, USER_CANCELLED,
};
