//! Path fixer engine: server client, push events and the session driver.
mod api;
mod bridge;
mod dialog;
mod events;
mod manager;
mod persist;
mod ui;

pub use api::{ApiError, ApiSettings, FixerApi, HttpFixerApi, DEFAULT_SOURCE};
pub use bridge::{DownloadControl, StatusEventBridge};
pub use dialog::{Resolution, ResolutionDialogController};
pub use events::{
    decode_push_message, event_channel, EventReceiver, EventSender, PROGRESS_MESSAGE,
    STATUS_MESSAGE,
};
pub use manager::{DownloadTaskManager, PipelineError, SessionOutcome};
pub use persist::{load_workflow, save_workflow, PersistError};
pub use ui::{ButtonPhase, HostButton, ResolutionUi, UserAction};
