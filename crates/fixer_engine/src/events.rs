use fixer_core::{ProgressEvent, StatusEvent, TerminalEvent};
use fixer_logging::fixer_debug;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;

pub const PROGRESS_MESSAGE: &str = "model_fixer_download_progress";
pub const STATUS_MESSAGE: &str = "model_fixer_download_status";

pub type EventSender = mpsc::UnboundedSender<StatusEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<StatusEvent>;

/// Channel carrying pushed download events to the session driver.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Deserialize)]
struct PushEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// Decodes one `{type, data}` text frame from the server socket.
///
/// Frames for other listeners, and malformed ones, come back as `None`.
pub fn decode_push_message(text: &str) -> Option<StatusEvent> {
    let envelope: PushEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            fixer_debug!("Ignoring undecodable push frame: {}", err);
            return None;
        }
    };
    let decoded = match envelope.kind.as_str() {
        PROGRESS_MESSAGE => {
            serde_json::from_value::<ProgressEvent>(envelope.data).map(StatusEvent::Progress)
        }
        STATUS_MESSAGE => {
            serde_json::from_value::<TerminalEvent>(envelope.data).map(StatusEvent::Terminal)
        }
        _ => return None,
    };
    match decoded {
        Ok(event) => Some(event),
        Err(err) => {
            fixer_debug!("Ignoring malformed {} payload: {}", envelope.kind, err);
            None
        }
    }
}
