use std::time::Duration;

use fixer_engine::{decode_push_message, EventSender};
use fixer_logging::{fixer_debug, fixer_info, fixer_warn};
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

const RECONNECT_DELAY: Duration = Duration::from_secs(2);
const MAX_CONNECT_FAILURES: u32 = 3;

/// The server socket that carries download events: `ws(s)://host/ws`.
pub(crate) fn push_url(base: &Url) -> Option<Url> {
    let mut url = base.join("ws").ok()?;
    let scheme = match base.scheme() {
        "http" => "ws",
        "https" => "wss",
        _ => return None,
    };
    url.set_scheme(scheme).ok()?;
    Some(url)
}

/// Forwards decoded download events into `sender` until the receiver goes away.
pub(crate) fn spawn_push_listener(url: Url, sender: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut failures = 0;
        while !sender.is_closed() {
            match connect_async(url.as_str()).await {
                Ok((mut stream, _)) => {
                    fixer_info!("Listening for download events on {}", url);
                    failures = 0;
                    while let Some(frame) = stream.next().await {
                        match frame {
                            Ok(Message::Text(text)) => {
                                if let Some(event) = decode_push_message(text.as_str()) {
                                    if sender.send(event).is_err() {
                                        return;
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Ok(_) => {}
                            Err(err) => {
                                fixer_warn!("Download event stream failed: {}", err);
                                break;
                            }
                        }
                    }
                    fixer_debug!("Download event stream closed");
                }
                Err(err) => {
                    failures += 1;
                    fixer_warn!("Cannot reach {} ({}): download progress will not update", url, err);
                    if failures >= MAX_CONNECT_FAILURES {
                        return;
                    }
                }
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    })
}
