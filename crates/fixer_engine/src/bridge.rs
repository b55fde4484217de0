use std::collections::HashMap;

use fixer_core::{control_key, download_row, update, DownloadRowView, Effect, FixerState, Msg, StatusEvent};
use fixer_logging::fixer_debug;

/// Live handle for one rendered download row.
pub trait DownloadControl: Send {
    /// Progress arrived; the row is cancellable again.
    fn set_progress(&mut self, row: &DownloadRowView);
    /// The download finished, failed or was cancelled.
    fn set_terminal(&mut self, row: &DownloadRowView);
}

struct Registered {
    filename: String,
    control: Box<dyn DownloadControl>,
}

/// Routes pushed download events to the rows currently on screen.
///
/// Controls are keyed by [`control_key`] of the filename. Events are applied
/// in arrival order; nothing is reordered or debounced.
#[derive(Default)]
pub struct StatusEventBridge {
    controls: HashMap<String, Registered>,
}

impl StatusEventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the control previously registered for the same filename.
    pub fn register(
        &mut self,
        filename: &str,
        control: Box<dyn DownloadControl>,
    ) -> Option<Box<dyn DownloadControl>> {
        self.controls
            .insert(
                control_key(filename),
                Registered {
                    filename: filename.to_string(),
                    control,
                },
            )
            .map(|previous| previous.control)
    }

    pub fn unregister(&mut self, filename: &str) -> Option<Box<dyn DownloadControl>> {
        self.controls
            .remove(&control_key(filename))
            .map(|registered| registered.control)
    }

    pub fn is_registered(&self, filename: &str) -> bool {
        self.controls.contains_key(&control_key(filename))
    }

    pub fn registered_filenames(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .controls
            .values()
            .map(|registered| registered.filename.clone())
            .collect();
        names.sort();
        names
    }

    pub fn clear(&mut self) {
        self.controls.clear();
    }

    /// Computes the next state for `event` and pushes the changed row to its control.
    pub fn reconcile(&mut self, state: FixerState, event: StatusEvent) -> (FixerState, Vec<Effect>) {
        let filename = event.filename().to_string();
        let terminal = event.is_terminal();
        let before = state.task(&filename).cloned();

        let (state, effects) = update(state, Msg::Status(event));

        let Some(task) = state.task(&filename) else {
            return (state, effects);
        };
        if before.as_ref() == Some(task) {
            fixer_debug!("Event for {} changed nothing", filename);
            return (state, effects);
        }
        if let Some(registered) = self.controls.get_mut(&control_key(&filename)) {
            let row = download_row(task);
            if terminal {
                registered.control.set_terminal(&row);
            } else {
                registered.control.set_progress(&row);
            }
        }
        (state, effects)
    }
}
