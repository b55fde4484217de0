use fixer_core::{FixInstruction, StatusEvent};
use fixer_logging::fixer_debug;

use crate::manager::DownloadTaskManager;
use crate::ui::{ResolutionUi, UserAction};

/// What the user decided before the dialog closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub fixes: Vec<FixInstruction>,
    pub confirmed: bool,
}

enum Step {
    Event(StatusEvent),
    Action(Option<UserAction>),
}

/// Presents the resolution dialog and waits for the user to finish with it.
///
/// Pushed download events keep flowing into the open dialog while the user
/// decides.
pub struct ResolutionDialogController<'a> {
    ui: &'a mut dyn ResolutionUi,
}

impl<'a> ResolutionDialogController<'a> {
    pub fn new(ui: &'a mut dyn ResolutionUi) -> Self {
        Self { ui }
    }

    /// Resolves once the dialog is confirmed or closed.
    pub async fn resolve(self, manager: &mut DownloadTaskManager) -> Resolution {
        let ui = self.ui;
        let mut resolution = Resolution::default();
        manager.render(ui);

        while manager.state().is_dialog_open() {
            let step = tokio::select! {
                biased;
                Some(event) = manager.events_mut().recv() => Step::Event(event),
                action = ui.next_action() => Step::Action(action),
            };
            match step {
                Step::Event(event) => manager.handle_event(event, ui).await,
                Step::Action(None) => {
                    fixer_debug!("Input closed; closing the dialog");
                    manager.perform(UserAction::Close, ui).await;
                }
                Step::Action(Some(action)) => {
                    let confirm = action == UserAction::Confirm;
                    let fixes = manager.perform(action, ui).await;
                    if confirm && !manager.state().is_dialog_open() {
                        resolution.confirmed = true;
                    }
                    resolution.fixes.extend(fixes);
                }
            }
        }
        resolution
    }
}
