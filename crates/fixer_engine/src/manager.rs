use std::collections::VecDeque;
use std::sync::Arc;

use fixer_core::{
    apply_fixes, classify, update, CancelResponse, DialogTitle, Effect, FixInstruction, FixRequest,
    FixerState, Graph, GraphScanner, Msg, Notice, StartResponse, StatusEvent,
};
use fixer_logging::{fixer_debug, fixer_error, fixer_info, fixer_warn};
use thiserror::Error;

use crate::api::FixerApi;
use crate::bridge::StatusEventBridge;
use crate::dialog::ResolutionDialogController;
use crate::events::{event_channel, EventReceiver, EventSender};
use crate::ui::{ButtonPhase, HostButton, ResolutionUi, UserAction};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("matcher reported an error: {0}")]
    Server(String),
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// No model widgets in the graph; the server was not asked.
    NothingToFix,
    NoIssuesFound,
    /// Downloads were running, so the cached results were shown instead of a scan.
    Restored { active: usize, fixed: usize },
    Completed { fixed: usize },
    Failed { message: String },
}

impl SessionOutcome {
    pub fn fixed(&self) -> usize {
        match self {
            SessionOutcome::Restored { fixed, .. } | SessionOutcome::Completed { fixed } => *fixed,
            _ => 0,
        }
    }
}

/// Drives fixing sessions and owns the download registry for the editor session.
pub struct DownloadTaskManager {
    api: Arc<dyn FixerApi>,
    scanner: GraphScanner,
    state: FixerState,
    bridge: StatusEventBridge,
    events: EventReceiver,
    sender: EventSender,
}

impl DownloadTaskManager {
    pub fn new(api: Arc<dyn FixerApi>, scanner: GraphScanner) -> Self {
        let (sender, events) = event_channel();
        Self {
            api,
            scanner,
            state: FixerState::new(),
            bridge: StatusEventBridge::new(),
            events,
            sender,
        }
    }

    /// Feed for pushed download events.
    pub fn event_sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub fn state(&self) -> &FixerState {
        &self.state
    }

    pub(crate) fn events_mut(&mut self) -> &mut EventReceiver {
        &mut self.events
    }

    /// Runs one remediation pass over `graph`.
    ///
    /// Never fails: pipeline errors are logged and reported through `ui`.
    /// Fixes applied before a failure stay applied.
    pub async fn begin_session(
        &mut self,
        graph: &mut Graph,
        button: &mut dyn HostButton,
        ui: &mut dyn ResolutionUi,
    ) -> SessionOutcome {
        self.drain_events(ui).await;
        let outcome = match self.run_pipeline(graph, button, ui).await {
            Ok(outcome) => outcome,
            Err(err) => {
                fixer_error!("Path fixing failed: {}", err);
                let message = err.to_string();
                ui.notify(&Notice::PipelineFailed {
                    message: message.clone(),
                });
                SessionOutcome::Failed { message }
            }
        };
        button.set_phase(ButtonPhase::Idle);
        outcome
    }

    async fn run_pipeline(
        &mut self,
        graph: &mut Graph,
        button: &mut dyn HostButton,
        ui: &mut dyn ResolutionUi,
    ) -> Result<SessionOutcome, PipelineError> {
        let active = self.api.active_tasks().await;
        if !active.is_empty() {
            fixer_info!(
                "{} download(s) running; showing cached results instead of scanning",
                active.len()
            );
            let count = active.len();
            self.dispatch(Msg::SessionRestored { active });
            button.set_phase(ButtonPhase::WaitingForSelection);
            let resolution = ResolutionDialogController::new(ui).resolve(self).await;
            let fixed = apply_fixes(graph, &resolution.fixes);
            self.report_fixed(fixed, button, ui);
            return Ok(SessionOutcome::Restored {
                active: count,
                fixed,
            });
        }

        button.set_phase(ButtonPhase::Scanning);
        self.dispatch(Msg::ScanStarted);
        let scan = self.scanner.scan(graph);
        if scan.truncated {
            fixer_warn!("Scan budget exceeded; link hints are incomplete");
            ui.notify(&Notice::ScanTruncated);
        }
        if scan.is_empty() {
            ui.notify(&Notice::NothingToFix);
            return Ok(SessionOutcome::NothingToFix);
        }

        button.set_phase(ButtonPhase::Matching);
        fixer_info!("Asking the server about {} model path(s)", scan.queries.len());
        let response = self
            .api
            .fix_paths(&FixRequest {
                queries: scan.queries,
                dynamic_links: scan.link_hints,
            })
            .await;
        if let Some(error) = response.error {
            return Err(PipelineError::Server(error));
        }
        if response.fixed.is_empty() {
            ui.notify(&Notice::NoIssuesFound);
            return Ok(SessionOutcome::NoIssuesFound);
        }

        let classification = classify(response.fixed);
        fixer_info!(
            "Classified {} result(s): {} auto, {} conflict, {} download, {} unknown",
            classification.len(),
            classification.auto_fixes.len(),
            classification.conflicts.len(),
            classification.downloads.len(),
            classification.unknowns.len()
        );
        // Auto fixes land before the dialog opens and are never rolled back.
        let mut fixed = apply_fixes(graph, &classification.auto_fixes);
        let needs_dialog = classification.needs_dialog();
        self.dispatch(Msg::ScanClassified(classification));

        if needs_dialog {
            button.set_phase(ButtonPhase::WaitingForSelection);
            let resolution = ResolutionDialogController::new(ui).resolve(self).await;
            fixed += apply_fixes(graph, &resolution.fixes);
        }
        self.report_fixed(fixed, button, ui);
        Ok(SessionOutcome::Completed { fixed })
    }

    fn report_fixed(&self, fixed: usize, button: &mut dyn HostButton, ui: &mut dyn ResolutionUi) {
        if fixed > 0 {
            button.set_phase(ButtonPhase::Fixed(fixed));
            ui.notify(&Notice::Fixed { count: fixed });
        }
    }

    /// Start button of a download row.
    pub async fn start_download(&mut self, filename: &str, ui: &mut dyn ResolutionUi) {
        self.perform(
            UserAction::StartDownload {
                filename: filename.to_string(),
            },
            ui,
        )
        .await;
    }

    /// Cancel button of a download row. Asks the user first.
    pub async fn cancel_download(&mut self, filename: &str, ui: &mut dyn ResolutionUi) {
        self.perform(
            UserAction::CancelDownload {
                filename: filename.to_string(),
            },
            ui,
        )
        .await;
    }

    /// Applies one pushed event through the bridge.
    pub async fn handle_event(&mut self, event: StatusEvent, ui: &mut dyn ResolutionUi) {
        let shown_by_control = self.bridge.is_registered(event.filename());
        let title_before = self.dialog_title();
        let state = std::mem::take(&mut self.state);
        let (state, effects) = self.bridge.reconcile(state, event);
        self.state = state;
        if shown_by_control && self.dialog_title() == title_before {
            // The row control already reflects the change.
            self.state.consume_dirty();
        }
        self.run_effects(effects, ui).await;
    }

    fn dialog_title(&self) -> Option<DialogTitle> {
        self.state.view().dialog.map(|dialog| dialog.title)
    }

    /// Runs a user action; returns fixes the user confirmed.
    pub(crate) async fn perform(
        &mut self,
        action: UserAction,
        ui: &mut dyn ResolutionUi,
    ) -> Vec<FixInstruction> {
        fixer_debug!("User action {:?}", action);
        let msg = match action {
            UserAction::SelectCandidate { key, index } => Msg::ConflictSelected { key, index },
            UserAction::Confirm => Msg::DialogConfirmed,
            UserAction::Close => Msg::DialogClosed,
            UserAction::StartDownload { filename } => Msg::StartClicked { filename },
            UserAction::CancelDownload { filename } => Msg::CancelClicked { filename },
            UserAction::CopyLink { filename } => Msg::CopyLinkClicked { filename },
        };
        let effects = self.dispatch(msg);
        self.run_effects(effects, ui).await
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }

    async fn run_effects(
        &mut self,
        effects: Vec<Effect>,
        ui: &mut dyn ResolutionUi,
    ) -> Vec<FixInstruction> {
        let mut confirmed = Vec::new();
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            let follow_up = match effect {
                Effect::ApplyFixes(fixes) => {
                    confirmed.extend(fixes);
                    Vec::new()
                }
                Effect::StartDownload {
                    url,
                    filename,
                    model_type,
                } => {
                    // Show the disabled control before suspending.
                    self.render(ui);
                    let response: StartResponse =
                        self.api.start_download(&url, &filename, &model_type).await;
                    self.dispatch(Msg::StartResponded { filename, response })
                }
                Effect::ConfirmCancel { filename } => {
                    let prompt = format!("Cancel the download of {filename}?");
                    let confirmed = ui.confirm(&prompt).await;
                    self.dispatch(Msg::CancelConfirmed {
                        filename,
                        confirmed,
                    })
                }
                Effect::CancelDownload { filename } => {
                    self.render(ui);
                    let response: CancelResponse = self.api.cancel_download(&filename).await;
                    self.dispatch(Msg::CancelResponded { filename, response })
                }
                Effect::CopyToClipboard { text } => {
                    if !ui.copy_to_clipboard(&text) {
                        ui.notify(&Notice::CopyManually { url: text });
                    }
                    Vec::new()
                }
                Effect::Notify(notice) => {
                    ui.notify(&notice);
                    Vec::new()
                }
            };
            queue.extend(follow_up);
        }
        self.render(ui);
        confirmed
    }

    /// Redraws the dialog if anything changed and keeps row controls in step with it.
    pub(crate) fn render(&mut self, ui: &mut dyn ResolutionUi) {
        if !self.state.consume_dirty() {
            return;
        }
        let Some(view) = self.state.view().dialog else {
            self.bridge.clear();
            return;
        };
        ui.render(&view);

        for filename in self.bridge.registered_filenames() {
            if !view.downloads.iter().any(|row| row.filename == filename) {
                self.bridge.unregister(&filename);
            }
        }
        for row in &view.downloads {
            if self.bridge.is_registered(&row.filename) {
                continue;
            }
            if let Some(control) = ui.control_for(row) {
                self.bridge.register(&row.filename, control);
            }
        }
    }

    async fn drain_events(&mut self, ui: &mut dyn ResolutionUi) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event, ui).await;
        }
    }
}
