use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use fixer_core::{
    DialogTitle, DialogView, DownloadFailure, DownloadRowView, DownloadState, Graph, GraphScanner, Node, Notice,
    ProgressEvent, StatusEvent, TerminalEvent, Widget, USER_CANCELLED,
};
use fixer_engine::{
    ApiSettings, ButtonPhase, DownloadControl, DownloadTaskManager, EventSender, HostButton, HttpFixerApi,
    ResolutionUi, SessionOutcome, UserAction,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CKPT: &str = "base.safetensors";
const CKPT_URL: &str = "https://hf-mirror.com/org/sdxl/resolve/main/base.safetensors";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(fixer_logging::initialize_for_tests);
}

enum Step {
    Act(UserAction),
    /// Delivered through the event channel before the next action is read.
    Push(StatusEvent),
}

struct ScriptedUi {
    script: VecDeque<Step>,
    sender: EventSender,
    answers: VecDeque<bool>,
    renders: Vec<DialogView>,
    notices: Vec<Notice>,
    prompts: Vec<String>,
    control_updates: Option<Arc<AtomicUsize>>,
}

impl ScriptedUi {
    fn new(sender: EventSender, script: Vec<Step>) -> Self {
        Self {
            script: script.into(),
            sender,
            answers: VecDeque::new(),
            renders: Vec::new(),
            notices: Vec::new(),
            prompts: Vec::new(),
            control_updates: None,
        }
    }

    /// Hands out a row control per download row, counting its updates.
    fn with_controls(mut self, updates: Arc<AtomicUsize>) -> Self {
        self.control_updates = Some(updates);
        self
    }

    fn answering(mut self, answers: &[bool]) -> Self {
        self.answers = answers.iter().copied().collect();
        self
    }
}

#[async_trait::async_trait]
impl ResolutionUi for ScriptedUi {
    fn render(&mut self, view: &DialogView) {
        self.renders.push(view.clone());
    }

    async fn next_action(&mut self) -> Option<UserAction> {
        loop {
            match self.script.pop_front()? {
                Step::Act(action) => return Some(action),
                Step::Push(event) => {
                    let _ = self.sender.send(event);
                    tokio::task::yield_now().await;
                }
            }
        }
    }

    async fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(false)
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }

    fn control_for(&mut self, _row: &DownloadRowView) -> Option<Box<dyn DownloadControl>> {
        let updates = self.control_updates.clone()?;
        Some(Box::new(CountingControl { updates }))
    }
}

struct CountingControl {
    updates: Arc<AtomicUsize>,
}

impl DownloadControl for CountingControl {
    fn set_progress(&mut self, _row: &DownloadRowView) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn set_terminal(&mut self, _row: &DownloadRowView) {
        self.updates.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct RecordingButton {
    phases: Vec<ButtonPhase>,
}

impl HostButton for RecordingButton {
    fn set_phase(&mut self, phase: ButtonPhase) {
        self.phases.push(phase);
    }
}

fn manager_for(server: &MockServer) -> DownloadTaskManager {
    let api = HttpFixerApi::new(ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("valid base url");
    DownloadTaskManager::new(Arc::new(api), GraphScanner::default())
}

async fn mount_active(server: &MockServer, active: Value, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path("/model_path_fixer/active_tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "active": active })));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

async fn mount_fix(server: &MockServer, fixed: Value, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/fix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fixed": fixed })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn checkpoint_graph(calls: Arc<AtomicUsize>) -> Graph {
    Graph::new(vec![Node::new(1, "CheckpointLoaderSimple").with_widget(
        Widget::new("ckpt_name", "old/model.safetensors")
            .with_option_values(["other.safetensors"])
            .with_callback(Arc::new(move |_: &Value| {
                calls.fetch_add(1, Ordering::SeqCst);
            })),
    )])
}

fn lora_graph() -> Graph {
    Graph::new(vec![
        Node::new(7, "LoraLoader").with_widget(Widget::new("lora_name", "model.safetensors")),
        Node::new(3, "CheckpointLoaderSimple")
            .with_widget(Widget::new("ckpt_name", format!("sdxl/{CKPT}"))),
    ])
}

fn widget_text(graph: &Graph, id: u64, name: &str) -> String {
    graph
        .node_by_id(id)
        .and_then(|node| node.widget(name))
        .and_then(|widget| widget.text())
        .unwrap_or_default()
        .to_string()
}

fn conflict_and_download() -> Value {
    json!([
        {
            "id": 7,
            "widget_name": "lora_name",
            "old_value": "model.safetensors",
            "candidates": ["a/model.safetensors", "b/model.safetensors"]
        },
        {
            "id": 3,
            "widget_name": "ckpt_name",
            "old_value": format!("sdxl/{CKPT}"),
            "candidates": [],
            "download_url": CKPT_URL,
            "model_type": "checkpoints"
        }
    ])
}

fn progress(current: u64, total: u64) -> StatusEvent {
    StatusEvent::Progress(ProgressEvent {
        filename: CKPT.to_string(),
        current,
        total,
    })
}

fn terminal(success: bool, error: Option<&str>) -> StatusEvent {
    StatusEvent::Terminal(TerminalEvent {
        filename: CKPT.to_string(),
        success,
        error: error.map(str::to_string),
    })
}

#[tokio::test]
async fn single_candidate_is_applied_without_a_dialog() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(
        &server,
        json!([{
            "id": 1,
            "widget_name": "ckpt_name",
            "old_value": "old/model.safetensors",
            "candidates": ["new/model.safetensors"]
        }]),
        1,
    )
    .await;
    let calls = Arc::new(AtomicUsize::new(0));
    let mut graph = checkpoint_graph(calls.clone());
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(manager.event_sender(), Vec::new());
    let mut button = RecordingButton::default();

    let outcome = manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(outcome, SessionOutcome::Completed { fixed: 1 });
    assert_eq!(widget_text(&graph, 1, "ckpt_name"), "new/model.safetensors");
    let options: Vec<String> = graph
        .node_by_id(1)
        .and_then(|node| node.widget("ckpt_name"))
        .map(|widget| widget.option_strings().iter().map(|s| s.to_string()).collect())
        .unwrap_or_default();
    assert_eq!(options, vec!["other.safetensors", "new/model.safetensors"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(graph.consume_dirty());
    assert!(ui.renders.is_empty());
    assert_eq!(ui.notices, vec![Notice::Fixed { count: 1 }]);
    assert_eq!(
        button.phases,
        vec![
            ButtonPhase::Scanning,
            ButtonPhase::Matching,
            ButtonPhase::Fixed(1),
            ButtonPhase::Idle,
        ]
    );
}

#[tokio::test]
async fn chosen_conflict_candidate_is_applied() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(
        &server,
        json!([{
            "id": 7,
            "widget_name": "lora_name",
            "old_value": "model.safetensors",
            "candidates": ["a/model.safetensors", "b/model.safetensors"]
        }]),
        1,
    )
    .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::SelectCandidate {
                key: "7-lora_name".to_string(),
                index: 1,
            }),
            Step::Act(UserAction::Confirm),
        ],
    );
    let mut button = RecordingButton::default();

    let outcome = manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(outcome, SessionOutcome::Completed { fixed: 1 });
    assert_eq!(widget_text(&graph, 7, "lora_name"), "b/model.safetensors");
    assert_eq!(ui.renders[0].title, DialogTitle::ScanResults);
    assert_eq!(ui.renders.last().map(|view| view.conflicts[0].selected), Some(1));
    assert!(button.phases.contains(&ButtonPhase::WaitingForSelection));
    assert!(!manager.state().is_dialog_open());
}

#[tokio::test]
async fn cancelled_download_ends_quietly() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, conflict_and_download(), 1).await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/download"))
        .and(body_json(json!({
            "url": CKPT_URL,
            "filename": CKPT,
            "model_type": "checkpoints",
            "source": "HF Mirror"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "status": "started"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/cancel"))
        .and(body_json(json!({ "filename": CKPT })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::StartDownload {
                filename: CKPT.to_string(),
            }),
            Step::Push(progress(10, 100)),
            Step::Act(UserAction::CancelDownload {
                filename: CKPT.to_string(),
            }),
            Step::Push(terminal(false, Some(USER_CANCELLED))),
            Step::Act(UserAction::Close),
        ],
    )
    .answering(&[true]);
    let mut button = RecordingButton::default();

    let outcome = manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(outcome, SessionOutcome::Completed { fixed: 0 });
    assert_eq!(ui.prompts, vec![format!("Cancel the download of {CKPT}?")]);
    assert!(ui.notices.is_empty(), "unexpected notices {:?}", ui.notices);
    assert_eq!(
        manager.state().task(CKPT).map(|task| task.state.clone()),
        Some(DownloadState::Failed(DownloadFailure::Cancelled))
    );

    let labels: Vec<String> = ui
        .renders
        .iter()
        .filter_map(|view| view.downloads.first())
        .map(|row| row.button.label.clone())
        .collect();
    assert_eq!(labels.first().map(String::as_str), Some("Start background download"));
    assert!(labels.iter().any(|label| label == "Requesting..."));
    assert!(labels.iter().any(|label| label == "Cancel download"));
    assert!(labels.iter().any(|label| label == "Cancelling..."));
    assert_eq!(labels.last().map(String::as_str), Some("Cancelled, start again"));
    // Conflict left unconfirmed: widget untouched.
    assert_eq!(widget_text(&graph, 7, "lora_name"), "model.safetensors");
}

#[tokio::test]
async fn declined_cancel_sends_nothing() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, conflict_and_download(), 1).await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::StartDownload {
                filename: CKPT.to_string(),
            }),
            Step::Act(UserAction::CancelDownload {
                filename: CKPT.to_string(),
            }),
            Step::Act(UserAction::Close),
        ],
    )
    .answering(&[false]);
    let mut button = RecordingButton::default();

    manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(ui.prompts.len(), 1);
    assert_eq!(
        manager.state().task(CKPT).map(|task| task.state.clone()),
        Some(DownloadState::Active)
    );
}

#[tokio::test]
async fn completion_wins_over_late_progress() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, conflict_and_download(), 1).await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::StartDownload {
                filename: CKPT.to_string(),
            }),
            Step::Push(progress(50, 100)),
            Step::Push(terminal(true, None)),
            Step::Push(progress(60, 100)),
            Step::Act(UserAction::Close),
        ],
    );
    let mut button = RecordingButton::default();

    manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(
        ui.notices,
        vec![Notice::DownloadCompleted {
            filename: CKPT.to_string(),
        }]
    );
    assert_eq!(
        manager.state().task(CKPT).map(|task| task.state.clone()),
        Some(DownloadState::Completed)
    );
    let last = ui.renders.last().and_then(|view| view.downloads.first().cloned());
    assert_eq!(
        last.map(|row| row.button.label),
        Some("Downloaded, refresh to load".to_string())
    );
}

#[tokio::test]
async fn row_controls_take_progress_but_completion_redraws_the_title() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, conflict_and_download(), 1).await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let updates = Arc::new(AtomicUsize::new(0));
    let mut ui = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::StartDownload {
                filename: CKPT.to_string(),
            }),
            Step::Push(progress(50, 100)),
            Step::Push(terminal(true, None)),
            Step::Act(UserAction::Close),
        ],
    )
    .with_controls(updates.clone());
    let mut button = RecordingButton::default();

    manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(updates.load(Ordering::SeqCst), 2);
    // Progress went to the control only, not through a full redraw.
    assert!(!ui.renders.iter().any(|view| {
        view.title == DialogTitle::Downloading && view.downloads[0].progress_percent == Some(50)
    }));
    let titles: Vec<DialogTitle> = ui.renders.iter().map(|view| view.title).collect();
    assert!(titles.contains(&DialogTitle::Downloading));
    assert_eq!(titles.last(), Some(&DialogTitle::MissingModels));
}

#[tokio::test]
async fn failed_download_alerts_with_reason() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, conflict_and_download(), 1).await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::StartDownload {
                filename: CKPT.to_string(),
            }),
            Step::Push(terminal(false, Some("connection reset"))),
            Step::Act(UserAction::Close),
        ],
    );
    let mut button = RecordingButton::default();

    manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(
        ui.notices,
        vec![Notice::DownloadFailed {
            filename: CKPT.to_string(),
            reason: "connection reset".to_string(),
        }]
    );
    let last = ui.renders.last().and_then(|view| view.downloads.first().cloned());
    assert_eq!(last.map(|row| row.button.label), Some("Failed, retry".to_string()));
}

#[tokio::test]
async fn rejected_start_is_reported_and_startable_again() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, conflict_and_download(), 1).await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "status": "downloading",
            "message": "already downloading"
        })))
        .mount(&server)
        .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::StartDownload {
                filename: CKPT.to_string(),
            }),
            Step::Act(UserAction::Close),
        ],
    );
    let mut button = RecordingButton::default();

    manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(
        ui.notices,
        vec![Notice::StartRejected {
            filename: CKPT.to_string(),
            message: "already downloading".to_string(),
        }]
    );
    assert_eq!(
        manager.state().task(CKPT).map(|task| task.state.clone()),
        Some(DownloadState::Idle)
    );
}

#[tokio::test]
async fn graph_without_model_widgets_never_asks_the_server() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, json!([]), 0).await;
    let mut graph = Graph::new(vec![
        Node::new(1, "KSampler").with_widget(Widget::new("seed", 1)),
        Node::new(2, "Note").with_widget(Widget::new("text", "hello")),
    ]);
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(manager.event_sender(), Vec::new());
    let mut button = RecordingButton::default();

    let outcome = manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(outcome, SessionOutcome::NothingToFix);
    assert_eq!(ui.notices, vec![Notice::NothingToFix]);
    assert_eq!(
        button.phases,
        vec![ButtonPhase::Scanning, ButtonPhase::Idle]
    );
}

#[tokio::test]
async fn empty_server_answer_reports_no_issues() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, json!([]), 1).await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(manager.event_sender(), Vec::new());
    let mut button = RecordingButton::default();

    let outcome = manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(outcome, SessionOutcome::NoIssuesFound);
    assert_eq!(ui.notices, vec![Notice::NoIssuesFound]);
    assert!(!graph.consume_dirty());
}

#[tokio::test]
async fn matcher_error_fails_the_session() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/fix"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"fixed": [], "error": "index missing"})),
        )
        .mount(&server)
        .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(manager.event_sender(), Vec::new());
    let mut button = RecordingButton::default();

    let outcome = manager.begin_session(&mut graph, &mut button, &mut ui).await;

    let message = "matcher reported an error: index missing".to_string();
    assert_eq!(outcome, SessionOutcome::Failed { message: message.clone() });
    assert_eq!(ui.notices, vec![Notice::PipelineFailed { message }]);
    assert_eq!(button.phases.last(), Some(&ButtonPhase::Idle));
}

#[tokio::test]
async fn running_downloads_reopen_cached_results_without_a_new_scan() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), Some(1)).await;
    mount_active(&server, json!([CKPT]), None).await;
    mount_fix(&server, conflict_and_download(), 1).await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut button = RecordingButton::default();

    let mut first = ScriptedUi::new(manager.event_sender(), vec![Step::Act(UserAction::Close)]);
    let outcome = manager.begin_session(&mut graph, &mut button, &mut first).await;
    assert_eq!(outcome, SessionOutcome::Completed { fixed: 0 });

    let mut second = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::SelectCandidate {
                key: "7-lora_name".to_string(),
                index: 1,
            }),
            Step::Act(UserAction::Confirm),
        ],
    );
    let outcome = manager.begin_session(&mut graph, &mut button, &mut second).await;

    assert_eq!(outcome, SessionOutcome::Restored { active: 1, fixed: 1 });
    let reopened = &second.renders[0];
    assert_eq!(reopened.title, DialogTitle::Downloading);
    assert_eq!(reopened.conflicts.len(), 1);
    assert_eq!(reopened.downloads.len(), 1);
    assert_eq!(reopened.downloads[0].filename, CKPT);
    assert_eq!(reopened.downloads[0].button.label, "Cancel download");
    assert_eq!(widget_text(&graph, 7, "lora_name"), "b/model.safetensors");
}

#[tokio::test]
async fn restore_after_lost_cache_shows_active_downloads_only() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!(["flux1-dev.safetensors"]), None).await;
    mount_fix(&server, json!([]), 0).await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut ui = ScriptedUi::new(manager.event_sender(), vec![Step::Act(UserAction::Close)]);
    let mut button = RecordingButton::default();

    let outcome = manager.begin_session(&mut graph, &mut button, &mut ui).await;

    assert_eq!(outcome, SessionOutcome::Restored { active: 1, fixed: 0 });
    let view = &ui.renders[0];
    assert!(view.conflicts.is_empty());
    assert!(view.unknowns.is_empty());
    assert_eq!(view.downloads[0].filename, "flux1-dev.safetensors");
    assert_eq!(view.downloads[0].url, None);
}

#[tokio::test]
async fn events_pushed_between_sessions_are_applied_first() {
    init_logging();
    let server = MockServer::start().await;
    mount_active(&server, json!([]), None).await;
    mount_fix(&server, conflict_and_download(), 2).await;
    Mock::given(method("POST"))
        .and(path("/model_path_fixer/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;
    let mut graph = lora_graph();
    let mut manager = manager_for(&server);
    let mut button = RecordingButton::default();
    let mut first = ScriptedUi::new(
        manager.event_sender(),
        vec![
            Step::Act(UserAction::StartDownload {
                filename: CKPT.to_string(),
            }),
            Step::Act(UserAction::Close),
        ],
    );
    manager.begin_session(&mut graph, &mut button, &mut first).await;

    manager
        .event_sender()
        .send(terminal(true, None))
        .expect("channel open");
    let mut second = ScriptedUi::new(manager.event_sender(), vec![Step::Act(UserAction::Close)]);
    manager.begin_session(&mut graph, &mut button, &mut second).await;

    assert_eq!(
        second.notices.first(),
        Some(&Notice::DownloadCompleted {
            filename: CKPT.to_string(),
        })
    );
    assert_eq!(
        second.renders[0].downloads[0].button.label,
        "Start background download"
    );
}
