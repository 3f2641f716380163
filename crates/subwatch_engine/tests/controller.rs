use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use pretty_assertions::assert_eq;
use subwatch_core::{
    AppState, AppViewModel, Category, Item, ItemSnapshot, ItemStatus, Msg, PollPhase, RowState,
    StatusSnapshot,
};
use subwatch_engine::{
    Backend, BackendError, BackendSettings, Controller, FailureKind, HttpBackend, ViewSink,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(subwatch_logging::initialize_for_tests);
}

#[derive(Clone, Default)]
struct RecordingSink {
    views: Arc<Mutex<Vec<AppViewModel>>>,
}

impl RecordingSink {
    fn last(&self) -> AppViewModel {
        self.views.lock().unwrap().last().cloned().expect("a rendered view")
    }

    fn count(&self) -> usize {
        self.views.lock().unwrap().len()
    }
}

impl ViewSink for RecordingSink {
    fn render(&mut self, view: &AppViewModel) {
        self.views.lock().unwrap().push(view.clone());
    }
}

/// Plays back a fixed sequence of status results.
struct ScriptedBackend {
    items: Vec<Item>,
    statuses: Mutex<VecDeque<Result<StatusSnapshot, BackendError>>>,
    status_calls: Arc<AtomicUsize>,
    download_calls: Arc<AtomicUsize>,
    /// Cancelled right after the given status call returns.
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedBackend {
    fn new(item_count: usize, statuses: Vec<Result<StatusSnapshot, BackendError>>) -> Self {
        Self {
            items: (0..item_count)
                .map(|i| Item {
                    file: format!("/videos/ABC-{i:03}.mp4"),
                    code: Some(format!("ABC-{i:03}")),
                    has_subtitle: false,
                })
                .collect(),
            statuses: Mutex::new(statuses.into()),
            status_calls: Arc::new(AtomicUsize::new(0)),
            download_calls: Arc::new(AtomicUsize::new(0)),
            cancel_after: None,
        }
    }
}

#[async_trait::async_trait]
impl Backend for ScriptedBackend {
    async fn scan(&self) -> Result<Vec<Item>, BackendError> {
        Ok(self.items.clone())
    }

    async fn start_download(&self) -> Result<(), BackendError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn status(&self) -> Result<StatusSnapshot, BackendError> {
        let call = self.status_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, token)) = &self.cancel_after {
            if call == *after {
                token.cancel();
            }
        }
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::new(FailureKind::Network, "script exhausted")))
    }
}

fn running(status: ItemStatus, log: &[&str]) -> ItemSnapshot {
    ItemSnapshot::new(status, log.iter().copied())
}

fn fast_state() -> AppState {
    AppState::with_poll_interval(Duration::from_millis(5))
}

#[tokio::test]
async fn polls_until_backend_reports_finished() {
    init_logging();
    let backend = ScriptedBackend::new(
        2,
        vec![
            Ok(StatusSnapshot {
                items: vec![
                    running(ItemStatus::Downloading, &["Searching subtitlecat"]),
                    running(ItemStatus::Unknown, &[]),
                ],
                finished: false,
            }),
            Ok(StatusSnapshot {
                items: vec![
                    running(ItemStatus::Success, &["Saved ABC-000.srt"]),
                    running(ItemStatus::Downloading, &[]),
                ],
                finished: false,
            }),
            Ok(StatusSnapshot {
                items: vec![
                    running(ItemStatus::Success, &["Saved ABC-000.srt"]),
                    running(ItemStatus::Failed, &["Error: no source"]),
                ],
                finished: true,
            }),
        ],
    );
    let calls = backend.status_calls.clone();
    let sink = RecordingSink::default();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(sink.clone()),
        fast_state(),
        CancellationToken::new(),
    );

    assert_eq!(controller.dispatch(Msg::ScanClicked).await, PollPhase::Idle);
    assert!(sink.last().download_enabled);
    assert_eq!(sink.last().rows.len(), 2);

    let phase = controller.dispatch(Msg::DownloadClicked).await;

    assert_eq!(phase, PollPhase::Stopped);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let view = sink.last();
    assert_eq!(view.progress.completed, 2);
    assert_eq!(view.progress.percent(), 100.0);
    assert_eq!(view.rows[0].state, RowState::Success);
    assert_eq!(view.rows[1].state, RowState::Failed);
    assert_eq!(view.rows[1].log[0].category, Category::Error);
    assert_eq!(view.cycles, 3);
}

#[tokio::test]
async fn intermediate_views_show_partial_progress() {
    let backend = ScriptedBackend::new(
        2,
        vec![
            Ok(StatusSnapshot {
                items: vec![
                    running(ItemStatus::Downloading, &[]),
                    running(ItemStatus::Failed, &["Error: no source"]),
                ],
                finished: false,
            }),
            Ok(StatusSnapshot {
                items: vec![
                    running(ItemStatus::Success, &["Saved"]),
                    running(ItemStatus::Failed, &["Error: no source"]),
                ],
                finished: true,
            }),
        ],
    );
    let sink = RecordingSink::default();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(sink.clone()),
        fast_state(),
        CancellationToken::new(),
    );

    controller.dispatch(Msg::ScanClicked).await;
    controller.dispatch(Msg::DownloadClicked).await;

    let percents: Vec<f64> = sink
        .views
        .lock()
        .unwrap()
        .iter()
        .filter(|view| view.cycles > 0)
        .map(|view| view.progress.percent())
        .collect();
    assert_eq!(percents, vec![50.0, 100.0]);
}

#[tokio::test]
async fn status_failure_halts_polling() {
    init_logging();
    let backend = ScriptedBackend::new(
        1,
        vec![
            Ok(StatusSnapshot {
                items: vec![running(ItemStatus::Downloading, &["Searching"])],
                finished: false,
            }),
            Err(BackendError::new(FailureKind::Network, "connection reset")),
            Ok(StatusSnapshot {
                items: vec![running(ItemStatus::Success, &["Saved"])],
                finished: true,
            }),
        ],
    );
    let calls = backend.status_calls.clone();
    let sink = RecordingSink::default();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(sink.clone()),
        fast_state(),
        CancellationToken::new(),
    );

    controller.dispatch(Msg::ScanClicked).await;
    let phase = controller.dispatch(Msg::DownloadClicked).await;

    assert_eq!(phase, PollPhase::Failed);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let view = sink.last();
    assert_eq!(
        view.last_error.as_deref(),
        Some("status poll failed: network error: connection reset")
    );
    // Rows keep what the last good snapshot rendered.
    assert_eq!(view.rows[0].state, RowState::Downloading);
    assert_eq!(view.rows[0].log[0].text, "Searching");
}

#[tokio::test]
async fn cancellation_stops_before_next_fetch() {
    let cancel = CancellationToken::new();
    let mut backend = ScriptedBackend::new(
        1,
        vec![
            Ok(StatusSnapshot {
                items: vec![running(ItemStatus::Downloading, &[])],
                finished: false,
            }),
            Ok(StatusSnapshot {
                items: vec![running(ItemStatus::Downloading, &[])],
                finished: false,
            }),
            Ok(StatusSnapshot {
                items: vec![running(ItemStatus::Success, &["Saved"])],
                finished: true,
            }),
        ],
    );
    backend.cancel_after = Some((2, cancel.clone()));
    let calls = backend.status_calls.clone();
    let sink = RecordingSink::default();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(sink.clone()),
        AppState::new(),
        cancel,
    );

    controller.dispatch(Msg::ScanClicked).await;
    let phase = controller.dispatch(Msg::DownloadClicked).await;

    assert_eq!(phase, PollPhase::Cancelled);
    // The in-flight second fetch is abandoned and no third one starts.
    assert!(calls.load(Ordering::SeqCst) <= 2);
    assert_eq!(sink.last().phase, PollPhase::Cancelled);
}

#[tokio::test]
async fn token_cancelled_up_front_never_starts_download() {
    let backend = ScriptedBackend::new(1, Vec::new());
    let calls = backend.status_calls.clone();
    let downloads = backend.download_calls.clone();
    let cancel = CancellationToken::new();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(RecordingSink::default()),
        AppState::new(),
        cancel.clone(),
    );

    controller.dispatch(Msg::ScanClicked).await;
    controller.cancel_token().cancel();
    let phase = controller.dispatch(Msg::DownloadClicked).await;

    assert_eq!(phase, PollPhase::Cancelled);
    assert_eq!(downloads.load(Ordering::SeqCst), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(cancel.is_cancelled());
}

#[tokio::test]
async fn cancel_after_scan_sends_no_download_request() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"videos":[{"file":"/videos/ABC-123.mp4","code":"ABC-123","has_sub":false}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .expect("backend");
    let cancel = CancellationToken::new();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(RecordingSink::default()),
        fast_state(),
        cancel.clone(),
    );

    controller.dispatch(Msg::ScanClicked).await;
    cancel.cancel();
    let phase = controller.dispatch(Msg::DownloadClicked).await;

    assert_eq!(phase, PollPhase::Cancelled);
    let posts = server
        .received_requests()
        .await
        .expect("request recording")
        .iter()
        .filter(|request| request.method.as_str() == "POST")
        .count();
    assert_eq!(posts, 0);
}

#[tokio::test]
async fn cancel_during_slow_scan_abandons_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scan"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"videos":[]}"#)
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let backend = HttpBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .expect("backend");
    let cancel = CancellationToken::new();
    let sink = RecordingSink::default();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(sink.clone()),
        fast_state(),
        cancel.clone(),
    );

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });
    let phase = tokio::time::timeout(
        Duration::from_secs(5),
        controller.dispatch(Msg::ScanClicked),
    )
    .await
    .expect("scan abandoned before the backend answered");

    assert_eq!(phase, PollPhase::Cancelled);
    assert!(!sink.last().scanning);
    assert!(!sink.last().download_enabled);
}

#[tokio::test]
async fn full_job_against_http_backend() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"videos":[{"file":"/videos/ABC-123.mp4","code":"ABC-123","has_sub":false}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"videos":[{"status":"downloading","log":["Searching: ABC-123"]}],"finished":false}"#,
            "application/json",
        ))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"videos":[{"status":"success","log":["Searching: ABC-123","Saved file.srt"]}],"finished":true}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let backend = HttpBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .expect("backend");
    let sink = RecordingSink::default();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(sink.clone()),
        fast_state(),
        CancellationToken::new(),
    );

    controller.dispatch(Msg::ScanClicked).await;
    let phase = controller.dispatch(Msg::DownloadClicked).await;

    assert_eq!(phase, PollPhase::Stopped);
    assert_eq!(controller.state().cycles(), 3);
    let view = sink.last();
    assert_eq!(view.rows[0].code.as_deref(), Some("ABC-123"));
    assert_eq!(view.rows[0].glyph(), "✔️");
    let categories: Vec<_> = view.rows[0].log.iter().map(|line| line.category).collect();
    assert_eq!(categories, vec![Category::SubcategoryInfo, Category::Success]);
    assert!(sink.count() >= 5);
}

#[tokio::test]
async fn failed_download_start_surfaces_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"videos":[]}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"finished":true}"#))
        .expect(0)
        .mount(&server)
        .await;

    let backend = HttpBackend::new(BackendSettings {
        base_url: server.uri(),
        ..BackendSettings::default()
    })
    .expect("backend");
    let sink = RecordingSink::default();
    let mut controller = Controller::new(
        Box::new(backend),
        Box::new(sink.clone()),
        fast_state(),
        CancellationToken::new(),
    );

    controller.dispatch(Msg::ScanClicked).await;
    let phase = controller.dispatch(Msg::DownloadClicked).await;

    assert_eq!(phase, PollPhase::Failed);
    let error = sink.last().last_error.expect("error shown");
    assert!(error.starts_with("download start failed: http status 500"));
}
