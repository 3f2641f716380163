use std::time::Duration;

use crate::{reconcile, AppState, Effect, Msg, PollPhase, Progress};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ScanClicked => {
            if !state.can_scan() {
                return (state, Vec::new());
            }
            state.begin_scan();
            vec![Effect::RequestScan]
        }
        Msg::ScanCompleted(items) => {
            // A late scan result must not wipe rows under a running job.
            if state.phase().is_active() {
                return (state, Vec::new());
            }
            state.replace_items(items);
            Vec::new()
        }
        Msg::ScanFailed(message) => {
            state.scan_failed(message);
            Vec::new()
        }
        Msg::DownloadClicked => {
            if !state.can_download() {
                return (state, Vec::new());
            }
            state.begin_download();
            vec![Effect::StartDownload]
        }
        Msg::DownloadStarted => {
            if state.phase() != PollPhase::Starting {
                return (state, Vec::new());
            }
            state.start_polling();
            vec![Effect::PollStatus {
                delay: Duration::ZERO,
            }]
        }
        Msg::DownloadFailed(message) => {
            if state.phase() != PollPhase::Starting {
                return (state, Vec::new());
            }
            state.fail(format!("download start failed: {message}"));
            Vec::new()
        }
        Msg::StatusReceived(snapshot) => {
            if state.phase() != PollPhase::Polling {
                return (state, Vec::new());
            }
            // Rows first, then progress from the same snapshot.
            state.apply_render(reconcile(&snapshot));
            state.set_progress(Progress::from_snapshot(&snapshot));
            if snapshot.finished {
                state.set_phase(PollPhase::Stopped);
                Vec::new()
            } else {
                vec![Effect::PollStatus {
                    delay: state.poll_interval(),
                }]
            }
        }
        Msg::StatusFailed(message) => {
            if state.phase() != PollPhase::Polling {
                return (state, Vec::new());
            }
            state.fail(format!("status poll failed: {message}"));
            Vec::new()
        }
        Msg::PollCancelled => {
            if !state.phase().is_active() && !state.is_scanning() {
                return (state, Vec::new());
            }
            state.cancel();
            Vec::new()
        }
    };

    (state, effects)
}
