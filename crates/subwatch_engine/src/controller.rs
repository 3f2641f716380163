use std::collections::VecDeque;

use subwatch_core::{update, AppState, AppViewModel, Effect, Msg, PollPhase};
use subwatch_logging::{set_poll_cycle, watch_debug, watch_info, watch_warn};
use tokio_util::sync::CancellationToken;

use crate::Backend;

/// Rendering surface that receives a fresh view model after every change.
pub trait ViewSink: Send {
    fn render(&mut self, view: &AppViewModel);
}

/// Drives the poll loop: feeds messages through [`update`] and executes the
/// resulting effects one at a time.
///
/// Effects run strictly in sequence, so a poll cycle (including its network
/// wait) always finishes before the next one is scheduled.
pub struct Controller {
    backend: Box<dyn Backend>,
    sink: Box<dyn ViewSink>,
    cancel: CancellationToken,
    state: AppState,
    inbox: VecDeque<Msg>,
    effects: VecDeque<Effect>,
}

impl Controller {
    pub fn new(
        backend: Box<dyn Backend>,
        sink: Box<dyn ViewSink>,
        state: AppState,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            backend,
            sink,
            cancel,
            state,
            inbox: VecDeque::new(),
            effects: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Token that stops the scan, the download start or the poll loop before
    /// its next request.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Processes `msg` and every follow-up it causes, returning once no
    /// effect is left to run. For a download that means after the poll loop
    /// has stopped, failed or been cancelled.
    pub async fn dispatch(&mut self, msg: Msg) -> PollPhase {
        self.inbox.push_back(msg);
        loop {
            while let Some(msg) = self.inbox.pop_front() {
                self.apply(msg);
            }
            let Some(effect) = self.effects.pop_front() else {
                break;
            };
            let follow_up = self.execute(effect).await;
            self.inbox.push_back(follow_up);
        }
        self.state.phase()
    }

    fn apply(&mut self, msg: Msg) {
        let before = self.state.phase();
        let before_cycles = self.state.cycles();
        let before_error = self.state.last_error().map(str::to_owned);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);

        if state.phase() != before {
            watch_info!("poll phase {:?} -> {:?}", before, state.phase());
        }
        if state.cycles() != before_cycles && !state.last_skipped().is_empty() {
            watch_debug!(
                "snapshot entries without a row: {:?}",
                state.last_skipped()
            );
        }
        if let Some(error) = state.last_error() {
            if before_error.as_deref() != Some(error) {
                watch_warn!("{}", error);
            }
        }

        let was_dirty = state.consume_dirty();
        self.state = state;
        self.effects.extend(effects);
        if was_dirty {
            self.sink.render(&self.state.view());
        }
    }

    async fn execute(&self, effect: Effect) -> Msg {
        if self.cancel.is_cancelled() {
            watch_debug!("skipping {:?}: cancelled", effect);
            return Msg::PollCancelled;
        }
        match effect {
            Effect::RequestScan => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Msg::PollCancelled,
                result = self.backend.scan() => match result {
                    Ok(items) => Msg::ScanCompleted(items),
                    Err(err) => Msg::ScanFailed(err.to_string()),
                },
            },
            Effect::StartDownload => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Msg::PollCancelled,
                result = self.backend.start_download() => match result {
                    Ok(()) => Msg::DownloadStarted,
                    Err(err) => Msg::DownloadFailed(err.to_string()),
                },
            },
            Effect::PollStatus { delay } => self.poll_cycle(delay).await,
        }
    }

    async fn poll_cycle(&self, delay: std::time::Duration) -> Msg {
        if !delay.is_zero() {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Msg::PollCancelled,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if self.cancel.is_cancelled() {
            return Msg::PollCancelled;
        }

        set_poll_cycle(self.state.cycles() + 1);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Msg::PollCancelled,
            result = self.backend.status() => match result {
                Ok(snapshot) => {
                    watch_debug!(
                        "status: {} items, finished={}",
                        snapshot.items.len(),
                        snapshot.finished
                    );
                    Msg::StatusReceived(snapshot)
                }
                Err(err) => Msg::StatusFailed(err.to_string()),
            },
        }
    }
}
