use std::time::Duration;

use crate::view_model::{AppViewModel, ItemRowView};
use crate::{Item, ItemIndex, Progress, RenderInstruction, RowTable};

/// Delay between the end of one status poll and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// No download job has been started since the last scan.
    #[default]
    Idle,
    /// Download requested; waiting for the backend to acknowledge.
    Starting,
    Polling,
    /// The backend reported the job finished.
    Stopped,
    Failed,
    Cancelled,
}

impl PollPhase {
    /// A download request or poll loop is in flight.
    pub fn is_active(self) -> bool {
        matches!(self, PollPhase::Starting | PollPhase::Polling)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    items: Vec<Item>,
    rows: RowTable,
    scanned: bool,
    scanning: bool,
    phase: PollPhase,
    progress: Progress,
    poll_interval: Duration,
    cycles: u64,
    last_skipped: Vec<ItemIndex>,
    last_error: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            items: Vec::new(),
            rows: RowTable::default(),
            scanned: false,
            scanning: false,
            phase: PollPhase::Idle,
            progress: Progress::default(),
            poll_interval,
            cycles: 0,
            last_skipped: Vec::new(),
            last_error: None,
            dirty: false,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn rows(&self) -> &RowTable {
        &self.rows
    }

    /// Number of snapshots reconciled since the current download started.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Indices from the latest snapshot that had no row to render into.
    pub fn last_skipped(&self) -> &[ItemIndex] {
        &self.last_skipped
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn can_scan(&self) -> bool {
        !self.scanning && !self.phase.is_active()
    }

    pub fn can_download(&self) -> bool {
        self.scanned && self.can_scan()
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let render = self.rows.get(index).cloned().unwrap_or_default();
                ItemRowView {
                    index,
                    file: item.file.clone(),
                    code: item.code.clone(),
                    has_subtitle: item.has_subtitle,
                    state: render.state,
                    log: render.log,
                }
            })
            .collect();

        AppViewModel {
            phase: self.phase,
            scanning: self.scanning,
            scan_enabled: self.can_scan(),
            download_enabled: self.can_download(),
            rows,
            progress: self.progress,
            cycles: self.cycles,
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn begin_scan(&mut self) {
        self.scanning = true;
        self.last_error = None;
        self.mark_dirty();
    }

    /// Replaces the item set and resets every piece of render state.
    pub(crate) fn replace_items(&mut self, items: Vec<Item>) {
        self.rows = RowTable::from_items(&items);
        self.items = items;
        self.scanned = true;
        self.scanning = false;
        self.phase = PollPhase::Idle;
        self.progress = Progress::default();
        self.cycles = 0;
        self.last_skipped.clear();
        self.last_error = None;
        self.mark_dirty();
    }

    pub(crate) fn scan_failed(&mut self, message: String) {
        self.scanning = false;
        self.last_error = Some(format!("scan failed: {message}"));
        self.mark_dirty();
    }

    pub(crate) fn begin_download(&mut self) {
        self.phase = PollPhase::Starting;
        self.last_error = None;
        self.mark_dirty();
    }

    pub(crate) fn start_polling(&mut self) {
        self.phase = PollPhase::Polling;
        self.progress = Progress::default();
        self.cycles = 0;
        self.mark_dirty();
    }

    pub(crate) fn apply_render(&mut self, instructions: Vec<RenderInstruction>) {
        self.cycles += 1;
        self.last_skipped = self.rows.apply(instructions).skipped;
        self.mark_dirty();
    }

    pub(crate) fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
        self.mark_dirty();
    }

    pub(crate) fn set_phase(&mut self, phase: PollPhase) {
        self.phase = phase;
        self.mark_dirty();
    }

    /// Abandons a pending scan and any running job.
    pub(crate) fn cancel(&mut self) {
        self.scanning = false;
        self.phase = PollPhase::Cancelled;
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.phase = PollPhase::Failed;
        self.last_error = Some(message);
        self.mark_dirty();
    }
}
