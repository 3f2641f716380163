use crate::{ItemIndex, LogLine, PollPhase, Progress, RowState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: PollPhase,
    pub scanning: bool,
    pub scan_enabled: bool,
    pub download_enabled: bool,
    pub rows: Vec<ItemRowView>,
    pub progress: Progress,
    pub cycles: u64,
    pub last_error: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub index: ItemIndex,
    pub file: String,
    pub code: Option<String>,
    pub has_subtitle: bool,
    pub state: RowState,
    pub log: Vec<LogLine>,
}

impl ItemRowView {
    pub fn glyph(&self) -> &'static str {
        self.state.glyph()
    }
}
