/// Position of an item in the most recent scan result.
pub type ItemIndex = usize;

/// A video discovered by the backend scan. Never mutated after the scan;
/// a new scan replaces the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub file: String,
    pub code: Option<String>,
    pub has_subtitle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemStatus {
    #[default]
    Unknown,
    Downloading,
    Success,
    Failed,
}

impl ItemStatus {
    /// Maps the backend's status text; anything unrecognised is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "success" => ItemStatus::Success,
            "failed" => ItemStatus::Failed,
            "downloading" => ItemStatus::Downloading,
            _ => ItemStatus::Unknown,
        }
    }

    /// Terminal states count towards progress.
    pub fn is_completed(self) -> bool {
        matches!(self, ItemStatus::Success | ItemStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemSnapshot {
    pub status: ItemStatus,
    pub log: Vec<String>,
}

impl ItemSnapshot {
    pub fn new(status: ItemStatus, log: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            status,
            log: log.into_iter().map(Into::into).collect(),
        }
    }
}

/// Full, non-incremental report of every item's status and log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusSnapshot {
    pub items: Vec<ItemSnapshot>,
    pub finished: bool,
}
