use std::collections::BTreeMap;

use crate::{classify, Category, Item, ItemIndex, ItemStatus, StatusSnapshot};

/// Visual state of an item row. A single field, so two states can never be
/// applied to the same row at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowState {
    #[default]
    Unknown,
    Downloading,
    Success,
    Failed,
}

impl RowState {
    pub fn glyph(self) -> &'static str {
        match self {
            RowState::Success => "✔️",
            RowState::Failed => "❌",
            RowState::Downloading => "⏳",
            RowState::Unknown => "",
        }
    }

    /// Row class, or `None` when no special state applies.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            RowState::Success => Some("success"),
            RowState::Failed => Some("failed"),
            RowState::Downloading => Some("downloading"),
            RowState::Unknown => None,
        }
    }
}

impl From<ItemStatus> for RowState {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Success => RowState::Success,
            ItemStatus::Failed => RowState::Failed,
            ItemStatus::Downloading => RowState::Downloading,
            ItemStatus::Unknown => RowState::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub category: Category,
}

impl LogLine {
    pub fn classified(text: &str) -> Self {
        Self {
            text: text.to_string(),
            category: classify(text),
        }
    }
}

/// What to draw for one item after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderInstruction {
    pub index: ItemIndex,
    pub state: RowState,
    pub log: Vec<LogLine>,
}

impl RenderInstruction {
    pub fn glyph(&self) -> &'static str {
        self.state.glyph()
    }
}

/// Converts one snapshot into render instructions, in snapshot order.
///
/// Has no memory of earlier snapshots: the same snapshot always produces the
/// same instructions.
pub fn reconcile(snapshot: &StatusSnapshot) -> Vec<RenderInstruction> {
    snapshot
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| RenderInstruction {
            index,
            state: RowState::from(item.status),
            log: item.log.iter().map(|line| LogLine::classified(line)).collect(),
        })
        .collect()
}

/// Rendered state of a single item row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowRender {
    pub state: RowState,
    pub log: Vec<LogLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyReport {
    pub applied: usize,
    /// Instructions whose index had no row.
    pub skipped: Vec<ItemIndex>,
}

/// Render target: one record per item index, created by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowTable {
    rows: BTreeMap<ItemIndex, RowRender>,
}

impl RowTable {
    pub fn from_items(items: &[Item]) -> Self {
        Self {
            rows: (0..items.len()).map(|i| (i, RowRender::default())).collect(),
        }
    }

    pub fn get(&self, index: ItemIndex) -> Option<&RowRender> {
        self.rows.get(&index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Applies every instruction whose row exists. Missing rows are skipped
    /// individually; they never abort the rest of the batch.
    pub fn apply(&mut self, instructions: Vec<RenderInstruction>) -> ApplyReport {
        let mut report = ApplyReport::default();
        for instruction in instructions {
            match self.rows.get_mut(&instruction.index) {
                Some(row) => {
                    row.state = instruction.state;
                    row.log = instruction.log;
                    report.applied += 1;
                }
                None => report.skipped.push(instruction.index),
            }
        }
        report
    }
}
