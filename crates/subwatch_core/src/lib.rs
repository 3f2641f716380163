//! Subwatch core: log classification, snapshot reconciliation and the
//! pure poll-loop state machine.
mod classify;
mod effect;
mod msg;
mod progress;
mod reconcile;
mod snapshot;
mod state;
mod update;
mod view_model;

pub use classify::{classify, Category};
pub use effect::Effect;
pub use msg::Msg;
pub use progress::Progress;
pub use reconcile::{reconcile, ApplyReport, LogLine, RenderInstruction, RowRender, RowState, RowTable};
pub use snapshot::{Item, ItemIndex, ItemSnapshot, ItemStatus, StatusSnapshot};
pub use state::{AppState, PollPhase, DEFAULT_POLL_INTERVAL};
pub use update::update;
pub use view_model::{AppViewModel, ItemRowView};
