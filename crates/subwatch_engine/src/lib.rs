//! Subwatch engine: backend IO and the async poll driver.
mod backend;
mod controller;
mod types;
mod wire;

pub use backend::{Backend, BackendSettings, HttpBackend};
pub use controller::{Controller, ViewSink};
pub use types::{BackendError, FailureKind};
pub use wire::{ScanEntry, ScanResponse, StatusEntry, StatusResponse};
