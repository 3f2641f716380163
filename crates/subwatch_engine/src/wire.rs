//! JSON bodies exchanged with the backend.
//!
//! Every field is optional on the wire. A snapshot with missing pieces still
//! renders: absent status is unknown, absent log is empty.

use serde::Deserialize;
use subwatch_core::{Item, ItemSnapshot, ItemStatus, StatusSnapshot};

/// Body of `GET /scan`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanResponse {
    pub videos: Option<Vec<ScanEntry>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanEntry {
    pub file: Option<String>,
    pub code: Option<String>,
    pub has_sub: Option<bool>,
}

/// Body of `GET /status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    pub videos: Option<Vec<StatusEntry>>,
    pub finished: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusEntry {
    pub status: Option<String>,
    pub log: Option<Vec<String>>,
}

impl ScanResponse {
    pub fn into_items(self) -> Vec<Item> {
        self.videos
            .unwrap_or_default()
            .into_iter()
            .map(|entry| Item {
                file: entry.file.unwrap_or_default(),
                code: entry.code.filter(|code| !code.is_empty()),
                has_subtitle: entry.has_sub.unwrap_or(false),
            })
            .collect()
    }
}

impl StatusResponse {
    pub fn into_snapshot(self) -> StatusSnapshot {
        let items = self
            .videos
            .unwrap_or_default()
            .into_iter()
            .map(|entry| ItemSnapshot {
                status: entry
                    .status
                    .as_deref()
                    .map(ItemStatus::parse)
                    .unwrap_or_default(),
                log: entry.log.unwrap_or_default(),
            })
            .collect();
        StatusSnapshot {
            items,
            finished: self.finished.unwrap_or(false),
        }
    }
}
