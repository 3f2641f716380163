use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the backend to scan for items.
    RequestScan,
    /// Ask the backend to start the download job.
    StartDownload,
    /// Fetch the next status snapshot after `delay`.
    PollStatus { delay: Duration },
}
