#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User pressed Scan.
    ScanClicked,
    /// Backend returned the scan result.
    ScanCompleted(Vec<crate::Item>),
    /// Scan request failed.
    ScanFailed(String),
    /// User pressed Download.
    DownloadClicked,
    /// Backend accepted the download job.
    DownloadStarted,
    /// Download start request failed.
    DownloadFailed(String),
    /// A status snapshot was fetched.
    StatusReceived(crate::StatusSnapshot),
    /// Fetching or decoding a status snapshot failed.
    StatusFailed(String),
    /// The caller cancelled the scan, the download start or the poll loop.
    PollCancelled,
}
