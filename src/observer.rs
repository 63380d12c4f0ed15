/// Receives human-readable status lines from the worker. Write-only;
/// implementations must never fail the caller.
pub trait StatusObserver: Send + Sync {
    fn report(&self, kind: StatusKind, text: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Connection,
    Tracking,
}

/// Mirrors status lines to the log; without a screen the log is the
/// display surface.
pub struct LogObserver;

impl StatusObserver for LogObserver {
    fn report(&self, kind: StatusKind, text: &str) {
        match kind {
            StatusKind::Connection => log::info!("conn status: {text}"),
            StatusKind::Tracking => log::info!("tracker status: {text}"),
        }
    }
}
