use thiserror::Error;

use crate::locator::LocatorError;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker already started")]
    AlreadyStarted,
    #[error("failed to init locator: {0}")]
    LocatorInit(#[from] LocatorError),
    #[error("worker task failed: {0}")]
    Join(String),
}
