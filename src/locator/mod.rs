mod gpsd;

pub use gpsd::GpsdSource;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::tracker::PositionFix;

#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no fix: {0}")]
    NoFix(String),
}

/// Device position subsystem. `initialize` failures are fatal to the run
/// loop; `current_fix` failures degrade a single tick.
#[async_trait]
pub trait SampleSource: Send {
    async fn initialize(&mut self, interval: Duration) -> Result<(), LocatorError>;

    async fn current_fix(&mut self) -> Result<PositionFix, LocatorError>;
}
