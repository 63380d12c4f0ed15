mod error;
mod sample;
mod worker;

pub use error::WorkerError;
pub use sample::{PositionFix, Sample};
pub use worker::{Worker, WorkerParts, WorkerState};
