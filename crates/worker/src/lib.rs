//! Background workers for the analytics engine.

pub mod scheduler;
pub mod warmup;

pub use scheduler::{WorkerConfig, WorkerScheduler};
pub use warmup::WarmupWorker;
