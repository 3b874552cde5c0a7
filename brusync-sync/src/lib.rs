//! # brusync-sync
//!
//! Service discovery and batch sync orchestration.
//!
//! Call [`locator::locate_all`] (or [`locator::locate`]) to find service
//! specifications, then [`sync_many`] to run the converter over them in
//! bounded concurrent batches. [`pipeline::run`] wires workspace setup,
//! discovery and the scheduler together for the CLI.

pub mod batch;
pub mod converter;
pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod patcher;
pub mod pipeline;
pub mod progress;
pub mod workspace;

pub use batch::{batch_width, sync_many};
pub use converter::{BrunoCli, Converter, ConverterOutput, ImportRequest};
pub use error::SyncError;
pub use orchestrator::{sync_one, SyncOptions};
pub use patcher::PatchResult;
pub use progress::{NoopProgress, ProgressSink, Stage};
