//! Sluice Core - Stream Ingestion Block-Buffering Engine
//!
//! Sluice decouples the high-frequency arrival of individual records from
//! the lower-frequency act of durably storing batches. Producer threads
//! append records into a shared buffer; a clock-driven timer periodically
//! cuts the buffer into an immutable, uniquely-identified block; a
//! dedicated push thread hands finished blocks to the downstream storage
//! collaborator at a bounded rate.
//!
//! # Architecture
//!
//! - **RateLimiter**: blocking token bucket throttling record admission
//! - **RecurringTimer**: drift-free interval timer driving buffer cuts
//! - **BlockGenerator**: the buffer, state machine, hand-off queue and
//!   push thread behind the public ingestion API
//! - **BlockGeneratorListener**: capability trait implemented by the
//!   downstream storage layer

pub mod generator;
pub mod rate_limiter;
pub mod timer;

mod error;
mod types;

pub use error::{Result, SluiceError};
pub use generator::{BlockGenerator, BlockGeneratorConfig, BlockGeneratorListener};
pub use types::*;

/// Sluice version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod config {
    /// Default interval between buffer cuts (200ms)
    pub const BLOCK_INTERVAL_MS: u64 = 200;

    /// Default capacity of the cut-to-push hand-off queue
    pub const QUEUE_CAPACITY: usize = 10;

    /// Poll timeout used by the push thread while waiting for blocks (10ms)
    pub const PUSH_POLL_MS: u64 = 10;
}
