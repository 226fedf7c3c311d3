//! Listener capability consumed by the block generator
//!
//! The downstream storage collaborator implements this trait. The
//! generator notifies it of admitted records, cut blocks and pushed
//! blocks, and surfaces fatal background faults through it.

use crate::error::{Result, SluiceError};
use crate::types::{Block, BlockId};

/// Callbacks invoked by a [`BlockGenerator`](super::BlockGenerator)
///
/// The record type buffered by the generator and the metadata passed
/// through admission calls are both chosen by the implementor; the engine
/// treats them as opaque.
pub trait BlockGeneratorListener: Send + Sync + 'static {
    /// Unit of ingested data
    type Record: Send + 'static;
    /// Per-admission metadata forwarded to `on_add_data`
    type Metadata;

    /// Called inside the admission critical section, once per accepted
    /// admission call, with every record of that call. The notification
    /// and the records are guaranteed to land in the same block. Must not
    /// perform long blocking work.
    fn on_add_data(&self, records: &[Self::Record], metadata: &Self::Metadata);

    /// Called under the buffer lock when a block is cut, before it is
    /// queued for pushing. Must not perform long blocking work.
    fn on_generate_block(&self, block_id: BlockId);

    /// Called from the dedicated push thread with a block ready for
    /// storage. May perform long blocking work; it is isolated from the
    /// admission path. An error is fatal to the push thread.
    fn on_push_block(&self, block: Block<Self::Record>) -> Result<()>;

    /// Called from either background thread on an unrecoverable fault.
    /// Must not block.
    fn on_error(&self, message: &str, error: &SluiceError);
}
