//! Core types for sluice

use std::fmt;

/// Identifier of the receiver/stream that owns a generator
pub type StreamId = u32;

/// Unique identifier for a cut block
///
/// Derived from the owning stream and the start of the cutting interval
/// the records arrived in, so ids minted by one generator are strictly
/// increasing and collision-free within its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId {
    /// Stream that produced the block
    pub stream_id: StreamId,
    /// Start of the cutting interval, in milliseconds since the Unix epoch
    pub unique_id: i64,
}

impl BlockId {
    /// Create a new block id
    pub fn new(stream_id: StreamId, unique_id: i64) -> Self {
        Self {
            stream_id,
            unique_id,
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input-{}-{}", self.stream_id, self.unique_id)
    }
}

/// An immutable batch of records captured from one cutting interval
///
/// Ownership moves from the cutting thread through the hand-off queue to
/// the push thread, which consumes it when handing it to the listener.
#[derive(Debug)]
pub struct Block<R> {
    /// Unique identifier minted at cut time
    pub id: BlockId,
    /// Records in admission order
    pub records: Vec<R>,
}

impl<R> Block<R> {
    /// Create a new block
    pub fn new(id: BlockId, records: Vec<R>) -> Self {
        Self { id, records }
    }

    /// Number of records in the block
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the block holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lifecycle state of a `BlockGenerator`
///
/// Transitions are monotonic and only ever move forward:
/// `Initialized -> Active -> StoppedAddingData -> StoppedGeneratingBlocks
/// -> StoppedAll`. The `Ord` derive follows declaration order so callers
/// can compare against the transition table directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GeneratorState {
    /// Constructed, threads not yet started
    Initialized,
    /// Accepting records, cutting and pushing blocks
    Active,
    /// Admissions rejected; the final cut has not yet happened
    StoppedAddingData,
    /// Cutting finished; queued blocks still draining
    StoppedGeneratingBlocks,
    /// Both background threads have terminated
    StoppedAll,
}
