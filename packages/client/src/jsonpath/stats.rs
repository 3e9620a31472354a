//! Path extraction statistics

/// Counters for one extraction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorStats {
    /// Bytes accepted by the tokenizer
    pub bytes_written: u64,
    /// Tokenizer events applied to the frame stack
    pub events: u64,
    /// Subtrees emitted
    pub matches_emitted: u64,
    /// Scalars dropped because no enclosing frame is retained
    pub scalars_discarded: u64,
    /// Deepest nesting seen
    pub peak_depth: usize,
    /// Largest number of in-flight child slots held by non-retained frames at once
    pub peak_live_slots: usize,
}
