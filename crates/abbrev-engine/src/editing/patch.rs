/// Result of applying a batch of edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Inserted ranges, in post-edit offsets
    pub changed: Vec<std::ops::Range<usize>>,
    pub new_selections: Vec<std::ops::Range<usize>>,
    pub version: u64,
}
