//! Error types surfaced by the allocator core.

/// Failure modes for [`crate::allocator::HeapAllocator`] operations.
///
/// The allocator's public API mostly reports failure as an absent result
/// (`None` from `alloc`/`realloc`, `0`/`1` from `checkheap`) per the
/// calling convention of a C-style `malloc` family. This type exists for
/// the handful of operations — `init` and `extend_heap` — where the
/// underlying cause (arena exhaustion vs. double-init) is worth keeping.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum HeapError {
    /// The backing arena could not be grown further; `sbrk` returned failure.
    #[error("sbrk failed: heap arena exhausted")]
    ArenaExhausted,
    /// `init` was called on an allocator that already has a live heap.
    #[error("heap already initialized")]
    AlreadyInitialized,
}
