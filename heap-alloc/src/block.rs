//! Block layout: boundary tags and free-list link cells.
//!
//! Every block in the heap is `[header:4 | payload | footer:4]`. The
//! header and footer each pack `(size, allocated)` into a 32-bit word —
//! `size` is always a multiple of 8, so its low bit is free for the
//! allocated flag. Free blocks additionally thread two 8-byte link
//! cells through the front of their payload (`next_free`, `prev_free`);
//! allocated blocks use the whole payload for user data.
//!
//! All positions are expressed as byte offsets into the owning
//! [`crate::arena::Arena`] rather than raw pointers, per the
//! arena-plus-index convention this allocator uses throughout.

use crate::arena::Arena;

pub const WSIZE: usize = 4;
pub const DSIZE: usize = 8;
pub const ALIGNMENT: usize = 8;
pub const MIN_BLOCK_SIZE: usize = 24;
pub const CHUNKSIZE: usize = 2048;

/// Sentinel "no link" value for free-list `next`/`prev` cells.
pub const NULL: usize = usize::MAX;

#[inline]
#[must_use]
pub const fn align_up(n: usize, to: usize) -> usize {
    (n + to - 1) / to * to
}

/// Adjusted block size for a requested payload of `size` bytes:
/// `max(MIN_BLOCK_SIZE, round_up(size + 8, 16))`.
#[must_use]
pub fn adjusted_size(size: usize) -> usize {
    MIN_BLOCK_SIZE.max(align_up(size + DSIZE, 2 * ALIGNMENT))
}

#[inline]
#[must_use]
pub fn pack(size: usize, allocated: bool) -> u32 {
    debug_assert_eq!(size % 8, 0, "block size must be a multiple of 8");
    (size as u32) | u32::from(allocated)
}

#[inline]
#[must_use]
pub fn size_of_tag(tag: u32) -> usize {
    (tag & !0x7) as usize
}

#[inline]
#[must_use]
pub fn alloc_of_tag(tag: u32) -> bool {
    tag & 0x1 != 0
}

/// A block identified by the byte offset of its *payload* (the address
/// handed out to callers for allocated blocks).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Block(pub usize);

impl Block {
    #[inline]
    #[must_use]
    pub fn header_offset(self) -> usize {
        self.0 - WSIZE
    }

    #[inline]
    #[must_use]
    pub fn header(self, arena: &Arena) -> u32 {
        arena.read_u32(self.header_offset())
    }

    #[inline]
    #[must_use]
    pub fn size(self, arena: &Arena) -> usize {
        size_of_tag(self.header(arena))
    }

    #[inline]
    #[must_use]
    pub fn is_allocated(self, arena: &Arena) -> bool {
        alloc_of_tag(self.header(arena))
    }

    #[inline]
    #[must_use]
    pub fn footer_offset(self, arena: &Arena) -> usize {
        self.0 + self.size(arena) - DSIZE
    }

    #[inline]
    #[must_use]
    pub fn footer(self, arena: &Arena) -> u32 {
        arena.read_u32(self.footer_offset(arena))
    }

    pub fn set_tag(self, arena: &mut Arena, size: usize, allocated: bool) {
        let tag = pack(size, allocated);
        arena.write_u32(self.header_offset(), tag);
        if size > 0 {
            arena.write_u32(self.0 + size - DSIZE, tag);
        }
    }

    /// Block immediately following this one in address order (valid as
    /// long as this block is not the epilogue).
    #[inline]
    #[must_use]
    pub fn next_adjacent(self, arena: &Arena) -> Block {
        Block(self.0 + self.size(arena))
    }

    /// Block immediately preceding this one in address order, read via
    /// its footer. Caller must ensure this block is not the first real
    /// block (i.e. the footer read belongs to a real predecessor).
    #[inline]
    #[must_use]
    pub fn prev_adjacent(self, arena: &Arena) -> Block {
        let prev_footer = arena.read_u32(self.header_offset() - WSIZE);
        Block(self.0 - size_of_tag(prev_footer))
    }

    #[must_use]
    pub fn is_epilogue(self, arena: &Arena) -> bool {
        self.size(arena) == 0 && self.is_allocated(arena)
    }

    #[inline]
    #[must_use]
    pub fn next_free(self, arena: &Arena) -> usize {
        arena.read_usize(self.0)
    }

    #[inline]
    pub fn set_next_free(self, arena: &mut Arena, v: usize) {
        arena.write_usize(self.0, v);
    }

    #[inline]
    #[must_use]
    pub fn prev_free(self, arena: &Arena) -> usize {
        arena.read_usize(self.0 + 8)
    }

    #[inline]
    pub fn set_prev_free(self, arena: &mut Arena, v: usize) {
        arena.write_usize(self.0 + 8, v);
    }
}
