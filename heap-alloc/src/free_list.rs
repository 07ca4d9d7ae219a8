//! The doubly linked free list threaded through free blocks' payloads.
//!
//! Insertion is LIFO (new free blocks go to the head). Removal handles
//! the four structural cases — sole member, head, tail, interior — and
//! must leave both list-direction invariants intact: for every node `b`
//! with `b.next != NULL`, `b.next.prev == b`, and symmetrically for `prev`.

use crate::arena::Arena;
use crate::block::{Block, NULL};

/// Head of the free list; `NULL` when empty.
#[derive(Clone, Copy, Default)]
pub struct FreeList {
    head: usize,
}

impl FreeList {
    #[must_use]
    pub fn new() -> Self {
        Self { head: NULL }
    }

    #[must_use]
    pub fn head(&self) -> Option<Block> {
        (self.head != NULL).then_some(Block(self.head))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head == NULL
    }

    /// Push `block` onto the front of the list.
    pub fn push_front(&mut self, arena: &mut Arena, block: Block) {
        let old_head = self.head;
        block.set_prev_free(arena, NULL);
        block.set_next_free(arena, old_head);
        if old_head != NULL {
            Block(old_head).set_prev_free(arena, block.0);
        }
        self.head = block.0;
    }

    /// Remove `block` from the list. `block` must currently be a member.
    pub fn remove(&mut self, arena: &mut Arena, block: Block) {
        let prev = block.prev_free(arena);
        let next = block.next_free(arena);
        if prev != NULL {
            Block(prev).set_next_free(arena, next);
        } else {
            debug_assert_eq!(self.head, block.0, "removing non-head with no prev link");
            self.head = next;
        }
        if next != NULL {
            Block(next).set_prev_free(arena, prev);
        }
    }

    /// Iterate the free list from the head, yielding each member block.
    #[must_use]
    pub fn iter<'a>(&self, arena: &'a Arena) -> FreeListIter<'a> {
        FreeListIter {
            arena,
            current: self.head,
        }
    }

    #[must_use]
    pub fn len(&self, arena: &Arena) -> usize {
        self.iter(arena).count()
    }
}

pub struct FreeListIter<'a> {
    arena: &'a Arena,
    current: usize,
}

impl Iterator for FreeListIter<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.current == NULL {
            return None;
        }
        let block = Block(self.current);
        self.current = block.next_free(self.arena);
        Some(block)
    }
}
