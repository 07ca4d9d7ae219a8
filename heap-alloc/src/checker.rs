//! The invariant prover (`checkheap`).
//!
//! Walks the heap by address and the free list by links, cross-checking
//! boundary tags, block sizes, coalescing, and free-list membership
//! against each other. Purely read-only: a failing check is reported,
//! never repaired, and never mutates arena state.

use crate::allocator::HeapAllocator;
use crate::block::{alloc_of_tag, size_of_tag, Block, MIN_BLOCK_SIZE};
use std::collections::HashSet;

/// Result of a [`HeapAllocator::checkheap`] pass.
///
/// Carries the diagnostics for each failed invariant rather than
/// collapsing straight to a boolean, so a caller can log or assert on
/// specifics instead of just pass/fail.
#[derive(Debug, Default, Clone)]
pub struct CheckReport {
    violations: Vec<String>,
}

impl CheckReport {
    /// `true` iff every invariant held.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable descriptions of each invariant that failed.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    fn push(&mut self, msg: impl Into<String>) {
        self.violations.push(msg.into());
    }
}

pub(crate) fn check(alloc: &HeapAllocator) -> CheckReport {
    let mut report = CheckReport::default();
    let arena = alloc.arena();

    let Some(first) = alloc.first_block() else {
        report.push("heap not initialized");
        return report;
    };

    // --- Walk the heap by address ---
    let mut heap_free_count = 0usize;
    let mut prev_was_free = false;
    let mut cursor = first;
    loop {
        let header = cursor.header(arena);
        let size = size_of_tag(header);
        let allocated = alloc_of_tag(header);

        if cursor.is_epilogue(arena) {
            break;
        }

        if size == 0 || size % 8 != 0 || size < MIN_BLOCK_SIZE {
            report.push(format!(
                "block at {:#x} has invalid size {size} (must be a multiple of 8, >= {MIN_BLOCK_SIZE})",
                cursor.0
            ));
        }
        if cursor.footer(arena) != header {
            report.push(format!(
                "block at {:#x} header ({header:#x}) != footer ({:#x})",
                cursor.0,
                cursor.footer(arena)
            ));
        }
        if !allocated {
            heap_free_count += 1;
            if prev_was_free {
                report.push(format!(
                    "block at {:#x} is free and adjacent to a preceding free block",
                    cursor.0
                ));
            }
        }
        prev_was_free = !allocated;

        if size == 0 {
            // Can't advance without looping forever; bail rather than hang.
            report.push("zero-size non-epilogue block; aborting heap walk".to_string());
            break;
        }
        cursor = cursor.next_adjacent(arena);
        if !arena.contains(cursor.header_offset()) {
            report.push("heap walk ran past the arena bounds before reaching the epilogue".to_string());
            break;
        }
    }

    // --- Walk the free list ---
    let free_list = alloc.free_list();
    let mut list_free_count = 0usize;
    let mut seen = HashSet::new();
    for block in free_list.iter(arena) {
        if !seen.insert(block.0) {
            report.push(format!("free list contains a cycle at {:#x}", block.0));
            break;
        }
        list_free_count += 1;

        if !arena.contains(block.header_offset()) || !arena.contains(block.0) {
            report.push(format!("free list member {:#x} lies outside the heap", block.0));
        }
        if block.is_allocated(arena) {
            report.push(format!(
                "free list member {:#x} has its allocated bit set",
                block.0
            ));
        }
        let next = block.next_free(arena);
        if next != crate::block::NULL {
            let next_block = Block(next);
            if next_block.prev_free(arena) != block.0 {
                report.push(format!(
                    "free list member {:#x}.next.prev != {:#x}",
                    block.0, block.0
                ));
            }
        }
    }

    if heap_free_count != list_free_count {
        report.push(format!(
            "free block count mismatch: {heap_free_count} reachable by heap walk, {list_free_count} by free list"
        ));
    }

    report
}

