//! An explicit free-list heap allocator over a simulated `sbrk` arena.
//!
//! This crate implements the allocator core of a classic systems-course
//! exercise: a single-threaded `malloc`/`free`/`realloc`/`calloc`
//! replacement backed by one heap region that only ever grows. Its
//! defining structure is the *boundary tag*: every block carries
//! identical size/allocated metadata in a header and a footer, which
//! lets `free` coalesce with either neighbor in O(1) without a
//! second pass over the heap. Free blocks additionally thread
//! `next`/`prev` pointers through their own (otherwise unused) payload,
//! forming a doubly linked free list that `alloc` searches with a
//! bounded-lookahead best-fit policy (see [`allocator::HeapAllocator`]).
//!
//! # Concurrency
//!
//! [`HeapAllocator`] is single-threaded by design — every public method
//! assumes exclusive access. Callers sharing an allocator across threads
//! must provide their own synchronization (a `Mutex<HeapAllocator>` is
//! the obvious choice); the type itself carries none.
//!
//! # Example
//!
//! ```
//! use heap_alloc::HeapAllocator;
//!
//! let mut heap = HeapAllocator::new();
//! heap.init().expect("arena has room for the initial chunk");
//!
//! let p = heap.alloc(100).expect("allocation should succeed");
//! unsafe {
//!     std::ptr::write_bytes(p, 0xAB, 100);
//!     heap.free(p);
//! }
//! assert!(heap.checkheap().is_ok());
//! ```

pub mod allocator;
pub mod arena;
pub mod block;
pub mod checker;
pub mod error;
pub mod free_list;

pub use allocator::HeapAllocator;
pub use checker::CheckReport;
pub use error::HeapError;
