//! Allocation counting through the global allocator
//!
//! Register [`CountingAllocator`] with `#[global_allocator]` in a binary or integration test to
//! enable the memory figures of the benchmark runner. Without it every counter stays at zero.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicU64, Ordering};

static BYTES_ALLOCATED: AtomicU64 = AtomicU64::new(0);
static ALLOCATIONS: AtomicU64 = AtomicU64::new(0);

/// Forwards to the system allocator and counts requested bytes
///
/// ```rust,ignore
/// use linfa_svm_bench::benchmarks::alloc::CountingAllocator;
///
/// #[global_allocator]
/// static GLOBAL: CountingAllocator = CountingAllocator;
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record(layout.size());
        System.alloc_zeroed(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    // a reallocation counts as a fresh allocation of the new size
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record(new_size);
        System.realloc(ptr, layout, new_size)
    }
}

#[inline]
fn record(size: usize) {
    BYTES_ALLOCATED.fetch_add(size as u64, Ordering::Relaxed);
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
}

/// Total bytes requested since process start
pub fn allocated_bytes() -> u64 {
    BYTES_ALLOCATED.load(Ordering::Relaxed)
}

/// Total number of allocation calls since process start
pub fn allocations() -> u64 {
    ALLOCATIONS.load(Ordering::Relaxed)
}

/// Counter values at one point in time
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocSnapshot {
    pub bytes: u64,
    pub allocations: u64,
}

impl AllocSnapshot {
    pub fn now() -> Self {
        AllocSnapshot {
            bytes: allocated_bytes(),
            allocations: allocations(),
        }
    }

    /// Counter growth since `self`
    pub fn since(&self) -> AllocSnapshot {
        let now = AllocSnapshot::now();
        AllocSnapshot {
            bytes: now.bytes.saturating_sub(self.bytes),
            allocations: now.allocations.saturating_sub(self.allocations),
        }
    }
}
