//! Allocation accounting.
//!
//! `CountingAlloc` wraps the system allocator and keeps process-wide
//! counters. Install it with `#[global_allocator]` in the binary; the
//! counters stay at zero otherwise.

use std::alloc::{GlobalAlloc, Layout, System};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const MIB: u64 = 1024 * 1024;

static LIVE: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);
static TOTAL: AtomicU64 = AtomicU64::new(0);
static ALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static DEALLOCATIONS: AtomicU64 = AtomicU64::new(0);

/// Global allocator that counts bytes on top of `System`.
pub struct CountingAlloc;

fn record_alloc(size: usize) {
    let live = LIVE.fetch_add(size, Ordering::Relaxed) + size;
    PEAK.fetch_max(live, Ordering::Relaxed);
    TOTAL.fetch_add(size as u64, Ordering::Relaxed);
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
}

fn record_dealloc(size: usize) {
    LIVE.fetch_sub(size, Ordering::Relaxed);
    DEALLOCATIONS.fetch_add(1, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        // On failure the old block is still live
        if !new_ptr.is_null() {
            record_dealloc(layout.size());
            record_alloc(new_size);
        }
        new_ptr
    }
}

/// Point-in-time allocation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct MemStats {
    /// Bytes currently allocated.
    pub allocated: u64,
    /// Bytes allocated over the life of the process.
    pub total_allocated: u64,
    /// Highest `allocated` value seen so far.
    pub peak: u64,
    pub allocations: u64,
    pub deallocations: u64,
}

impl MemStats {
    /// Projects live memory for a graph of `target` nodes from one of
    /// `measured` nodes, assuming linear growth.
    pub fn extrapolate_mib(&self, measured: usize, target: usize) -> u64 {
        if measured == 0 {
            return 0;
        }
        let projected = self.allocated as u128 * target as u128 / measured as u128;
        (projected / MIB as u128) as u64
    }
}

impl fmt::Display for MemStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Alloc = {} MiB\tTotalAlloc = {} MiB\tPeak = {} MiB\tFrees = {}",
            to_mib(self.allocated),
            to_mib(self.total_allocated),
            to_mib(self.peak),
            self.deallocations
        )
    }
}

/// Reads the current counters.
pub fn snapshot() -> MemStats {
    MemStats {
        allocated: LIVE.load(Ordering::Relaxed) as u64,
        total_allocated: TOTAL.load(Ordering::Relaxed),
        peak: PEAK.load(Ordering::Relaxed) as u64,
        allocations: ALLOCATIONS.load(Ordering::Relaxed),
        deallocations: DEALLOCATIONS.load(Ordering::Relaxed),
    }
}

pub fn to_mib(bytes: u64) -> u64 {
    bytes / MIB
}
