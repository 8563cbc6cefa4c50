//! Thread-local recycling of activation buffers.
//!
//! An evolutionary loop constructs and destroys millions of engines, and the
//! activation arrays are their only significant allocation. Buffers are
//! cached per thread in size buckets (capacity rounded up to a power of two)
//! and handed back out on the next construction of a similar-sized engine.

use std::cell::RefCell;
use std::collections::HashMap;

/// Free buffers kept per bucket; beyond this they are simply dropped.
const MAX_POOLED_PER_BUCKET: usize = 32;

struct BufferPool {
    buckets: HashMap<usize, Vec<Vec<f64>>>,
}

impl BufferPool {
    fn new() -> Self {
        Self {
            buckets: HashMap::new(),
        }
    }
}

thread_local! {
    static ACTIVATION_BUFFERS: RefCell<BufferPool> = RefCell::new(BufferPool::new());
}

/// Take a zeroed buffer of `len` elements, reusing a pooled allocation when
/// one of the right bucket is available.
pub(crate) fn acquire(len: usize) -> Vec<f64> {
    let bucket = len.next_power_of_two();
    let recycled = ACTIVATION_BUFFERS.with(|pool| {
        pool.borrow_mut()
            .buckets
            .get_mut(&bucket)
            .and_then(Vec::pop)
    });
    match recycled {
        Some(mut buffer) => {
            buffer.clear();
            buffer.resize(len, 0.0);
            buffer
        }
        None => {
            let mut buffer = Vec::with_capacity(bucket);
            buffer.resize(len, 0.0);
            buffer
        }
    }
}

/// Return a buffer to the pool. Buffers whose capacity is not a clean bucket
/// size (e.g. clones) are dropped instead; losing a pooled slot is harmless.
pub(crate) fn release(buffer: Vec<f64>) {
    let bucket = buffer.capacity();
    if bucket == 0 || !bucket.is_power_of_two() {
        return;
    }
    ACTIVATION_BUFFERS.with(|pool| {
        let mut pool = pool.borrow_mut();
        let slot = pool.buckets.entry(bucket).or_default();
        if slot.len() < MAX_POOLED_PER_BUCKET {
            slot.push(buffer);
        }
    });
}
