//! Thread-safe pooled buffers for the token lookahead window.
//!
//! [`ParseState`](crate::state::ParseState) rents its token buffer from an
//! [`ArrayPool`] instead of allocating fresh on every parse. The pool must be
//! safe to share across threads because `Parser` values (and the
//! [`ParseConfig`](crate::config::ParseConfig) that carries the pool handle)
//! are immutable and freely shareable, even though any single parse only ever
//! touches one buffer from one thread.

use std::sync::Mutex;

/// Supplies reusable `Vec<T>` buffers, sized-classed so a returned buffer can
/// satisfy a later request of equal or smaller capacity without reallocating.
pub trait ArrayPool<T>: Send + Sync {
    /// Obtain a buffer with at least `min_capacity` spare capacity, empty.
    fn rent(&self, min_capacity: usize) -> Vec<T>;

    /// Return a buffer for reuse. The pool may drop it instead of keeping it
    /// (e.g. if it's grown unreasonably large).
    fn give_back(&self, buf: Vec<T>);
}

/// A simple free-list pool, bucketed by capacity so a rent for a small buffer
/// doesn't waste a large one.
pub struct DefaultArrayPool<T> {
    // Each bucket holds buffers whose capacity is >= 2^index.
    buckets: Mutex<Vec<Vec<Vec<T>>>>,
    max_retained_capacity: usize,
}

impl<T> DefaultArrayPool<T> {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(Vec::new()),
            max_retained_capacity: 1 << 20,
        }
    }

    fn bucket_for(capacity: usize) -> usize {
        (usize::BITS - capacity.max(1).leading_zeros()) as usize
    }
}

impl<T> Default for DefaultArrayPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> ArrayPool<T> for DefaultArrayPool<T> {
    fn rent(&self, min_capacity: usize) -> Vec<T> {
        let bucket = Self::bucket_for(min_capacity);
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = buckets.get_mut(bucket) {
            if let Some(mut buf) = slot.pop() {
                buf.clear();
                return buf;
            }
        }
        Vec::with_capacity(min_capacity.next_power_of_two().max(8))
    }

    fn give_back(&self, mut buf: Vec<T>) {
        if buf.capacity() == 0 || buf.capacity() > self.max_retained_capacity {
            return;
        }
        buf.clear();
        let bucket = Self::bucket_for(buf.capacity());
        let mut buckets = self.buckets.lock().unwrap_or_else(|e| e.into_inner());
        if buckets.len() <= bucket {
            buckets.resize_with(bucket + 1, Vec::new);
        }
        buckets[bucket].push(buf);
    }
}

/// A buffer rented from an [`ArrayPool`], returned automatically on drop.
pub struct PooledVec<T> {
    buf: Option<Vec<T>>,
    pool: std::sync::Arc<dyn ArrayPool<T>>,
}

impl<T> PooledVec<T> {
    pub fn new(pool: std::sync::Arc<dyn ArrayPool<T>>, min_capacity: usize) -> Self {
        let buf = pool.rent(min_capacity);
        Self {
            buf: Some(buf),
            pool,
        }
    }
}

impl<T> std::ops::Deref for PooledVec<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        self.buf
            .as_ref()
            .unwrap_or_else(|| unreachable!("buffer taken before drop"))
    }
}

impl<T> std::ops::DerefMut for PooledVec<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.buf
            .as_mut()
            .unwrap_or_else(|| unreachable!("buffer taken before drop"))
    }
}

impl<T> Drop for PooledVec<T> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.give_back(buf);
        }
    }
}
