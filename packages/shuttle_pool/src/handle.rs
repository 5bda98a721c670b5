use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies one pool instance for the lifetime of the process.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct PoolId(u64);

impl PoolId {
    #[must_use]
    pub(crate) fn next() -> Self {
        // Only uniqueness matters, no other memory is published through this counter.
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Exclusive proof that a caller has checked out one slot of a
/// [`ShuttlePool`][crate::ShuttlePool].
///
/// Returned by [`take_free()`][crate::ShuttlePool::take_free] and
/// [`take_used()`][crate::ShuttlePool::take_used]. While you hold the handle, the slot is a
/// member of neither list. Handing the handle to [`return_free()`][crate::ShuttlePool::return_free]
/// or [`return_used()`][crate::ShuttlePool::return_used] consumes it.
///
/// The handle cannot be copied or cloned, so the same checkout cannot be returned twice from
/// safe code. It remembers which pool issued it and in which generation (the pool starts a new
/// generation on every [`reset()`][crate::ShuttlePool::reset]), which lets the pool reject
/// handles from other pools and stale handles from before a reset.
///
/// Dropping a handle without returning it leaves the slot checked out until the next reset.
#[derive(Debug, Eq, PartialEq)]
#[must_use = "a checked out slot is missing from both lists until its handle is returned"]
pub struct SlotHandle {
    index: usize,
    pool_id: PoolId,
    generation: u64,
}

impl SlotHandle {
    pub(crate) fn new(index: usize, pool_id: PoolId, generation: u64) -> Self {
        Self {
            index,
            pool_id,
            generation,
        }
    }

    /// The index of the slot in the pool storage.
    ///
    /// Indexes are stable: a slot keeps its index for the lifetime of the pool.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub(crate) fn pool_id(&self) -> PoolId {
        self.pool_id
    }

    #[must_use]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Ends the checkout, leaving only the index behind.
    #[must_use]
    pub(crate) fn into_index(self) -> usize {
        self.index
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(SlotHandle: Send, Sync, Unpin);
    assert_not_impl_any!(SlotHandle: Clone, Copy);

    #[test]
    fn pool_ids_are_unique() {
        let a = PoolId::next();
        let b = PoolId::next();

        assert_ne!(a, b);
    }

    #[test]
    fn handle_reports_its_parts() {
        let pool_id = PoolId::next();
        let handle = SlotHandle::new(7, pool_id, 3);

        assert_eq!(handle.index(), 7);
        assert_eq!(handle.pool_id(), pool_id);
        assert_eq!(handle.generation(), 3);
        assert_eq!(handle.into_index(), 7);
    }
}
