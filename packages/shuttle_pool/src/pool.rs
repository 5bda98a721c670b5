use std::any::type_name;
use std::{array, fmt, mem, thread};

use tracing::{debug, warn};

use crate::{
    ContractChecks, DropPolicy, IntegrityError, IntegrityReport, Link, List, ListIter, PoolId,
    ShuttlePoolBuilder, Slot, SlotHandle, SlotState, verify,
};

/// A fixed-capacity object pool whose slots shuttle between a free list and a used list.
///
/// The pool stores exactly `CAPACITY` values of type `T` inline, without any heap allocation.
/// Every value is default-constructed once when the pool is created and after that is never
/// moved, copied or rebuilt (until [`reset()`][Self::reset]). What moves is the ownership of the
/// slots holding the values:
///
/// * A slot is either a member of the **free list**, a member of the **used list** or
///   **checked out** by a caller. It is never in two of these at once.
/// * [`take_free()`][Self::take_free] and [`take_used()`][Self::take_used] pop the head of a list
///   and give you a [`SlotHandle`] for it.
/// * [`return_free()`][Self::return_free] and [`return_used()`][Self::return_used] consume the
///   handle and push the slot onto the head of a list. Either list, regardless of where the slot
///   came from.
/// * [`process_free()`][Self::process_free] and [`process_used()`][Self::process_used] do a
///   take, a mutation and a return to the other list in one call, without the handle ever
///   reaching you.
///
/// Both lists are LIFO: the most recently returned slot is the next one taken.
///
/// # Contract checks
///
/// Handing the pool a handle it did not issue, or a handle issued before the latest reset, is a
/// programming error. The pool panics when it detects one. Detection happens in debug builds by
/// default and in every build with [`ContractChecks::Always`]. The handle type itself cannot be
/// copied, so returning the same checkout twice does not compile.
///
/// [`check_integrity()`][Self::check_integrity] separately walks the whole pool to confirm that
/// the free/used/checked out partition is intact. It is meant for tests and diagnostics.
///
/// # Examples
///
/// ```
/// use shuttle_pool::ShuttlePool;
///
/// let mut pool = ShuttlePool::<u32, 4>::new();
///
/// let handle = pool.take_free().unwrap();
/// *pool.get_mut(&handle) = 42;
/// pool.return_used(handle);
///
/// assert_eq!(pool.free_remaining(), 3);
/// assert_eq!(pool.used_remaining(), 1);
///
/// let handle = pool.take_used().unwrap();
/// assert_eq!(*pool.get(&handle), 42);
/// pool.return_free(handle);
/// ```
pub struct ShuttlePool<T, const CAPACITY: usize> {
    slots: [Slot<T>; CAPACITY],

    free_head: Option<usize>,
    used_head: Option<usize>,

    pool_id: PoolId,

    /// Incremented on every reset. Handles remember the generation that issued them.
    generation: u64,

    contract_checks: ContractChecks,
    drop_policy: DropPolicy,
}

impl<T, const CAPACITY: usize> ShuttlePool<T, CAPACITY>
where
    T: Default,
{
    /// Creates a new pool with the default configuration, with every slot holding
    /// `T::default()` and all of them in the free list.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let pool = ShuttlePool::<String, 8>::new();
    ///
    /// assert_eq!(pool.free_remaining(), 8);
    /// assert_eq!(pool.used_remaining(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a new [`ShuttlePool`].
    ///
    /// Use this when you want to customize the pool configuration beyond the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shuttle_pool::{ContractChecks, ShuttlePool};
    ///
    /// let pool = ShuttlePool::<u32, 2>::builder()
    ///     .contract_checks(ContractChecks::Always)
    ///     .build();
    ///
    /// assert_eq!(pool.free_remaining(), 2);
    /// ```
    pub fn builder() -> ShuttlePoolBuilder<T, CAPACITY> {
        ShuttlePoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(contract_checks: ContractChecks, drop_policy: DropPolicy) -> Self {
        let pool = Self {
            slots: array::from_fn(|index| Slot {
                value: T::default(),
                link: Link::initial::<CAPACITY>(index),
            }),
            free_head: initial_free_head::<CAPACITY>(),
            used_head: None,
            pool_id: PoolId::next(),
            generation: 0,
            contract_checks,
            drop_policy,
        };

        debug!(
            item_type = type_name::<T>(),
            capacity = CAPACITY,
            ?contract_checks,
            ?drop_policy,
            "shuttle pool created"
        );

        pool
    }

    /// Returns the pool to its initial state.
    ///
    /// Every slot value is replaced with a fresh `T::default()` in place (the old value is
    /// dropped) and every slot goes back to the free list in index order. This includes slots that
    /// are currently checked out: all handles issued before the reset become stale and the
    /// pool will reject them (see [`ContractChecks`]).
    ///
    /// # Example
    ///
    /// ```rust
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let mut pool = ShuttlePool::<u32, 2>::new();
    /// assert!(pool.process_free(|value| *value = 7));
    ///
    /// pool.reset();
    ///
    /// assert_eq!(pool.free_remaining(), 2);
    /// assert!(pool.is_used_empty());
    /// assert!(pool.iter_free().all(|value| *value == 0));
    /// ```
    pub fn reset(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            slot.value = T::default();
            slot.link = Link::initial::<CAPACITY>(index);
        }

        self.free_head = initial_free_head::<CAPACITY>();
        self.used_head = None;
        self.generation = self.generation.wrapping_add(1);

        debug!(
            item_type = type_name::<T>(),
            capacity = CAPACITY,
            generation = self.generation,
            "shuttle pool reset"
        );
    }
}

impl<T, const CAPACITY: usize> ShuttlePool<T, CAPACITY> {
    /// The number of slots in the pool, fixed at the type level.
    #[must_use]
    #[inline]
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Whether the free list has no members.
    #[must_use]
    #[inline]
    pub fn is_free_empty(&self) -> bool {
        self.free_head.is_none()
    }

    /// Whether the used list has no members.
    #[must_use]
    #[inline]
    pub fn is_used_empty(&self) -> bool {
        self.used_head.is_none()
    }

    /// Counts the members of the free list.
    ///
    /// The count is not cached, this walks the list.
    #[must_use]
    pub fn free_remaining(&self) -> usize {
        self.iter_free().count()
    }

    /// Counts the members of the used list.
    ///
    /// The count is not cached, this walks the list.
    #[must_use]
    pub fn used_remaining(&self) -> usize {
        self.iter_used().count()
    }

    /// Counts the slots that are currently checked out, in neither list.
    ///
    /// This scans the entire pool storage.
    #[must_use]
    pub fn checked_out(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.link == Link::CheckedOut)
            .count()
    }

    /// Reports where the slot with the given index currently is.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub fn slot_state(&self, index: usize) -> SlotState {
        self.slot(index).link.state()
    }

    /// Iterates over the values in the free list, most recently returned first.
    pub fn iter_free(&self) -> ListIter<'_, T> {
        ListIter::new(&self.slots, self.free_head)
    }

    /// Iterates over the values in the used list, most recently returned first.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let mut pool = ShuttlePool::<u32, 3>::new();
    /// pool.process_free(|value| *value = 1);
    /// pool.process_free(|value| *value = 2);
    ///
    /// let used: Vec<u32> = pool.iter_used().copied().collect();
    /// assert_eq!(used, [2, 1]);
    /// ```
    pub fn iter_used(&self) -> ListIter<'_, T> {
        ListIter::new(&self.slots, self.used_head)
    }

    /// Checks out the slot at the head of the free list.
    ///
    /// Returns `None` if the free list is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let mut pool = ShuttlePool::<u32, 1>::new();
    ///
    /// let handle = pool.take_free().unwrap();
    /// assert!(pool.take_free().is_none());
    ///
    /// pool.return_free(handle);
    /// ```
    #[must_use]
    pub fn take_free(&mut self) -> Option<SlotHandle> {
        self.take(List::Free)
    }

    /// Checks out the slot at the head of the used list.
    ///
    /// Returns `None` if the used list is empty.
    #[must_use]
    pub fn take_used(&mut self) -> Option<SlotHandle> {
        self.take(List::Used)
    }

    /// Ends a checkout by pushing the slot onto the head of the free list.
    ///
    /// The same checkout cannot be returned twice, as the handle is consumed:
    ///
    /// ```compile_fail
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let mut pool = ShuttlePool::<u32, 2>::new();
    ///
    /// let handle = pool.take_free().unwrap();
    /// pool.return_free(handle);
    /// pool.return_free(handle);
    /// ```
    ///
    /// # Panics
    ///
    /// If [contract checks][ContractChecks] are enabled, panics if the handle was issued by a
    /// different pool or before the most recent [`reset()`][Self::reset].
    pub fn return_free(&mut self, handle: SlotHandle) {
        self.put(handle, List::Free, "return_free");
    }

    /// Ends a checkout by pushing the slot onto the head of the used list.
    ///
    /// The same checkout cannot be returned twice, whichever list it goes to first:
    ///
    /// ```compile_fail
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let mut pool = ShuttlePool::<u32, 2>::new();
    ///
    /// let handle = pool.take_free().unwrap();
    /// pool.return_used(handle);
    /// pool.return_free(handle);
    /// ```
    ///
    /// # Panics
    ///
    /// If [contract checks][ContractChecks] are enabled, panics if the handle was issued by a
    /// different pool or before the most recent [`reset()`][Self::reset].
    pub fn return_used(&mut self, handle: SlotHandle) {
        self.put(handle, List::Used, "return_used");
    }

    /// Moves the head of the free list to the used list, giving `f` exclusive access to its value
    /// on the way.
    ///
    /// Returns `false` without calling `f` if the free list is empty.
    ///
    /// If `f` panics, the slot is left checked out, in neither list, until the pool is reset.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let mut pool = ShuttlePool::<String, 1>::new();
    ///
    /// assert!(pool.process_free(|value| value.push_str("job")));
    /// assert!(!pool.process_free(|_| unreachable!()));
    ///
    /// assert_eq!(pool.iter_used().next().unwrap(), "job");
    /// ```
    pub fn process_free<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        self.process(List::Free, List::Used, f)
    }

    /// Moves the head of the used list to the free list, giving `f` exclusive access to its value
    /// on the way.
    ///
    /// Returns `false` without calling `f` if the used list is empty.
    ///
    /// If `f` panics, the slot is left checked out, in neither list, until the pool is reset.
    pub fn process_used<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        self.process(List::Used, List::Free, f)
    }

    /// Borrows the value of a checked out slot.
    ///
    /// # Panics
    ///
    /// If [contract checks][ContractChecks] are enabled, panics if the handle was issued by a
    /// different pool or before the most recent [`reset()`][Self::reset].
    #[must_use]
    pub fn get(&self, handle: &SlotHandle) -> &T {
        self.assert_holds(handle, "get");

        &self.slot(handle.index()).value
    }

    /// Exclusively borrows the value of a checked out slot.
    ///
    /// # Panics
    ///
    /// If [contract checks][ContractChecks] are enabled, panics if the handle was issued by a
    /// different pool or before the most recent [`reset()`][Self::reset].
    #[must_use]
    pub fn get_mut(&mut self, handle: &SlotHandle) -> &mut T {
        self.assert_holds(handle, "get_mut");

        &mut self.slot_mut(handle.index()).value
    }

    /// Walks the entire pool and verifies that every slot is in exactly one of the free list,
    /// the used list or checked out, and that neither list leaves the pool storage or loops.
    ///
    /// This is a diagnostic for tests and debugging. It takes time proportional to the capacity.
    ///
    /// # Errors
    ///
    /// Returns the first broken invariant found. This can only happen after a protocol violation
    /// that the [contract checks][ContractChecks] did not catch because they were disabled.
    ///
    /// # Example
    ///
    /// ```rust
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let mut pool = ShuttlePool::<u32, 4>::new();
    /// let handle = pool.take_free().unwrap();
    /// pool.process_free(|_| {});
    ///
    /// let report = pool.check_integrity().unwrap();
    /// assert_eq!(report.free(), 2);
    /// assert_eq!(report.used(), 1);
    /// assert_eq!(report.checked_out(), 1);
    /// # pool.return_free(handle);
    /// ```
    pub fn check_integrity(&self) -> Result<IntegrityReport, IntegrityError> {
        verify(&self.slots, self.free_head, self.used_head).inspect_err(|error| {
            warn!(
                item_type = type_name::<T>(),
                capacity = CAPACITY,
                %error,
                "shuttle pool integrity check failed"
            );
        })
    }

    fn head(&self, list: List) -> Option<usize> {
        match list {
            List::Free => self.free_head,
            List::Used => self.used_head,
        }
    }

    fn head_mut(&mut self, list: List) -> &mut Option<usize> {
        match list {
            List::Free => &mut self.free_head,
            List::Used => &mut self.used_head,
        }
    }

    fn slot(&self, index: usize) -> &Slot<T> {
        self.slots.get(index).unwrap_or_else(|| {
            panic!(
                "slot {index} index out of bounds in shuttle pool of {} {}",
                CAPACITY,
                type_name::<T>()
            )
        })
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot<T> {
        self.slots.get_mut(index).unwrap_or_else(|| {
            panic!(
                "slot {index} index out of bounds in shuttle pool of {} {}",
                CAPACITY,
                type_name::<T>()
            )
        })
    }

    fn take(&mut self, list: List) -> Option<SlotHandle> {
        let index = self.head(list)?;

        let next = match mem::replace(&mut self.slot_mut(index).link, Link::CheckedOut) {
            Link::Listed {
                list: linked_into,
                next,
            } if linked_into == list => next,
            other => panic!(
                "head {index} of the {} list was {} in shuttle pool of {}",
                SlotState::from(list),
                other.state(),
                type_name::<T>()
            ),
        };

        *self.head_mut(list) = next;

        Some(SlotHandle::new(index, self.pool_id, self.generation))
    }

    fn put(&mut self, handle: SlotHandle, list: List, operation: &'static str) {
        self.assert_holds(&handle, operation);

        let index = handle.into_index();
        let next = self.head(list);

        self.slot_mut(index).link = Link::Listed { list, next };
        *self.head_mut(list) = Some(index);
    }

    fn process<F>(&mut self, from: List, to: List, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let Some(handle) = self.take(from) else {
            return false;
        };

        f(&mut self.slot_mut(handle.index()).value);

        self.put(handle, to, "process");

        true
    }

    /// Verifies that the handle is a live checkout issued by this pool.
    fn assert_holds(&self, handle: &SlotHandle, operation: &str) {
        if !self.contract_checks.enabled() {
            return;
        }

        let index = handle.index();

        assert!(
            handle.pool_id() == self.pool_id,
            "{operation}({index}) was given a handle issued by a different shuttle pool of {}",
            type_name::<T>()
        );

        assert!(
            handle.generation() == self.generation,
            "{operation}({index}) was given a stale handle from generation {} but the shuttle pool of {} has been reset to generation {}",
            handle.generation(),
            type_name::<T>(),
            self.generation
        );

        let state = self.slot(index).link.state();

        assert!(
            state == SlotState::CheckedOut,
            "{operation}({index}) was given a handle to a slot that is {state} rather than checked out in shuttle pool of {}",
            type_name::<T>()
        );
    }
}

impl<T, const CAPACITY: usize> Default for ShuttlePool<T, CAPACITY>
where
    T: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CAPACITY: usize> fmt::Debug for ShuttlePool<T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShuttlePool")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &CAPACITY)
            .field("free_remaining", &self.free_remaining())
            .field("used_remaining", &self.used_remaining())
            .field("generation", &self.generation)
            .field("contract_checks", &self.contract_checks)
            .field("drop_policy", &self.drop_policy)
            .finish_non_exhaustive()
    }
}

impl<T, const CAPACITY: usize> Drop for ShuttlePool<T, CAPACITY> {
    fn drop(&mut self) {
        // If we are already panicking, we do not want to panic again because that will
        // simply obscure whatever the original panic was, leading to debug difficulties.
        if self.drop_policy == DropPolicy::MustNotDropCheckedOut && !thread::panicking() {
            let checked_out = self.checked_out();

            assert!(
                checked_out == 0,
                "dropped a shuttle pool of {} with {checked_out} slots still checked out, with a policy that says every slot must be returned first",
                type_name::<T>()
            );
        }
    }
}

#[must_use]
const fn initial_free_head<const CAPACITY: usize>() -> Option<usize> {
    if CAPACITY == 0 { None } else { Some(0) }
}
