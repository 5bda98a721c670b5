use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{ContractChecks, DropPolicy, ShuttlePool};

/// Builder for creating an instance of [`ShuttlePool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The default configuration used by [`ShuttlePool::new()`][1] is sufficient for most use cases.
///
/// # Examples
///
/// ```
/// use shuttle_pool::{ContractChecks, DropPolicy, ShuttlePool};
///
/// let pool = ShuttlePool::<u64, 16>::builder()
///     .contract_checks(ContractChecks::Always)
///     .drop_policy(DropPolicy::MustNotDropCheckedOut)
///     .build();
///
/// assert_eq!(pool.free_remaining(), 16);
/// ```
///
/// [1]: ShuttlePool::new
#[must_use]
pub struct ShuttlePoolBuilder<T, const CAPACITY: usize> {
    contract_checks: ContractChecks,
    drop_policy: DropPolicy,

    _item: PhantomData<T>,
}

impl<T, const CAPACITY: usize> fmt::Debug for ShuttlePoolBuilder<T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShuttlePoolBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("capacity", &CAPACITY)
            .field("contract_checks", &self.contract_checks)
            .field("drop_policy", &self.drop_policy)
            .finish()
    }
}

impl<T, const CAPACITY: usize> ShuttlePoolBuilder<T, CAPACITY> {
    pub(crate) fn new() -> Self {
        Self {
            contract_checks: ContractChecks::default(),
            drop_policy: DropPolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets when the pool verifies the take/return protocol. See [`ContractChecks`].
    ///
    /// # Examples
    ///
    /// ```
    /// use shuttle_pool::{ContractChecks, ShuttlePool};
    ///
    /// let pool = ShuttlePool::<u32, 4>::builder()
    ///     .contract_checks(ContractChecks::Always)
    ///     .build();
    /// # drop(pool);
    /// ```
    pub fn contract_checks(mut self, checks: ContractChecks) -> Self {
        self.contract_checks = checks;
        self
    }

    /// Sets the [drop policy][DropPolicy] for the pool. This governs how to treat slots that
    /// are still checked out when the pool is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use shuttle_pool::{DropPolicy, ShuttlePool};
    ///
    /// let pool = ShuttlePool::<u32, 4>::builder()
    ///     .drop_policy(DropPolicy::MustNotDropCheckedOut)
    ///     .build();
    /// # drop(pool);
    /// ```
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Builds the pool with the specified configuration, default-constructing every slot value.
    ///
    /// # Examples
    ///
    /// ```
    /// use shuttle_pool::ShuttlePool;
    ///
    /// let pool = ShuttlePool::<String, 3>::builder().build();
    ///
    /// assert_eq!(pool.free_remaining(), 3);
    /// assert!(pool.is_used_empty());
    /// ```
    #[must_use]
    pub fn build(self) -> ShuttlePool<T, CAPACITY>
    where
        T: Default,
    {
        ShuttlePool::new_inner(self.contract_checks, self.drop_policy)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn debug_names_item_type_and_capacity() {
        let builder = ShuttlePool::<u16, 5>::builder().contract_checks(ContractChecks::Always);

        let debug = format!("{builder:?}");

        assert!(debug.contains("u16"));
        assert!(debug.contains("capacity: 5"));
        assert!(debug.contains("Always"));
    }

    #[test]
    fn settings_reach_the_pool() {
        let pool = ShuttlePool::<u16, 5>::builder()
            .contract_checks(ContractChecks::Always)
            .drop_policy(DropPolicy::MustNotDropCheckedOut)
            .build();

        let debug = format!("{pool:?}");

        assert!(debug.contains("Always"));
        assert!(debug.contains("MustNotDropCheckedOut"));
    }
}
