/// Determines when a [`ShuttlePool`][crate::ShuttlePool] verifies the take/return protocol.
///
/// The checks reject handles that belong to a different pool instance, handles issued before
/// the most recent [`reset()`][crate::ShuttlePool::reset] and returns of slots that are not
/// checked out. A failed check is a panic, never an error value: the pool cannot safely continue
/// from a broken free/used partition.
///
/// # Examples
///
/// ```
/// use shuttle_pool::{ContractChecks, ShuttlePool};
///
/// let pool = ShuttlePool::<u32, 8>::builder()
///     .contract_checks(ContractChecks::Always)
///     .build();
/// # drop(pool);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum ContractChecks {
    /// Checks run only in builds with `debug_assertions` enabled. This is the default.
    ///
    /// In optimized builds a protocol violation is a caller bug that the pool does not detect.
    #[default]
    DebugOnly,

    /// Checks run in every build, including optimized ones.
    Always,
}

impl ContractChecks {
    #[must_use]
    pub(crate) fn enabled(self) -> bool {
        match self {
            Self::DebugOnly => cfg!(debug_assertions),
            Self::Always => true,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn always_is_enabled() {
        assert!(ContractChecks::Always.enabled());
    }

    #[test]
    fn debug_only_follows_build_profile() {
        assert_eq!(ContractChecks::DebugOnly.enabled(), cfg!(debug_assertions));
    }

    #[test]
    fn default_is_debug_only() {
        assert_eq!(ContractChecks::default(), ContractChecks::DebugOnly);
    }
}
