/// Determines what happens when a pool is dropped while slots are still checked out.
///
/// By default, the pool does not care: a handle is only an index, so outstanding handles
/// simply become useless when the pool goes away.
///
/// # Examples
///
/// ```
/// use shuttle_pool::{DropPolicy, ShuttlePool};
///
/// // The drop policy is set at pool creation time.
/// let pool = ShuttlePool::<u32, 4>::builder()
///     .drop_policy(DropPolicy::MustNotDropCheckedOut)
///     .build();
/// # drop(pool);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool may be dropped with slots still checked out. This is the default.
    #[default]
    MayDropCheckedOut,

    /// The pool will panic if any slot is still checked out when it is dropped.
    ///
    /// This may be valuable when every checkout is expected to be returned before shutdown,
    /// for example to catch a code path that forgets to hand a slot back.
    MustNotDropCheckedOut,
}
